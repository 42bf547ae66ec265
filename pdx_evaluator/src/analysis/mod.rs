pub mod histology;
pub mod metrics;
pub mod pathway_evaluation;
pub mod roc;
pub mod score_distribution;
pub mod statistics;
