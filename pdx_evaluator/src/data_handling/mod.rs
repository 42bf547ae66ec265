pub mod classifier_scores;
pub mod clinical;
pub mod mutation_status;
