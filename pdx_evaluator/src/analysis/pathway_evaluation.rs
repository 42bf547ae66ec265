use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{error, info};

use crate::analysis::metrics::{compute_metrics, ClassifierMetrics};
use crate::analysis::statistics::{welch_t_test, TTestResult};
use crate::error::{EvalResult, EvaluationError};
use crate::models::{Pathway, ReconciledSample, ScoreKind};

/// Everything computed for one classifier.
#[derive(Debug, Clone, Serialize)]
pub struct PathwayEvaluation {
    pub pathway: Pathway,
    pub n_samples: usize,
    pub n_mutant: usize,
    pub real: ClassifierMetrics,
    pub shuffled: ClassifierMetrics,
    /// Mutant scores (group a) against wild-type scores (group b).
    pub t_test: TTestResult,
}

impl PathwayEvaluation {
    pub fn metrics(&self, kind: ScoreKind) -> &ClassifierMetrics {
        match kind {
            ScoreKind::Real => &self.real,
            ScoreKind::Shuffled => &self.shuffled,
        }
    }
}

/// Per-pathway outcome; a failure in one pathway never hides the other.
pub type PathwayResults = BTreeMap<Pathway, Result<PathwayEvaluation, EvaluationError>>;

/// Scores of one pathway split into (mutant, wild-type).
pub fn split_by_status(samples: &[ReconciledSample], pathway: Pathway, kind: ScoreKind) -> (Vec<f64>, Vec<f64>) {
    samples
        .iter()
        .map(|s| (s.status(pathway), s.score(pathway, kind)))
        .fold((Vec::new(), Vec::new()), |(mut mutant, mut wild_type), (status, score)| {
            if status == 1 {
                mutant.push(score);
            } else {
                wild_type.push(score);
            }
            (mutant, wild_type)
        })
}

pub fn evaluate_pathway(samples: &[ReconciledSample], pathway: Pathway) -> EvalResult<PathwayEvaluation> {
    let labels: Vec<u8> = samples.iter().map(|s| s.status(pathway)).collect();
    let real_scores: Vec<f64> = samples.iter().map(|s| s.score(pathway, ScoreKind::Real)).collect();
    let shuffled_scores: Vec<f64> = samples.iter().map(|s| s.score(pathway, ScoreKind::Shuffled)).collect();

    let real = compute_metrics(&labels, &real_scores)?;
    let shuffled = compute_metrics(&labels, &shuffled_scores)?;

    let (mutant, wild_type) = split_by_status(samples, pathway, ScoreKind::Real);
    let t_test = welch_t_test(&mutant, &wild_type)?;

    Ok(PathwayEvaluation {
        pathway,
        n_samples: samples.len(),
        n_mutant: mutant.len(),
        real,
        shuffled,
        t_test,
    })
}

/// Evaluate both classifiers independently.
pub fn evaluate_pathways(samples: &[ReconciledSample]) -> PathwayResults {
    Pathway::ALL
        .into_iter()
        .map(|pathway| {
            let result = evaluate_pathway(samples, pathway);
            match &result {
                Ok(eval) => info!(
                    "{}: AUROC {:.3} (shuffled {:.3}), AUPR {:.3} (shuffled {:.3}), t = {:.3}, p = {:.2e}",
                    pathway,
                    eval.real.auroc,
                    eval.shuffled.auroc,
                    eval.real.aupr,
                    eval.shuffled.aupr,
                    eval.t_test.statistic,
                    eval.t_test.p_value
                ),
                Err(e) => error!("{} evaluation failed: {}", pathway, e),
            }
            (pathway, result)
        })
        .collect()
}
