use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{EvalResult, EvaluationError};

/// Curves and areas for one score vector against binary labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierMetrics {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub auroc: f64,
    pub aupr: f64,
}

/// Cumulative true/false positive counts at each distinct score, highest score first.
struct ThresholdCounts {
    tps: Vec<f64>,
    fps: Vec<f64>,
    positives: f64,
    negatives: f64,
}

fn validate(labels: &[u8], scores: &[f64]) -> EvalResult<()> {
    if labels.len() != scores.len() {
        return Err(EvaluationError::degenerate(format!(
            "{} labels but {} scores",
            labels.len(),
            scores.len()
        )));
    }
    if labels.len() < 2 {
        return Err(EvaluationError::degenerate(format!(
            "need at least 2 observations, got {}",
            labels.len()
        )));
    }
    if let Some(bad) = labels.iter().find(|&&l| l > 1) {
        return Err(EvaluationError::degenerate(format!("label {bad} is not 0 or 1")));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(EvaluationError::degenerate("non-finite score"));
    }

    let positives = labels.iter().filter(|&&l| l == 1).count();
    if positives == 0 || positives == labels.len() {
        return Err(EvaluationError::degenerate(format!(
            "only one class present ({} of {} labels positive)",
            positives,
            labels.len()
        )));
    }
    Ok(())
}

fn threshold_counts(labels: &[u8], scores: &[f64]) -> ThresholdCounts {
    let mut paired: Vec<(f64, u8)> = scores.iter().copied().zip(labels.iter().copied()).collect();
    paired.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let mut tps = Vec::new();
    let mut fps = Vec::new();
    let (mut tp, mut fp) = (0.0, 0.0);
    for (i, &(score, label)) in paired.iter().enumerate() {
        if label == 1 {
            tp += 1.0;
        } else {
            fp += 1.0;
        }
        // Tied scores share one threshold.
        let last_of_tie = paired.get(i + 1).map_or(true, |next| next.0 != score);
        if last_of_tie {
            tps.push(tp);
            fps.push(fp);
        }
    }

    ThresholdCounts {
        positives: tp,
        negatives: fp,
        tps,
        fps,
    }
}

/// ROC points starting at (0, 0), one per distinct threshold.
fn roc_curve(counts: &ThresholdCounts) -> (Vec<f64>, Vec<f64>) {
    let mut fpr = Vec::with_capacity(counts.fps.len() + 1);
    let mut tpr = Vec::with_capacity(counts.tps.len() + 1);
    fpr.push(0.0);
    tpr.push(0.0);
    for (&fp, &tp) in counts.fps.iter().zip(&counts.tps) {
        fpr.push(fp / counts.negatives);
        tpr.push(tp / counts.positives);
    }
    (fpr, tpr)
}

/// Area under the ROC curve using the trapezoidal rule.
fn trapezoid_auc(fpr: &[f64], tpr: &[f64]) -> f64 {
    fpr.windows(2)
        .zip(tpr.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[1] + y[0]) / 2.0)
        .sum()
}

/// Precision/recall points in descending-threshold order, preceded by the
/// (recall 0, precision 1) anchor and stopping once full recall is reached.
fn precision_recall_curve(counts: &ThresholdCounts) -> (Vec<f64>, Vec<f64>) {
    let mut precision = vec![1.0];
    let mut recall = vec![0.0];
    for (&tp, &fp) in counts.tps.iter().zip(&counts.fps) {
        precision.push(tp / (tp + fp));
        recall.push(tp / counts.positives);
        if tp == counts.positives {
            break;
        }
    }
    (precision, recall)
}

/// Average precision: recall increments weighted by the precision reached there.
fn average_precision(precision: &[f64], recall: &[f64]) -> f64 {
    recall
        .windows(2)
        .zip(precision.iter().skip(1))
        .map(|(r, &p)| (r[1] - r[0]) * p)
        .sum()
}

/// ROC and precision-recall curves plus AUROC and AUPR (average precision).
///
/// Labels must be 0/1 with both classes present.
pub fn compute_metrics(labels: &[u8], scores: &[f64]) -> EvalResult<ClassifierMetrics> {
    validate(labels, scores)?;

    let counts = threshold_counts(labels, scores);
    let (fpr, tpr) = roc_curve(&counts);
    let auroc = trapezoid_auc(&fpr, &tpr);
    let (precision, recall) = precision_recall_curve(&counts);
    let aupr = average_precision(&precision, &recall);

    Ok(ClassifierMetrics {
        fpr,
        tpr,
        precision,
        recall,
        auroc,
        aupr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn reference_example() {
        // Four samples with one mis-ranked pair
        let m = compute_metrics(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert!(close(m.auroc, 0.75));
        assert!(close(m.aupr, 0.5 + 0.5 * (2.0 / 3.0)));
        assert_eq!(m.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(m.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_eq!(m.recall, vec![0.0, 0.5, 0.5, 1.0]);
        assert!(close(m.precision[3], 2.0 / 3.0));
    }

    #[test]
    fn perfect_and_reversed_ranking() {
        let labels = [0, 0, 0, 1, 1];
        let perfect = compute_metrics(&labels, &[0.1, 0.2, 0.3, 0.8, 0.9]).unwrap();
        assert!(close(perfect.auroc, 1.0));
        assert!(close(perfect.aupr, 1.0));

        let reversed = compute_metrics(&labels, &[0.9, 0.8, 0.7, 0.2, 0.1]).unwrap();
        assert!(close(reversed.auroc, 0.0));
    }

    #[test]
    fn ties_count_half() {
        let m = compute_metrics(&[0, 1], &[0.5, 0.5]).unwrap();
        assert!(close(m.auroc, 0.5));
        assert_eq!(m.fpr, vec![0.0, 1.0]);
        assert!(close(m.aupr, 0.5));
    }

    #[test]
    fn deterministic() {
        let labels = [1, 0, 1, 0, 0, 1, 1, 0];
        let scores = [0.62, 0.11, 0.49, 0.49, 0.3, 0.91, 0.05, 0.77];
        let a = compute_metrics(&labels, &scores).unwrap();
        let b = compute_metrics(&labels, &scores).unwrap();
        assert_eq!(a.auroc, b.auroc);
        assert_eq!(a.aupr, b.aupr);
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_single_class() {
        for labels in [[0u8, 0, 0], [1, 1, 1]] {
            let err = compute_metrics(&labels, &[0.1, 0.5, 0.9]).unwrap_err();
            assert!(matches!(err, EvaluationError::DegenerateInput(_)));
        }
    }

    #[test]
    fn rejects_mismatched_or_tiny_input() {
        assert!(compute_metrics(&[0, 1], &[0.1]).is_err());
        assert!(compute_metrics(&[1], &[0.1]).is_err());
        assert!(compute_metrics(&[0, 1], &[0.1, f64::NAN]).is_err());
    }
}
