use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{EvalResult, EvaluationError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTestResult {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
}

fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var)
}

/// Two-sided Welch's t-test (unequal variances) of `group_a` against `group_b`.
///
/// When both groups have zero variance the statistic is infinite with p = 0,
/// or NaN when the two constants are equal.
pub fn welch_t_test(group_a: &[f64], group_b: &[f64]) -> EvalResult<TTestResult> {
    if group_a.len() < 2 || group_b.len() < 2 {
        return Err(EvaluationError::degenerate(format!(
            "t-test needs at least 2 observations per group, got {} and {}",
            group_a.len(),
            group_b.len()
        )));
    }

    let (mean_a, var_a) = mean_and_variance(group_a);
    let (mean_b, var_b) = mean_and_variance(group_b);
    let (n_a, n_b) = (group_a.len() as f64, group_b.len() as f64);

    let se2_a = var_a / n_a;
    let se2_b = var_b / n_b;
    let se2 = se2_a + se2_b;
    if se2 == 0.0 {
        // Constant groups: infinitely separated unless the means coincide; df falls back to 1
        let (statistic, p_value) = if mean_a == mean_b {
            (f64::NAN, f64::NAN)
        } else {
            ((mean_a - mean_b).signum() * f64::INFINITY, 0.0)
        };
        return Ok(TTestResult {
            statistic,
            p_value,
            degrees_of_freedom: 1.0,
        });
    }

    let statistic = (mean_a - mean_b) / se2.sqrt();
    // Welch-Satterthwaite
    let dof = se2.powi(2) / (se2_a.powi(2) / (n_a - 1.0) + se2_b.powi(2) / (n_b - 1.0));

    let t_dist = StudentsT::new(0.0, 1.0, dof)
        .map_err(|e| EvaluationError::degenerate(format!("invalid t distribution (df = {dof}): {e}")))?;
    let p_value = (2.0 * t_dist.sf(statistic.abs())).min(1.0);

    Ok(TTestResult {
        statistic,
        p_value,
        degrees_of_freedom: dof,
    })
}
