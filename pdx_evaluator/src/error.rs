use std::path::{Path, PathBuf};

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvaluationError {
    /// A required input is unreadable, lacks columns or carries unparsable cells.
    #[error("malformed input {}: {reason}", .path.display())]
    MalformedInput {
        path: PathBuf,
        missing: Vec<String>,
        reason: String,
    },

    /// Labels or groups too small or single-class for the requested statistic.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plotting error: {0}")]
    Plot(String),
}

impl EvaluationError {
    pub fn missing_columns(path: &Path, missing: Vec<String>) -> Self {
        let reason = format!("missing required column(s) {}", missing.join(", "));
        EvaluationError::MalformedInput {
            path: path.to_path_buf(),
            missing,
            reason,
        }
    }

    pub fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        EvaluationError::MalformedInput {
            path: path.to_path_buf(),
            missing: Vec::new(),
            reason: reason.into(),
        }
    }

    pub fn degenerate(reason: impl Into<String>) -> Self {
        EvaluationError::DegenerateInput(reason.into())
    }
}

/// Wrap any plotters drawing error.
pub fn plot_err<E: std::fmt::Display>(e: E) -> EvaluationError {
    EvaluationError::Plot(e.to_string())
}

pub type EvalResult<T> = std::result::Result<T, EvaluationError>;
