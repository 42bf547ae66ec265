use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::EvalResult;

/// Input locations and output switches for one evaluation run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvaluationConfig {
    pub ras_status_path: PathBuf,
    pub tp53_status_path: PathBuf,
    pub clinical_path: PathBuf,
    pub scores_path: PathBuf,
    pub output_dir: PathBuf,
    pub figure_dir: PathBuf,
    /// Drop samples whose id never resolved to a clinical model before computing metrics.
    pub exclude_unresolved: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            ras_status_path: PathBuf::from("data/raw/ras.genes.txt"),
            tp53_status_path: PathBuf::from("data/raw/tp53.muts.txt"),
            clinical_path: PathBuf::from("data/raw/2018-05-22-pdx-clinical.txt"),
            scores_path: PathBuf::from("results/pdx_classifier_scores.tsv"),
            output_dir: PathBuf::from("results"),
            figure_dir: PathBuf::from("figures"),
            exclude_unresolved: false,
        }
    }
}

impl EvaluationConfig {
    /// Defaults when no file is given, otherwise the JSON file layered over the defaults.
    pub fn load(path: Option<&Path>) -> EvalResult<Self> {
        match path {
            None => {
                info!("No config file given, using default paths");
                Ok(EvaluationConfig::default())
            }
            Some(path) => {
                info!("Reading config from {}", path.display());
                let config: EvaluationConfig = serde_json::from_reader(File::open(path)?)?;
                Ok(config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper_functions::test_support::write_fixture;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "config.json",
            r#"{ "scores_path": "out/scores.tsv", "exclude_unresolved": true }"#,
        );

        let config = EvaluationConfig::load(Some(&path)).unwrap();
        assert_eq!(config.scores_path, PathBuf::from("out/scores.tsv"));
        assert!(config.exclude_unresolved);
        assert_eq!(config.clinical_path, EvaluationConfig::default().clinical_path);
    }

    #[test]
    fn no_file_means_defaults() {
        assert_eq!(EvaluationConfig::load(None).unwrap(), EvaluationConfig::default());
    }

    #[test]
    fn invalid_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "config.json", "not json");
        assert!(EvaluationConfig::load(Some(&path)).is_err());
    }
}
