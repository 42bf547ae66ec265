use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use crate::error::{EvalResult, EvaluationError};
use crate::helper_functions::{numeric_column, read_tsv, require_columns, text_column};
use crate::models::{Dataset, ScoreRecord};

pub const SAMPLE_COL: &str = "sample_id";
pub const SCORE_COLUMNS: [&str; 4] = ["ras_score", "tp53_score", "ras_shuffle", "tp53_shuffle"];

/// Classifier outputs produced by applying the Ras and TP53 models to PDX RNA-seq.
pub struct ClassifierScoreTable {
    pub path: PathBuf,
}

impl Dataset for ClassifierScoreTable {
    fn load(&self) -> EvalResult<DataFrame> {
        info!("Reading classifier scores from {}", self.path.display());
        let df = read_tsv(&self.path)?;
        let mut required = vec![SAMPLE_COL];
        required.extend_from_slice(&SCORE_COLUMNS);
        require_columns(&df, &self.path, &required)?;
        Ok(df)
    }
}

impl ClassifierScoreTable {
    /// Score rows in file order.
    pub fn records(&self) -> EvalResult<Vec<ScoreRecord>> {
        let df = self.load()?;
        let sample_ids = text_column(&df, SAMPLE_COL)?;
        let [ras_score, tp53_score, ras_shuffle, tp53_shuffle] =
            SCORE_COLUMNS.map(|name| numeric_column(&df, name, &self.path));
        let (ras_score, tp53_score, ras_shuffle, tp53_shuffle) =
            (ras_score?, tp53_score?, ras_shuffle?, tp53_shuffle?);

        let records = sample_ids
            .into_iter()
            .enumerate()
            .map(|(row, sample_id)| {
                let sample_id = sample_id.ok_or_else(|| {
                    EvaluationError::malformed(
                        &self.path,
                        format!("empty '{SAMPLE_COL}' at row {}", row + 1),
                    )
                })?;
                Ok(ScoreRecord {
                    sample_id,
                    ras_score: ras_score[row],
                    tp53_score: tp53_score[row],
                    ras_shuffle: ras_shuffle[row],
                    tp53_shuffle: tp53_shuffle[row],
                })
            })
            .collect::<EvalResult<Vec<_>>>()?;

        info!("Loaded scores for {} samples", records.len());
        Ok(records)
    }
}

pub fn load_score_table(path: impl AsRef<Path>) -> EvalResult<Vec<ScoreRecord>> {
    ClassifierScoreTable {
        path: path.as_ref().to_path_buf(),
    }
    .records()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper_functions::test_support::write_fixture;

    const HEADER: &str = "sample_id\tras_score\ttp53_score\tras_shuffle\ttp53_shuffle\n";

    #[test]
    fn preserves_row_order() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!(
            "{HEADER}TM09\t0.91\t0.12\t0.40\t0.55\nTM01\t0.20\t0.80\t0.61\t0.33\nTM05\t0.5\t0.5\t0.5\t0.5\n"
        );
        let path = write_fixture(&dir, "pdx_classifier_scores.tsv", &contents);

        let scores = load_score_table(&path).unwrap();
        let ids: Vec<&str> = scores.iter().map(|s| s.sample_id.as_str()).collect();
        assert_eq!(ids, vec!["TM09", "TM01", "TM05"]);
        assert_eq!(scores[0].ras_score, 0.91);
        assert_eq!(scores[1].tp53_score, 0.80);
        assert_eq!(scores[1].ras_shuffle, 0.61);
        assert_eq!(scores[0].tp53_shuffle, 0.55);
    }

    #[test]
    fn padded_sample_id_is_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!("{HEADER}TM01 \t0.9\t0.1\t0.5\t0.5\n");
        let path = write_fixture(&dir, "scores.tsv", &contents);

        let scores = load_score_table(&path).unwrap();
        assert_eq!(scores[0].sample_id, "TM01 ");
    }

    #[test]
    fn non_numeric_score_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!("{HEADER}TM01\thigh\t0.1\t0.2\t0.3\n");
        let path = write_fixture(&dir, "scores.tsv", &contents);

        match load_score_table(&path) {
            Err(EvaluationError::MalformedInput { reason, .. }) => assert!(reason.contains("ras_score")),
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn missing_shuffle_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "scores.tsv", "sample_id\tras_score\ttp53_score\nTM01\t0.1\t0.2\n");

        match load_score_table(&path) {
            Err(EvaluationError::MalformedInput { missing, .. }) => {
                assert_eq!(missing, vec!["ras_shuffle".to_string(), "tp53_shuffle".to_string()]);
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }
}
