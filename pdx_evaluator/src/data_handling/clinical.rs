use std::collections::HashMap;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::data_handling::mutation_status::value_counts;
use crate::error::EvalResult;
use crate::helper_functions::{read_tsv, require_columns, text_column};
use crate::models::{ClinicalRecord, Dataset};

pub const MODEL_COL: &str = "Model";
pub const HISTOLOGY_COL: &str = "Histology";

/// PDX clinical annotation, one row per model.
pub struct ClinicalTable {
    pub path: PathBuf,
}

impl Dataset for ClinicalTable {
    fn load(&self) -> EvalResult<DataFrame> {
        info!("Reading clinical data from {}", self.path.display());
        let df = read_tsv(&self.path)?;
        require_columns(&df, &self.path, &[MODEL_COL, HISTOLOGY_COL])?;
        Ok(df)
    }
}

impl ClinicalTable {
    /// Records keyed by model id with histology collapsed; a repeated model keeps its last row.
    pub fn records(&self) -> EvalResult<HashMap<String, ClinicalRecord>> {
        let df = self.load()?;
        let models = text_column(&df, MODEL_COL)?;
        let histologies = text_column(&df, HISTOLOGY_COL)?;

        let mut by_model = HashMap::with_capacity(df.height());
        let mut skipped = 0usize;
        let mut duplicated = 0usize;
        for (model, histology) in models.into_iter().zip(histologies) {
            let Some(model_id) = model else {
                skipped += 1;
                continue;
            };
            let record = ClinicalRecord::new(model_id.clone(), histology.as_deref().unwrap_or(""));
            if by_model.insert(model_id, record).is_some() {
                duplicated += 1;
            }
        }

        if skipped > 0 {
            warn!("Skipped {} clinical rows without a '{}' value", skipped, MODEL_COL);
        }
        if duplicated > 0 {
            debug!("{} clinical rows repeated an earlier model id", duplicated);
        }

        info!("Loaded clinical annotation for {} models", by_model.len());
        debug!(
            "{} counts: {:?}",
            HISTOLOGY_COL,
            value_counts(by_model.values().map(|r| r.histology.as_str()))
        );

        Ok(by_model)
    }
}

pub fn load_clinical_table(path: impl AsRef<Path>) -> EvalResult<HashMap<String, ClinicalRecord>> {
    ClinicalTable {
        path: path.as_ref().to_path_buf(),
    }
    .records()
}
