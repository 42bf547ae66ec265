use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::EvalResult;
use crate::helper_functions::{read_tsv, require_columns, text_column};
use crate::models::{Dataset, MutationRecord};

pub const MODEL_COL: &str = "Model";
pub const GENE_COL: &str = "Hugo_Symbol";
pub const VARIANT_COL: &str = "Variant_Classification";

/// A per-pathway mutation table (Ras pathway genes or TP53).
pub struct MutationStatusTable {
    pub path: PathBuf,
}

impl Dataset for MutationStatusTable {
    fn load(&self) -> EvalResult<DataFrame> {
        info!("Reading mutation status from {}", self.path.display());
        let df = read_tsv(&self.path)?;
        require_columns(&df, &self.path, &[MODEL_COL, GENE_COL, VARIANT_COL])?;
        Ok(df)
    }
}

impl MutationStatusTable {
    /// Every row, in file order; a model with several mutated genes keeps all of them.
    pub fn records(&self) -> EvalResult<Vec<MutationRecord>> {
        let df = self.load()?;
        let models = text_column(&df, MODEL_COL)?;
        let genes = text_column(&df, GENE_COL)?;
        let variants = text_column(&df, VARIANT_COL)?;

        let mut records = Vec::with_capacity(df.height());
        let mut skipped = 0usize;
        for ((model, gene), variant) in models.into_iter().zip(genes).zip(variants) {
            let Some(model_id) = model else {
                skipped += 1;
                continue;
            };
            records.push(MutationRecord {
                model_id,
                gene_symbol: gene.unwrap_or_default(),
                variant_classification: variant.unwrap_or_default(),
            });
        }

        if skipped > 0 {
            warn!(
                "Skipped {} rows without a '{}' value in {}",
                skipped,
                MODEL_COL,
                self.path.display()
            );
        }

        let unique_models = records
            .iter()
            .map(|r| r.model_id.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();
        info!(
            "Loaded {} mutation rows covering {} models",
            records.len(),
            unique_models
        );
        debug!("{} counts: {:?}", GENE_COL, value_counts(records.iter().map(|r| r.gene_symbol.as_str())));
        debug!(
            "{} counts: {:?}",
            VARIANT_COL,
            value_counts(records.iter().map(|r| r.variant_classification.as_str()))
        );

        Ok(records)
    }
}

pub fn load_status_table(path: impl AsRef<Path>) -> EvalResult<Vec<MutationRecord>> {
    MutationStatusTable {
        path: path.as_ref().to_path_buf(),
    }
    .records()
}

pub(crate) fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
}
