use std::fmt;

use polars::frame::DataFrame;
use serde::Serialize;

use crate::error::EvalResult;

/// Display value of the gene columns when a sample carries no pathway mutation.
pub const WILD_TYPE: &str = "wild-type";

/// Histology bucket every "Other ..." variant collapses into.
pub const OTHER_HISTOLOGY: &str = "Other";

/// Trait representing one input table of the evaluation.
pub trait Dataset {
    /// Read the table and check that the required columns are present.
    fn load(&self) -> EvalResult<DataFrame>;
}

/// One row of a Ras or TP53 mutation status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub model_id: String,
    pub gene_symbol: String,
    pub variant_classification: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalRecord {
    pub model_id: String,
    pub histology: String,
}

impl ClinicalRecord {
    /// Builds a record with the histology already collapsed.
    pub fn new(model_id: impl Into<String>, histology: &str) -> Self {
        ClinicalRecord {
            model_id: model_id.into(),
            histology: normalize_histology(histology),
        }
    }
}

/// Any histology containing "Other" (case-sensitive) becomes exactly "Other".
pub fn normalize_histology(histology: &str) -> String {
    if histology.contains(OTHER_HISTOLOGY) {
        OTHER_HISTOLOGY.to_string()
    } else {
        histology.to_string()
    }
}

/// Classifier outputs for one RNA-seq sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub sample_id: String,
    pub ras_score: f64,
    pub tp53_score: f64,
    pub ras_shuffle: f64,
    pub tp53_shuffle: f64,
}

/// A score row joined with clinical metadata and mutation-derived labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledSample {
    pub sample_id: String,
    pub model_id: Option<String>,
    pub histology: Option<String>,
    pub ras_score: f64,
    pub tp53_score: f64,
    pub ras_shuffle: f64,
    pub tp53_shuffle: f64,
    pub ras_mutant_gene: String,
    pub tp53_mutant_gene: String,
    pub ras_status: u8,
    pub tp53_status: u8,
}

impl ReconciledSample {
    pub fn is_resolved(&self) -> bool {
        self.model_id.is_some()
    }

    pub fn status(&self, pathway: Pathway) -> u8 {
        match pathway {
            Pathway::Ras => self.ras_status,
            Pathway::Tp53 => self.tp53_status,
        }
    }

    pub fn score(&self, pathway: Pathway, kind: ScoreKind) -> f64 {
        match (pathway, kind) {
            (Pathway::Ras, ScoreKind::Real) => self.ras_score,
            (Pathway::Ras, ScoreKind::Shuffled) => self.ras_shuffle,
            (Pathway::Tp53, ScoreKind::Real) => self.tp53_score,
            (Pathway::Tp53, ScoreKind::Shuffled) => self.tp53_shuffle,
        }
    }
}

/// The two classifiers under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pathway {
    Ras,
    Tp53,
}

impl Pathway {
    pub const ALL: [Pathway; 2] = [Pathway::Ras, Pathway::Tp53];

    pub fn label(&self) -> &'static str {
        match self {
            Pathway::Ras => "Ras",
            Pathway::Tp53 => "TP53",
        }
    }

    pub fn score_column(&self) -> &'static str {
        match self {
            Pathway::Ras => "ras_score",
            Pathway::Tp53 => "tp53_score",
        }
    }

    pub fn shuffle_column(&self) -> &'static str {
        match self {
            Pathway::Ras => "ras_shuffle",
            Pathway::Tp53 => "tp53_shuffle",
        }
    }

    pub fn status_column(&self) -> &'static str {
        match self {
            Pathway::Ras => "ras_status",
            Pathway::Tp53 => "tp53_status",
        }
    }

    pub fn gene_column(&self) -> &'static str {
        match self {
            Pathway::Ras => "ras_mutant_gene",
            Pathway::Tp53 => "tp53_mutant_gene",
        }
    }

    /// File stem used for the per-pathway score figure.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Pathway::Ras => "ras",
            Pathway::Tp53 => "tp53",
        }
    }
}

impl fmt::Display for Pathway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classifier score or its label-permuted control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    Real,
    Shuffled,
}

impl ScoreKind {
    pub const ALL: [ScoreKind; 2] = [ScoreKind::Real, ScoreKind::Shuffled];

    pub fn label(&self) -> &'static str {
        match self {
            ScoreKind::Real => "real",
            ScoreKind::Shuffled => "shuffled",
        }
    }
}
