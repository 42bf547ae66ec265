//! Joins classifier scores with clinical metadata and mutation status.
//!
//! Score rows are the left side of every join: each one survives exactly once,
//! in input order. A score whose `sample_id` has no clinical row keeps a null
//! `model_id`, and with no model to key on it can never match a mutation, so
//! it is labelled wild-type for both pathways.

use std::collections::HashMap;

use polars::prelude::*;
use tracing::{info, warn};

use crate::error::EvalResult;
use crate::models::{ClinicalRecord, MutationRecord, Pathway, ReconciledSample, ScoreRecord, WILD_TYPE};

/// Score identifiers that did not resolve against the clinical table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnresolvedIdentifierWarning {
    pub count: usize,
    pub sample_ids: Vec<String>,
}

impl UnresolvedIdentifierWarning {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub samples: Vec<ReconciledSample>,
    pub unresolved: UnresolvedIdentifierWarning,
}

/// Model id -> gene symbol of the first mutation row for that model.
fn first_match_index(mutations: &[MutationRecord]) -> HashMap<&str, &str> {
    let mut index = HashMap::with_capacity(mutations.len());
    for m in mutations {
        index
            .entry(m.model_id.as_str())
            .or_insert(m.gene_symbol.as_str());
    }
    index
}

fn derive_label(index: &HashMap<&str, &str>, model_id: Option<&str>) -> (String, u8) {
    match model_id.and_then(|id| index.get(id)) {
        Some(gene) => (gene.to_string(), 1),
        None => (WILD_TYPE.to_string(), 0),
    }
}

pub fn reconcile(
    scores: &[ScoreRecord],
    clinical: &HashMap<String, ClinicalRecord>,
    tp53_mutations: &[MutationRecord],
    ras_mutations: &[MutationRecord],
) -> Reconciliation {
    let tp53_index = first_match_index(tp53_mutations);
    let ras_index = first_match_index(ras_mutations);

    let mut unresolved = UnresolvedIdentifierWarning::default();
    let samples: Vec<ReconciledSample> = scores
        .iter()
        .map(|score| {
            let clinical_row = clinical.get(&score.sample_id);
            if clinical_row.is_none() {
                unresolved.count += 1;
                unresolved.sample_ids.push(score.sample_id.clone());
            }
            let model_id = clinical_row.map(|c| c.model_id.clone());

            let (tp53_mutant_gene, tp53_status) = derive_label(&tp53_index, model_id.as_deref());
            let (ras_mutant_gene, ras_status) = derive_label(&ras_index, model_id.as_deref());

            ReconciledSample {
                sample_id: score.sample_id.clone(),
                model_id,
                histology: clinical_row.map(|c| c.histology.clone()),
                ras_score: score.ras_score,
                tp53_score: score.tp53_score,
                ras_shuffle: score.ras_shuffle,
                tp53_shuffle: score.tp53_shuffle,
                ras_mutant_gene,
                tp53_mutant_gene,
                ras_status,
                tp53_status,
            }
        })
        .collect();

    if !unresolved.is_empty() {
        warn!(
            "{} of {} score rows did not resolve to a clinical model and count as wild-type: {:?}",
            unresolved.count,
            scores.len(),
            unresolved.sample_ids
        );
    }
    for pathway in Pathway::ALL {
        let mutant = samples.iter().filter(|s| s.status(pathway) == 1).count();
        info!(
            "{} status: {} mutant / {} wild-type",
            pathway,
            mutant,
            samples.len() - mutant
        );
    }

    Reconciliation { samples, unresolved }
}

/// Drop samples whose identifier never resolved to a clinical model.
pub fn exclude_unresolved(samples: &[ReconciledSample]) -> Vec<ReconciledSample> {
    let kept: Vec<ReconciledSample> = samples.iter().filter(|s| s.is_resolved()).cloned().collect();
    info!("Excluded {} unresolved samples", samples.len() - kept.len());
    kept
}

/// Tabular form of the reconciled samples, columns in record order.
pub fn samples_to_dataframe(samples: &[ReconciledSample]) -> EvalResult<DataFrame> {
    let sample_id: Vec<&str> = samples.iter().map(|s| s.sample_id.as_str()).collect();
    let model_id: Vec<Option<&str>> = samples.iter().map(|s| s.model_id.as_deref()).collect();
    let histology: Vec<Option<&str>> = samples.iter().map(|s| s.histology.as_deref()).collect();
    let ras_score: Vec<f64> = samples.iter().map(|s| s.ras_score).collect();
    let tp53_score: Vec<f64> = samples.iter().map(|s| s.tp53_score).collect();
    let ras_shuffle: Vec<f64> = samples.iter().map(|s| s.ras_shuffle).collect();
    let tp53_shuffle: Vec<f64> = samples.iter().map(|s| s.tp53_shuffle).collect();
    let ras_gene: Vec<&str> = samples.iter().map(|s| s.ras_mutant_gene.as_str()).collect();
    let tp53_gene: Vec<&str> = samples.iter().map(|s| s.tp53_mutant_gene.as_str()).collect();
    let ras_status: Vec<i32> = samples.iter().map(|s| s.ras_status as i32).collect();
    let tp53_status: Vec<i32> = samples.iter().map(|s| s.tp53_status as i32).collect();

    let df = DataFrame::new(vec![
        Column::from(Series::new("sample_id".into(), sample_id)),
        Column::from(Series::new("model_id".into(), model_id)),
        Column::from(Series::new("histology".into(), histology)),
        Column::from(Series::new(Pathway::Ras.score_column().into(), ras_score)),
        Column::from(Series::new(Pathway::Tp53.score_column().into(), tp53_score)),
        Column::from(Series::new(Pathway::Ras.shuffle_column().into(), ras_shuffle)),
        Column::from(Series::new(Pathway::Tp53.shuffle_column().into(), tp53_shuffle)),
        Column::from(Series::new(Pathway::Ras.gene_column().into(), ras_gene)),
        Column::from(Series::new(Pathway::Tp53.gene_column().into(), tp53_gene)),
        Column::from(Series::new(Pathway::Ras.status_column().into(), ras_status)),
        Column::from(Series::new(Pathway::Tp53.status_column().into(), tp53_status)),
    ])?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::classifier_scores::load_score_table;
    use crate::data_handling::clinical::load_clinical_table;
    use crate::helper_functions::test_support::write_fixture;

    fn score(id: &str, ras: f64, tp53: f64) -> ScoreRecord {
        ScoreRecord {
            sample_id: id.to_string(),
            ras_score: ras,
            tp53_score: tp53,
            ras_shuffle: 0.5,
            tp53_shuffle: 0.5,
        }
    }

    fn mutation(model: &str, gene: &str) -> MutationRecord {
        MutationRecord {
            model_id: model.to_string(),
            gene_symbol: gene.to_string(),
            variant_classification: "Missense_Mutation".to_string(),
        }
    }

    fn clinical(rows: &[(&str, &str)]) -> HashMap<String, ClinicalRecord> {
        rows.iter()
            .map(|(m, h)| (m.to_string(), ClinicalRecord::new(*m, h)))
            .collect()
    }

    #[test]
    fn end_to_end_example() {
        let scores = vec![score("S1", 0.9, 0.2), score("S2", 0.3, 0.7)];
        let clinical = clinical(&[("S1", "Lung")]);
        let ras = vec![mutation("S1", "KRAS")];

        let out = reconcile(&scores, &clinical, &[], &ras);
        let s1 = &out.samples[0];
        assert_eq!(s1.ras_status, 1);
        assert_eq!(s1.ras_mutant_gene, "KRAS");
        assert_eq!(s1.tp53_status, 0);
        assert_eq!(s1.tp53_mutant_gene, WILD_TYPE);
        assert_eq!(s1.histology.as_deref(), Some("Lung"));

        let s2 = &out.samples[1];
        assert_eq!(s2.ras_status, 0);
        assert_eq!(s2.model_id, None);
        assert_eq!(s2.histology, None);

        assert_eq!(out.unresolved.count, 1);
        assert_eq!(out.unresolved.sample_ids, vec!["S2".to_string()]);
    }

    #[test]
    fn padded_identifier_stays_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let scores = write_fixture(
            &dir,
            "scores.tsv",
            "sample_id\tras_score\ttp53_score\tras_shuffle\ttp53_shuffle\n\
             TM01 \t0.9\t0.1\t0.5\t0.5\n\
             TM02\t0.2\t0.8\t0.5\t0.5\n",
        );
        let clinical = write_fixture(&dir, "clinical.txt", "Model\tHistology\nTM01\t Lung \nTM02\tBreast\n");
        let ras = vec![mutation("TM01", "KRAS")];

        let scores = load_score_table(&scores).unwrap();
        let clinical = load_clinical_table(&clinical).unwrap();
        assert_eq!(clinical["TM01"].histology, " Lung ");

        let out = reconcile(&scores, &clinical, &[], &ras);
        let padded = &out.samples[0];
        assert_eq!(padded.sample_id, "TM01 ");
        assert_eq!(padded.model_id, None);
        assert_eq!(padded.ras_status, 0);
        assert_eq!(out.unresolved.count, 1);
        assert_eq!(out.unresolved.sample_ids, vec!["TM01 ".to_string()]);
        assert_eq!(out.samples[1].histology.as_deref(), Some("Breast"));
    }

    #[test]
    fn row_count_and_order_are_preserved() {
        let scores: Vec<ScoreRecord> = (0..25)
            .map(|i| score(&format!("TM{i:02}"), i as f64 / 25.0, 0.5))
            .collect();
        let clinical = clinical(&[("TM03", "Breast"), ("TM07", "Other: Sarcoma")]);
        let ras = vec![mutation("TM03", "KRAS"), mutation("TM03", "NRAS"), mutation("TM07", "HRAS")];

        let out = reconcile(&scores, &clinical, &[], &ras);
        assert_eq!(out.samples.len(), scores.len());
        for (input, output) in scores.iter().zip(&out.samples) {
            assert_eq!(input.sample_id, output.sample_id);
            assert!(output.ras_status <= 1 && output.tp53_status <= 1);
        }
        assert_eq!(out.unresolved.count, 23);
    }

    #[test]
    fn unmatched_sample_is_wild_type_even_if_mutated() {
        let scores = vec![score("TM10", 0.8, 0.8)];
        let ras = vec![mutation("TM10", "KRAS")];
        let tp53 = vec![mutation("TM10", "TP53")];

        let out = reconcile(&scores, &HashMap::new(), &tp53, &ras);
        assert_eq!(out.samples[0].ras_status, 0);
        assert_eq!(out.samples[0].tp53_status, 0);
        assert_eq!(out.samples[0].ras_mutant_gene, WILD_TYPE);
    }

    #[test]
    fn multi_gene_model_is_mutant_and_first_row_names_gene() {
        let scores = vec![score("TM01", 0.9, 0.1)];
        let clinical = clinical(&[("TM01", "Colorectal")]);

        let kras_first = vec![mutation("TM01", "KRAS"), mutation("TM01", "BRAF")];
        let braf_first = vec![mutation("TM01", "BRAF"), mutation("TM01", "KRAS")];

        let a = reconcile(&scores, &clinical, &[], &kras_first);
        let b = reconcile(&scores, &clinical, &[], &braf_first);
        assert_eq!(a.samples[0].ras_status, 1);
        assert_eq!(b.samples[0].ras_status, 1);
        assert_eq!(a.samples[0].ras_mutant_gene, "KRAS");
        assert_eq!(b.samples[0].ras_mutant_gene, "BRAF");
    }

    #[test]
    fn exclusion_keeps_only_resolved() {
        let scores = vec![score("A", 0.1, 0.1), score("B", 0.2, 0.2), score("C", 0.3, 0.3)];
        let clinical = clinical(&[("A", "Lung"), ("C", "Skin")]);
        let out = reconcile(&scores, &clinical, &[], &[]);

        let kept = exclude_unresolved(&out.samples);
        let ids: Vec<&str> = kept.iter().map(|s| s.sample_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[test]
    fn dataframe_has_nullable_model_and_histology() {
        let scores = vec![score("S1", 0.9, 0.2), score("S2", 0.3, 0.7)];
        let clinical = clinical(&[("S1", "Lung")]);
        let out = reconcile(&scores, &clinical, &[mutation("S1", "TP53")], &[]);

        let df = samples_to_dataframe(&out.samples).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 11);
        assert_eq!(df.column("model_id").unwrap().null_count(), 1);
        assert_eq!(df.column("histology").unwrap().null_count(), 1);
        let tp53 = df.column("tp53_status").unwrap().i32().unwrap();
        assert_eq!(tp53.get(0), Some(1));
        assert_eq!(tp53.get(1), Some(0));
    }
}
