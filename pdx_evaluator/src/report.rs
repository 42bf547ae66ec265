use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::analysis::pathway_evaluation::PathwayResults;
use crate::error::EvalResult;
use crate::helper_functions::write_tsv;
use crate::models::ScoreKind;

/// JSON summary keyed by pathway; failed pathways carry their error message.
pub fn metrics_summary(results: &PathwayResults) -> EvalResult<Value> {
    let mut summary = Map::new();
    for (pathway, result) in results {
        let entry = match result {
            Ok(eval) => serde_json::to_value(eval)?,
            Err(e) => json!({ "pathway": pathway, "error": e.to_string() }),
        };
        summary.insert(pathway.file_stem().to_string(), entry);
    }
    Ok(Value::Object(summary))
}

pub fn write_metrics_json(path: &Path, results: &PathwayResults) -> EvalResult<()> {
    let summary = metrics_summary(results)?;
    serde_json::to_writer_pretty(File::create(path)?, &summary)?;
    info!("Metrics summary saved to: {}", path.display());
    Ok(())
}

/// One row per evaluated (pathway, score kind) pair.
pub fn auc_table(results: &PathwayResults) -> EvalResult<DataFrame> {
    let mut pathway_col = Vec::new();
    let mut kind_col = Vec::new();
    let mut auroc_col = Vec::new();
    let mut aupr_col = Vec::new();

    for eval in results.values().filter_map(|r| r.as_ref().ok()) {
        for kind in ScoreKind::ALL {
            let m = eval.metrics(kind);
            pathway_col.push(eval.pathway.label());
            kind_col.push(kind.label());
            auroc_col.push(m.auroc);
            aupr_col.push(m.aupr);
        }
    }

    let df = DataFrame::new(vec![
        Column::from(Series::new("pathway".into(), pathway_col)),
        Column::from(Series::new("scores".into(), kind_col)),
        Column::from(Series::new("auroc".into(), auroc_col)),
        Column::from(Series::new("aupr".into(), aupr_col)),
    ])?;
    Ok(df)
}

pub fn save_auc_values(path: &Path, results: &PathwayResults) -> EvalResult<()> {
    let mut df = auc_table(results)?;
    write_tsv(&mut df, path)?;
    info!("AUC values saved to: {}", path.display());
    Ok(())
}

pub fn save_table(path: &Path, df: &DataFrame, what: &str) -> EvalResult<()> {
    let mut df = df.clone();
    write_tsv(&mut df, path)?;
    info!("{} ({} rows) saved to: {}", what, df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::pathway_evaluation::evaluate_pathways;
    use crate::models::{Pathway, ReconciledSample, WILD_TYPE};

    fn samples() -> Vec<ReconciledSample> {
        [(0.9, 1u8), (0.7, 1), (0.4, 0), (0.2, 0), (0.6, 0)]
            .iter()
            .enumerate()
            .map(|(i, &(score, status))| ReconciledSample {
                sample_id: format!("TM{i}"),
                model_id: Some(format!("TM{i}")),
                histology: Some("Breast".to_string()),
                ras_score: score,
                tp53_score: score,
                ras_shuffle: 0.5 + i as f64 / 100.0,
                tp53_shuffle: 0.5,
                ras_mutant_gene: if status == 1 { "KRAS".into() } else { WILD_TYPE.into() },
                tp53_mutant_gene: WILD_TYPE.into(),
                ras_status: status,
                tp53_status: 0,
            })
            .collect()
    }

    #[test]
    fn summary_reports_errors_per_pathway() {
        let results = evaluate_pathways(&samples());
        let summary = metrics_summary(&results).unwrap();

        assert_eq!(summary["ras"]["pathway"], "ras");
        let auroc = summary["ras"]["real"]["auroc"].as_f64().unwrap();
        assert!((auroc - 1.0).abs() < 1e-12);
        assert_eq!(summary["ras"]["n_mutant"], 2);
        assert!(summary["tp53"]["error"].as_str().unwrap().contains("one class"));
    }

    #[test]
    fn auc_table_skips_failed_pathways() {
        let results = evaluate_pathways(&samples());
        let df = auc_table(&results).unwrap();
        assert_eq!(df.height(), 2);
        let pathway = df.column("pathway").unwrap().str().unwrap();
        assert_eq!(pathway.get(0), Some(Pathway::Ras.label()));
    }

    #[test]
    fn writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let results = evaluate_pathways(&samples());
        let json_path = dir.path().join("pathway_metrics.json");
        let auc_path = dir.path().join("auc_values.tsv");

        write_metrics_json(&json_path, &results).unwrap();
        save_auc_values(&auc_path, &results).unwrap();

        let parsed: Value = serde_json::from_reader(File::open(&json_path).unwrap()).unwrap();
        assert!(parsed.get("ras").is_some());
        let auc = std::fs::read_to_string(&auc_path).unwrap();
        assert!(auc.starts_with("pathway\tscores\tauroc\taupr"));
    }
}
