use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::analysis::histology::histology_breakdown;
use crate::analysis::pathway_evaluation::{evaluate_pathways, PathwayResults};
use crate::analysis::roc::{draw_precision_recall_figure, draw_roc_figure};
use crate::analysis::score_distribution::{draw_histology_distribution, draw_score_distribution};
use crate::config::EvaluationConfig;
use crate::data_handling::classifier_scores::load_score_table;
use crate::data_handling::clinical::load_clinical_table;
use crate::data_handling::mutation_status::load_status_table;
use crate::error::EvalResult;
use crate::helper_functions::ensure_dir;
use crate::models::{Pathway, ReconciledSample};
use crate::reconcile::{exclude_unresolved, reconcile, samples_to_dataframe};
use crate::report::{save_auc_values, save_table, write_metrics_json};

mod analysis;
mod config;
mod data_handling;
mod error;
mod helper_functions;
mod models;
mod reconcile;
mod report;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting PDX classifier evaluation");

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = EvaluationConfig::load(config_path.as_deref()).context("loading configuration")?;

    let summary = run(&config)?;
    info!(
        "Evaluated {} samples ({} unresolved identifiers)",
        summary.n_samples, summary.n_unresolved
    );
    let failed = summary.results.values().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!("{} pathway evaluation(s) failed, see pathway_metrics.json", failed);
    }
    Ok(())
}

#[derive(Debug)]
struct RunSummary {
    n_samples: usize,
    n_unresolved: usize,
    results: PathwayResults,
}

fn run(config: &EvaluationConfig) -> Result<RunSummary> {
    // Load every table before joining; any malformed input aborts the run
    let ras_mutations = load_status_table(&config.ras_status_path).context("loading Ras status table")?;
    let tp53_mutations = load_status_table(&config.tp53_status_path).context("loading TP53 status table")?;
    let clinical = load_clinical_table(&config.clinical_path).context("loading clinical table")?;
    let scores = load_score_table(&config.scores_path).context("loading classifier scores")?;

    let reconciliation = reconcile(&scores, &clinical, &tp53_mutations, &ras_mutations);

    let samples = if config.exclude_unresolved {
        exclude_unresolved(&reconciliation.samples)
    } else {
        if !reconciliation.unresolved.is_empty() {
            info!(
                "{} unresolved samples are evaluated as wild-type; set exclude_unresolved to drop them",
                reconciliation.unresolved.count
            );
        }
        reconciliation.samples.clone()
    };

    let results = evaluate_pathways(&samples);

    ensure_dir(&config.output_dir)?;
    let reconciled_df = samples_to_dataframe(&reconciliation.samples)?;
    save_table(
        &config.output_dir.join("reconciled_samples.tsv"),
        &reconciled_df,
        "Reconciled samples",
    )?;

    let breakdown = histology_breakdown(&samples_to_dataframe(&samples)?).context("summarising histology")?;
    save_table(
        &config.output_dir.join("histology_breakdown.tsv"),
        &breakdown,
        "Histology breakdown",
    )?;

    write_metrics_json(&config.output_dir.join("pathway_metrics.json"), &results)?;
    save_auc_values(&config.output_dir.join("auc_values.tsv"), &results)?;

    // Figures are a by-product; a rendering failure must not discard the tables above
    if let Err(e) = render_figures(config, &samples, &results) {
        warn!("Figure rendering failed: {}", e);
    }

    Ok(RunSummary {
        n_samples: samples.len(),
        n_unresolved: reconciliation.unresolved.count,
        results,
    })
}

fn render_figures(config: &EvaluationConfig, samples: &[ReconciledSample], results: &PathwayResults) -> EvalResult<()> {
    ensure_dir(&config.figure_dir)?;
    draw_roc_figure(&config.figure_dir.join("pdx_classifier_roc_curve.png"), results)?;
    draw_precision_recall_figure(
        &config.figure_dir.join("pdx_classifier_precision_recall_curve.png"),
        results,
    )?;

    for pathway in Pathway::ALL {
        let t_test = results
            .get(&pathway)
            .and_then(|r| r.as_ref().ok())
            .map(|eval| &eval.t_test);
        let path = config
            .figure_dir
            .join(format!("{}_predictions.png", pathway.file_stem()));
        draw_score_distribution(&path, samples, pathway, t_test)?;

        let path = config
            .figure_dir
            .join(format!("{}_predictions_histology.png", pathway.file_stem()));
        draw_histology_distribution(&path, samples, pathway)?;
    }
    Ok(())
}
