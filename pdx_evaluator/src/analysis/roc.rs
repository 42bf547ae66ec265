use std::path::Path;

use plotters::prelude::*;
use plotters::style::RGBColor;
use tracing::{info, warn};

use crate::analysis::metrics::ClassifierMetrics;
use crate::analysis::pathway_evaluation::{PathwayEvaluation, PathwayResults};
use crate::error::{plot_err, EvalResult};
use crate::models::{Pathway, ScoreKind};

const CAPTION_FONT: (&str, u32) = ("sans-serif bold", 24);
const AXIS_FONT: (&str, u32) = ("sans-serif", 20);
const LABEL_FONT: (&str, u32) = ("sans-serif", 16);

pub fn colour_for_pathway(pathway: Pathway) -> RGBColor {
    match pathway {
        Pathway::Ras => RGBColor(27, 158, 119),
        Pathway::Tp53 => RGBColor(217, 95, 2),
    }
}

#[derive(Clone, Copy)]
enum Curve {
    Roc,
    PrecisionRecall,
}

impl Curve {
    fn points(&self, m: &ClassifierMetrics) -> Vec<(f64, f64)> {
        match self {
            Curve::Roc => m.fpr.iter().copied().zip(m.tpr.iter().copied()).collect(),
            Curve::PrecisionRecall => m.recall.iter().copied().zip(m.precision.iter().copied()).collect(),
        }
    }

    fn area(&self, m: &ClassifierMetrics) -> (&'static str, f64) {
        match self {
            Curve::Roc => ("AUROC", m.auroc),
            Curve::PrecisionRecall => ("AUPR", m.aupr),
        }
    }
}

/// ROC curves of both classifiers, real scores solid and shuffled scores dashed.
pub fn draw_roc_figure(output_path: &Path, results: &PathwayResults) -> EvalResult<()> {
    draw_curves(
        output_path,
        results,
        Curve::Roc,
        "PDX classifier ROC",
        ("False Positive Rate", "True Positive Rate"),
    )
}

pub fn draw_precision_recall_figure(output_path: &Path, results: &PathwayResults) -> EvalResult<()> {
    draw_curves(
        output_path,
        results,
        Curve::PrecisionRecall,
        "PDX classifier precision-recall",
        ("Recall", "Precision"),
    )
}

fn draw_curves(
    output_path: &Path,
    results: &PathwayResults,
    curve: Curve,
    caption: &str,
    (x_desc, y_desc): (&str, &str),
) -> EvalResult<()> {
    let evaluated: Vec<&PathwayEvaluation> = results.values().filter_map(|r| r.as_ref().ok()).collect();
    if evaluated.is_empty() {
        warn!("No pathway could be evaluated, skipping {}", output_path.display());
        return Ok(());
    }

    let root = BitMapBackend::new(output_path, (800, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .axis_desc_style(AXIS_FONT)
        .label_style(LABEL_FONT)
        .draw()
        .map_err(plot_err)?;

    for eval in &evaluated {
        let colour = colour_for_pathway(eval.pathway);
        for kind in ScoreKind::ALL {
            let metrics = eval.metrics(kind);
            let (area_name, area) = curve.area(metrics);
            let points = curve.points(metrics);

            let anno = match kind {
                ScoreKind::Real => chart
                    .draw_series(LineSeries::new(points, colour.stroke_width(3)))
                    .map_err(plot_err)?,
                ScoreKind::Shuffled => chart
                    .draw_series(DashedLineSeries::new(points, 6, 4, colour.mix(0.7).stroke_width(2)))
                    .map_err(plot_err)?,
            };
            let label = match kind {
                ScoreKind::Real => format!("{} ({} = {:.2})", eval.pathway, area_name, area),
                ScoreKind::Shuffled => format!("{} Shuffle ({} = {:.2})", eval.pathway, area_name, area),
            };
            anno.label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], colour.stroke_width(3)));
        }
    }

    if let Curve::Roc = curve {
        chart
            .draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], BLACK.mix(0.3).stroke_width(2)))
            .map_err(plot_err)?
            .label("Random")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], BLACK.mix(0.3).stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(LABEL_FONT)
        .position(SeriesLabelPosition::LowerRight)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    info!("Saved {}", output_path.display());
    Ok(())
}
