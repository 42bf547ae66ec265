use std::collections::BTreeSet;
use std::path::Path;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::analysis::pathway_evaluation::split_by_status;
use crate::analysis::statistics::TTestResult;
use crate::error::{plot_err, EvalResult};
use crate::models::{Pathway, ReconciledSample, ScoreKind};

const JITTER: f64 = 0.25;
const JITTER_SEED: u64 = 42;
const DECISION_THRESHOLD: f64 = 0.5;
/// Share of one status slot taken up by the dodged histology groups.
const DODGE_WIDTH: f64 = 0.8;

type StripChart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Linear-interpolated quantile of sorted values.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() as f64 - 1.0) * p;
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    if idx + 1 < sorted.len() {
        Some(sorted[idx] * (1.0 - frac) + sorted[idx + 1] * frac)
    } else {
        Some(sorted[idx])
    }
}

fn expand_range(min_val: f64, max_val: f64, pct: f64) -> (f64, f64) {
    if (max_val - min_val).abs() < 1e-9 {
        return (min_val - 0.5, max_val + 0.5);
    }
    let pad = (max_val - min_val) * pct;
    (min_val - pad, max_val + pad)
}

/// Y range covering every score and the unit interval.
fn score_range<'s>(scores: impl Iterator<Item = &'s f64> + Clone) -> (f64, f64) {
    let lo = scores.clone().copied().fold(0.0, f64::min);
    let hi = scores.copied().fold(1.0, f64::max);
    expand_range(lo, hi, 0.05)
}

fn status_chart<'a, 'b>(
    root: &'a DrawingArea<BitMapBackend<'b>, Shift>,
    caption: String,
    pathway: Pathway,
    y_range: (f64, f64),
) -> EvalResult<StripChart<'a, 'b>> {
    let mut chart = ChartBuilder::on(root)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..1.5f64, y_range.0..y_range.1)
        .map_err(plot_err)?;

    let label = pathway.label();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(2)
        .x_label_formatter(&|x: &f64| match x.round() as i64 {
            0 => format!("{label} Wild-Type"),
            1 => format!("{label} Mutant"),
            _ => String::new(),
        })
        .x_desc(format!("{label} Status"))
        .y_desc("Classifier Score")
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(plot_err)?;
    Ok(chart)
}

/// Interquartile box with a median bar, centred on `x`.
fn draw_quartile_box(chart: &mut StripChart<'_, '_>, x: f64, half_width: f64, scores: &[f64], fill: RGBColor) -> EvalResult<()> {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if let (Some(q1), Some(median), Some(q3)) =
        (quantile(&sorted, 0.25), quantile(&sorted, 0.5), quantile(&sorted, 0.75))
    {
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(x - half_width, q1), (x + half_width, q3)],
                fill.filled(),
            )))
            .map_err(plot_err)?;
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x - half_width, median), (x + half_width, median)],
                BLACK.stroke_width(2),
            )))
            .map_err(plot_err)?;
    }
    Ok(())
}

fn draw_decision_line(chart: &mut StripChart<'_, '_>) -> EvalResult<()> {
    chart
        .draw_series(DashedLineSeries::new(
            vec![(-0.5, DECISION_THRESHOLD), (1.5, DECISION_THRESHOLD)],
            8,
            6,
            BLACK.stroke_width(2),
        ))
        .map_err(plot_err)?;
    Ok(())
}

/// Strip plot of classifier scores, wild-type vs mutant, with an interquartile box per group.
pub fn draw_score_distribution(
    output_path: &Path,
    samples: &[ReconciledSample],
    pathway: Pathway,
    t_test: Option<&TTestResult>,
) -> EvalResult<()> {
    let (mutant, wild_type) = split_by_status(samples, pathway, ScoreKind::Real);
    let groups = [(0.0, wild_type), (1.0, mutant)];
    let y_range = score_range(groups.iter().flat_map(|(_, g)| g.iter()));

    let caption = match t_test {
        Some(t) => format!("{} classifier (Welch p = {:.2e})", pathway, t.p_value),
        None => format!("{} classifier", pathway),
    };

    let root = BitMapBackend::new(output_path, (500, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = status_chart(&root, caption, pathway, y_range)?;

    for (x, scores) in &groups {
        draw_quartile_box(&mut chart, *x, 0.3, scores, RGBColor(200, 200, 200))?;
    }

    // Fixed seed keeps figures reproducible between runs.
    let mut rng = StdRng::seed_from_u64(JITTER_SEED);
    for (x, scores) in &groups {
        let points: Vec<(f64, f64)> = scores
            .iter()
            .map(|&s| (x + rng.gen_range(-JITTER..JITTER), s))
            .collect();
        chart
            .draw_series(points.into_iter().map(|p| {
                Circle::new(p, 4, RGBColor(31, 119, 180).mix(0.65).filled())
            }))
            .map_err(plot_err)?;
    }

    draw_decision_line(&mut chart)?;

    root.present().map_err(plot_err)?;
    info!("Saved {}", output_path.display());
    Ok(())
}

/// Scores of one (status, histology) cell, dodged sideways within its status slot.
#[derive(Debug, Clone, PartialEq)]
pub struct HistologyGroup {
    pub histology: String,
    /// Position of the histology in sorted order; picks its colour.
    pub slot: usize,
    pub status: u8,
    pub x: f64,
    pub scores: Vec<f64>,
}

/// Group real scores by pathway status and histology.
///
/// Samples without a histology are left out. Histologies keep the same slot
/// under both statuses, and empty cells are skipped.
pub fn histology_groups(samples: &[ReconciledSample], pathway: Pathway) -> Vec<HistologyGroup> {
    let histologies: BTreeSet<&str> = samples.iter().filter_map(|s| s.histology.as_deref()).collect();
    let slot_width = DODGE_WIDTH / histologies.len().max(1) as f64;

    let mut groups = Vec::new();
    for status in [0u8, 1] {
        for (slot, histology) in histologies.iter().enumerate() {
            let scores: Vec<f64> = samples
                .iter()
                .filter(|s| s.status(pathway) == status && s.histology.as_deref() == Some(*histology))
                .map(|s| s.score(pathway, ScoreKind::Real))
                .collect();
            if scores.is_empty() {
                continue;
            }
            groups.push(HistologyGroup {
                histology: histology.to_string(),
                slot,
                status,
                x: f64::from(status) - DODGE_WIDTH / 2.0 + slot_width * (slot as f64 + 0.5),
                scores,
            });
        }
    }
    groups
}

/// Strip plot of classifier scores by status, one dodged box and colour per histology.
pub fn draw_histology_distribution(output_path: &Path, samples: &[ReconciledSample], pathway: Pathway) -> EvalResult<()> {
    let groups = histology_groups(samples, pathway);
    let n_histologies = groups.iter().map(|g| g.slot + 1).max().unwrap_or(1);
    let slot_width = DODGE_WIDTH / n_histologies as f64;
    let y_range = score_range(groups.iter().flat_map(|g| g.scores.iter()));

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = status_chart(&root, format!("{} classifier by histology", pathway), pathway, y_range)?;

    for group in &groups {
        draw_quartile_box(&mut chart, group.x, slot_width * 0.4, &group.scores, RGBColor(215, 215, 215))?;
    }

    let mut rng = StdRng::seed_from_u64(JITTER_SEED);
    let jitter = slot_width * 0.3;
    for slot in 0..n_histologies {
        let cells: Vec<&HistologyGroup> = groups.iter().filter(|g| g.slot == slot).collect();
        let Some(first) = cells.first() else {
            continue;
        };
        let histology = first.histology.clone();
        let colour = Palette99::pick(slot).to_rgba();
        let points: Vec<(f64, f64)> = cells
            .iter()
            .flat_map(|g| g.scores.iter().map(move |&s| (g.x, s)))
            .map(|(x, s)| (x + rng.gen_range(-jitter..jitter), s))
            .collect();
        chart
            .draw_series(points.into_iter().map(move |p| Circle::new(p, 4, colour.mix(0.65).filled())))
            .map_err(plot_err)?
            .label(histology)
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, colour.filled()));
    }

    draw_decision_line(&mut chart)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 12))
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    info!("Saved {}", output_path.display());
    Ok(())
}
