use polars::prelude::*;
use tracing::debug;

use crate::error::EvalResult;
use crate::models::Pathway;

/// Sample counts and mean classifier scores per histology and pathway status.
///
/// Expects the frame produced by `reconcile::samples_to_dataframe`; unresolved
/// samples form their own null-histology group.
pub fn histology_breakdown(samples: &DataFrame) -> EvalResult<DataFrame> {
    let mut breakdown: Option<DataFrame> = None;

    for pathway in Pathway::ALL {
        let summary = samples
            .clone()
            .lazy()
            .group_by([col("histology"), col(pathway.status_column()).alias("status")])
            .agg([
                col("sample_id").count().cast(DataType::Int64).alias("n_samples"),
                col(Pathway::Ras.score_column()).mean().alias("mean_ras_score"),
                col(Pathway::Tp53.score_column()).mean().alias("mean_tp53_score"),
            ])
            .with_column(lit(pathway.label()).alias("pathway"))
            .select([
                col("pathway"),
                col("histology"),
                col("status"),
                col("n_samples"),
                col("mean_ras_score"),
                col("mean_tp53_score"),
            ])
            .sort_by_exprs([col("histology"), col("status")], SortMultipleOptions::default())
            .collect()?;

        debug!("{} histology groups for {}", summary.height(), pathway);
        breakdown = Some(match breakdown {
            None => summary,
            Some(mut acc) => {
                acc.vstack_mut(&summary)?;
                acc
            }
        });
    }

    Ok(breakdown.unwrap_or_default())
}
