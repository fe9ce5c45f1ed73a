//! Prior-application aggregator
//!
//! Collapses the one-row-per-prior-application table into one row per
//! applicant: per-row ratio features first, then aggregates, then the
//! contract-status crosstab converted to approval/refusal rates.

use polars::prelude::*;

use super::policy::{safe_ratio, ID_COL};
use crate::error::Result;

/// The four contract-status categories. Unlike the bureau side these are
/// always synthesized, so the rate computation below never touches an
/// absent column.
const STATUS_COUNTS: [(&str, &str); 4] = [
    ("Approved", "PREV_APP_APPROVED_CNT"),
    ("Refused", "PREV_APP_REFUSED_CNT"),
    ("Canceled", "PREV_APP_CANCELED_CNT"),
    ("Unused offer", "PREV_APP_UNUSED_OFFER_CNT"),
];

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

fn as_f64(name: &str) -> Expr {
    col(name).cast(DataType::Float64)
}

/// Aggregate the prior-application table to one row per distinct applicant
/// id, sorted by id. The raw per-status counts are intermediate and dropped;
/// the output keeps the aggregates, the total count, and the two rates.
pub fn build_prev_app_agg(prev: &DataFrame) -> Result<DataFrame> {
    let mut lf = prev.clone().lazy();

    // Per-row ratios, zero-guarded to null, derived only when both source
    // columns are present.
    if has_column(prev, "AMT_CREDIT") && has_column(prev, "AMT_APPLICATION") {
        lf = lf.with_column(
            safe_ratio(col("AMT_CREDIT"), col("AMT_APPLICATION")).alias("CREDIT_APP_RATIO"),
        );
    }
    if has_column(prev, "AMT_ANNUITY") && has_column(prev, "AMT_CREDIT") {
        lf = lf.with_column(
            safe_ratio(col("AMT_ANNUITY"), col("AMT_CREDIT")).alias("ANNUITY_CREDIT_RATIO"),
        );
    }

    let mut aggs = vec![
        col("SK_ID_PREV")
            .count()
            .cast(DataType::UInt32)
            .alias("PREV_APP_CNT"),
        as_f64("AMT_CREDIT").sum().alias("PREV_APP_AMT_CREDIT_SUM"),
        as_f64("AMT_CREDIT").max().alias("PREV_APP_AMT_CREDIT_MAX"),
        as_f64("CNT_PAYMENT").mean().alias("PREV_APP_CNT_PAYMENT_AVG"),
        as_f64("DAYS_DECISION").max().alias("PREV_APP_LAST_DAYS_DECISION"),
        as_f64("AMT_ANNUITY").mean().alias("PREV_APP_AMT_ANNUITY_AVG"),
    ];

    // Means only of the ratios actually derived above.
    if has_column(prev, "AMT_CREDIT") && has_column(prev, "AMT_APPLICATION") {
        aggs.push(
            col("CREDIT_APP_RATIO")
                .mean()
                .alias("PREV_APP_CREDIT_APP_RATIO_AVG"),
        );
    }
    if has_column(prev, "AMT_ANNUITY") && has_column(prev, "AMT_CREDIT") {
        aggs.push(
            col("ANNUITY_CREDIT_RATIO")
                .mean()
                .alias("PREV_APP_ANNUITY_CREDIT_RATIO_AVG"),
        );
    }

    for (status, out_name) in STATUS_COUNTS {
        aggs.push(
            col("NAME_CONTRACT_STATUS")
                .eq(lit(status))
                .sum()
                .cast(DataType::UInt32)
                .alias(out_name),
        );
    }

    let status_cols: Vec<Expr> = STATUS_COUNTS
        .iter()
        .map(|(_, name)| col(*name).cast(DataType::Float64))
        .collect();
    let total: Expr = status_cols
        .into_iter()
        .reduce(|acc, e| acc + e)
        .expect("status column set is non-empty");

    let agg = lf
        .group_by([col(ID_COL)])
        .agg(aggs)
        .with_column(total.alias("PREV_APP_TOTAL_CNT"))
        .with_columns([
            safe_ratio(col("PREV_APP_APPROVED_CNT"), col("PREV_APP_TOTAL_CNT"))
                .alias("PREV_APP_APPROVED_RATE"),
            safe_ratio(col("PREV_APP_REFUSED_CNT"), col("PREV_APP_TOTAL_CNT"))
                .alias("PREV_APP_REFUSED_RATE"),
        ])
        .sort([ID_COL], SortMultipleOptions::default())
        .collect()?;

    // The raw per-status counts are intermediate; only total and rates merge.
    Ok(agg.drop_many(STATUS_COUNTS.iter().map(|(_, name)| *name)))
}
