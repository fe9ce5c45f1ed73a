//! Applicant table transformer
//!
//! Cleans and augments the one-row-per-applicant table: applies the drop
//! policy, prunes the document-flag family, nulls out the days-employed
//! sentinel, and derives the income ratios. Row count is preserved and the
//! input is never mutated.

use polars::prelude::*;

use super::policy::{
    safe_ratio, DAYS_EMPLOYED_SENTINEL, DOC_FLAG_KEPT, DOC_FLAG_PREFIX, DROP_COLS,
};
use crate::error::Result;

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Transform the applicant table. All column-presence checks are tolerant:
/// a drop-policy or ratio-source column missing from the input is a no-op.
pub fn transform_application(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.drop_many(DROP_COLS);

    // Drop every document flag except the designated one.
    let doc_cols: Vec<String> = out
        .get_column_names()
        .iter()
        .filter(|c| c.starts_with(DOC_FLAG_PREFIX) && c.as_str() != DOC_FLAG_KEPT)
        .map(|c| c.to_string())
        .collect();
    out = out.drop_many(doc_cols);

    let mut lf = out.lazy();

    // 365243 encodes "not applicable", not a valid day count.
    if has_column(df, "DAYS_EMPLOYED") {
        lf = lf.with_column(
            when(col("DAYS_EMPLOYED").eq(lit(DAYS_EMPLOYED_SENTINEL)))
                .then(lit(NULL))
                .otherwise(col("DAYS_EMPLOYED"))
                .alias("DAYS_EMPLOYED"),
        );
    }

    if has_column(df, "AMT_CREDIT") && has_column(df, "AMT_INCOME_TOTAL") {
        lf = lf.with_column(
            safe_ratio(col("AMT_CREDIT"), col("AMT_INCOME_TOTAL")).alias("CREDIT_TO_INCOME"),
        );
    }

    if has_column(df, "AMT_ANNUITY") && has_column(df, "AMT_INCOME_TOTAL") {
        lf = lf.with_column(
            safe_ratio(col("AMT_ANNUITY"), col("AMT_INCOME_TOTAL")).alias("ANNUITY_TO_INCOME"),
        );
    }

    Ok(lf.collect()?)
}
