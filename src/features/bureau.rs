//! Credit-bureau aggregator
//!
//! Collapses the one-row-per-credit-line table into one row per applicant.
//! Applicants absent from the input simply do not appear here; the later
//! left join supplies missing values for them.

use polars::prelude::*;

use super::policy::ID_COL;
use crate::error::Result;

/// Per-status count columns, materialized for every input (zero-filled when
/// a status never occurs).
const STATUS_COUNTS: [(&str, &str); 4] = [
    ("Active", "BUREAU_ACTIVE_CNT"),
    ("Closed", "BUREAU_CLOSED_CNT"),
    ("Sold", "BUREAU_SOLD_CNT"),
    ("Bad debt", "BUREAU_BAD_DEBT_CNT"),
];

fn as_f64(name: &str) -> Expr {
    // Sources are cast up front so a header-only input still aggregates to a
    // well-typed empty frame.
    col(name).cast(DataType::Float64)
}

/// Aggregate the bureau table to one row per distinct applicant id,
/// sorted by id.
pub fn build_bureau_agg(bureau: &DataFrame) -> Result<DataFrame> {
    let mut aggs = vec![
        col("SK_ID_BUREAU")
            .count()
            .cast(DataType::UInt32)
            .alias("BUREAU_CNT"),
        as_f64("DAYS_CREDIT").max().alias("BUREAU_DAYS_CREDIT_MAX"),
        as_f64("DAYS_CREDIT").mean().alias("BUREAU_DAYS_CREDIT_AVG"),
        as_f64("CREDIT_DAY_OVERDUE")
            .max()
            .alias("BUREAU_CREDIT_DAY_OVERDUE_MAX"),
        as_f64("AMT_CREDIT_SUM_OVERDUE")
            .sum()
            .alias("BUREAU_AMT_CREDIT_SUM_OVERDUE_SUM"),
        as_f64("CNT_CREDIT_PROLONG")
            .sum()
            .alias("BUREAU_CNT_CREDIT_PROLONG_SUM"),
        as_f64("AMT_CREDIT_SUM_DEBT")
            .max()
            .alias("BUREAU_AMT_CREDIT_SUM_DEBT_MAX"),
        as_f64("AMT_CREDIT_SUM_DEBT")
            .sum()
            .alias("BUREAU_AMT_CREDIT_SUM_DEBT_SUM"),
        as_f64("AMT_CREDIT_SUM").sum().alias("BUREAU_AMT_CREDIT_SUM_SUM"),
    ];

    for (status, out_name) in STATUS_COUNTS {
        aggs.push(
            col("CREDIT_ACTIVE")
                .eq(lit(status))
                .sum()
                .cast(DataType::UInt32)
                .alias(out_name),
        );
    }

    let agg = bureau
        .clone()
        .lazy()
        .group_by([col(ID_COL)])
        .agg(aggs)
        .sort([ID_COL], SortMultipleOptions::default())
        .collect()?;

    Ok(agg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_bureau_frame() -> DataFrame {
        df!(
            ID_COL => &[100i64, 100, 100, 101],
            "SK_ID_BUREAU" => &[1i64, 2, 3, 4],
            "DAYS_CREDIT" => &[-100i64, -400, -900, -50],
            "CREDIT_DAY_OVERDUE" => &[0i64, 12, 0, 0],
            "AMT_CREDIT_SUM_OVERDUE" => &[0.0, 150.0, 0.0, 0.0],
            "CNT_CREDIT_PROLONG" => &[0i64, 1, 0, 0],
            "AMT_CREDIT_SUM_DEBT" => &[1000.0, 2500.0, 0.0, 300.0],
            "AMT_CREDIT_SUM" => &[2000.0, 3000.0, 1000.0, 500.0],
            "CREDIT_ACTIVE" => &["Active", "Active", "Closed", "Active"],
        )
        .unwrap()
    }

    #[test]
    fn test_one_row_per_distinct_applicant() {
        let agg = build_bureau_agg(&create_bureau_frame()).unwrap();
        assert_eq!(agg.height(), 2);
        let ids = agg.column(ID_COL).unwrap().i64().unwrap();
        assert_eq!(ids.get(0), Some(100));
        assert_eq!(ids.get(1), Some(101));
    }

    #[test]
    fn test_aggregate_values() {
        let agg = build_bureau_agg(&create_bureau_frame()).unwrap();

        let cnt = agg.column("BUREAU_CNT").unwrap().u32().unwrap();
        assert_eq!(cnt.get(0), Some(3));
        assert_eq!(cnt.get(1), Some(1));

        let days_max = agg.column("BUREAU_DAYS_CREDIT_MAX").unwrap().f64().unwrap();
        assert_eq!(days_max.get(0), Some(-100.0));

        let days_avg = agg.column("BUREAU_DAYS_CREDIT_AVG").unwrap().f64().unwrap();
        assert!((days_avg.get(0).unwrap() - (-1400.0 / 3.0)).abs() < 1e-9);

        let overdue_sum = agg
            .column("BUREAU_AMT_CREDIT_SUM_OVERDUE_SUM")
            .unwrap()
            .f64()
            .unwrap();
        assert_eq!(overdue_sum.get(0), Some(150.0));

        let debt_max = agg
            .column("BUREAU_AMT_CREDIT_SUM_DEBT_MAX")
            .unwrap()
            .f64()
            .unwrap();
        assert_eq!(debt_max.get(0), Some(2500.0));

        let credit_sum = agg.column("BUREAU_AMT_CREDIT_SUM_SUM").unwrap().f64().unwrap();
        assert_eq!(credit_sum.get(0), Some(6000.0));
    }

    #[test]
    fn test_status_counts_zero_filled() {
        let agg = build_bureau_agg(&create_bureau_frame()).unwrap();

        let active = agg.column("BUREAU_ACTIVE_CNT").unwrap().u32().unwrap();
        let closed = agg.column("BUREAU_CLOSED_CNT").unwrap().u32().unwrap();
        let sold = agg.column("BUREAU_SOLD_CNT").unwrap().u32().unwrap();
        let bad_debt = agg.column("BUREAU_BAD_DEBT_CNT").unwrap().u32().unwrap();

        assert_eq!(active.get(0), Some(2));
        assert_eq!(closed.get(0), Some(1));
        assert_eq!(sold.get(0), Some(0));
        assert_eq!(bad_debt.get(0), Some(0));
        assert_eq!(active.get(1), Some(1));
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let empty = create_bureau_frame().head(Some(0));
        let agg = build_bureau_agg(&empty).unwrap();
        assert_eq!(agg.height(), 0);
        assert!(agg.column("BUREAU_ACTIVE_CNT").is_ok());
    }
}
