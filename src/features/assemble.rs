//! Feature assembler
//!
//! Runs the three table transformations and left-joins their outputs onto
//! the applicant key. Every applicant row survives the joins; applicants
//! with no bureau or prior-application history carry null aggregate columns.

use polars::prelude::*;

use super::application::transform_application;
use super::bureau::build_bureau_agg;
use super::policy::{ID_COL, TARGET_COL};
use super::previous::build_prev_app_agg;
use crate::error::{Result, ScorerError};

/// The assembled feature table plus the bookkeeping columns that are not
/// model features: the applicant ids (for attaching predictions) and, when
/// assembling training data, the row-aligned labels.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub features: DataFrame,
    pub ids: Column,
    pub labels: Option<Column>,
}

/// Build the flat feature table from the three raw tables.
///
/// With `with_target` the applicant table must carry the label column; it is
/// pulled before any transformation or aggregation work begins.
pub fn build_features(
    app: &DataFrame,
    bureau: &DataFrame,
    prev: &DataFrame,
    with_target: bool,
) -> Result<FeatureSet> {
    let ids = app
        .column(ID_COL)
        .map_err(|_| ScorerError::SchemaError(format!("applicant table lacks {ID_COL}")))?
        .clone();

    let labels = if with_target {
        let target = app
            .column(TARGET_COL)
            .map_err(|_| ScorerError::SchemaError(format!("training table lacks {TARGET_COL}")))?
            .clone();
        Some(target)
    } else {
        None
    };

    // Label stripped before transformation; the id is re-attached afterwards
    // as the join key (the drop policy removes it).
    let app_input = app.drop_many([TARGET_COL]);
    let mut transformed = transform_application(&app_input)?;
    transformed.with_column(ids.clone())?;

    let bureau_agg = build_bureau_agg(bureau)?;
    let prev_agg = build_prev_app_agg(prev)?;

    let joined = transformed
        .left_join(&bureau_agg, [ID_COL], [ID_COL])?
        .left_join(&prev_agg, [ID_COL], [ID_COL])?;

    let features = joined.drop_many([ID_COL]);

    Ok(FeatureSet {
        features,
        ids,
        labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_app_frame() -> DataFrame {
        df!(
            ID_COL => &[100i64, 101],
            TARGET_COL => &[1i64, 0],
            "AMT_INCOME_TOTAL" => &[0.0, 2000.0],
            "AMT_CREDIT" => &[5000.0, 4000.0],
            "CODE_GENDER" => &["M", "F"],
        )
        .unwrap()
    }

    fn create_bureau_frame() -> DataFrame {
        df!(
            ID_COL => &[100i64],
            "SK_ID_BUREAU" => &[1i64],
            "DAYS_CREDIT" => &[-100i64],
            "CREDIT_DAY_OVERDUE" => &[0i64],
            "AMT_CREDIT_SUM_OVERDUE" => &[0.0],
            "CNT_CREDIT_PROLONG" => &[0i64],
            "AMT_CREDIT_SUM_DEBT" => &[1000.0],
            "AMT_CREDIT_SUM" => &[2000.0],
            "CREDIT_ACTIVE" => &["Active"],
        )
        .unwrap()
    }

    fn create_empty_prev_frame() -> DataFrame {
        df!(
            ID_COL => &[0i64],
            "SK_ID_PREV" => &[0i64],
            "AMT_APPLICATION" => &[0.0],
            "AMT_CREDIT" => &[0.0],
            "AMT_ANNUITY" => &[0.0],
            "CNT_PAYMENT" => &[0i64],
            "DAYS_DECISION" => &[0i64],
            "NAME_CONTRACT_STATUS" => &["Approved"],
        )
        .unwrap()
        .head(Some(0))
    }

    #[test]
    fn test_row_count_matches_applicant_table() {
        let set = build_features(
            &create_app_frame(),
            &create_bureau_frame(),
            &create_empty_prev_frame(),
            true,
        )
        .unwrap();
        assert_eq!(set.features.height(), 2);
        assert_eq!(set.ids.len(), 2);
    }

    #[test]
    fn test_id_dropped_and_labels_aligned() {
        let set = build_features(
            &create_app_frame(),
            &create_bureau_frame(),
            &create_empty_prev_frame(),
            true,
        )
        .unwrap();
        assert!(set.features.column(ID_COL).is_err());
        assert!(set.features.column(TARGET_COL).is_err());

        let labels = set.labels.unwrap();
        let labels = labels.i64().unwrap();
        assert_eq!(labels.get(0), Some(1));
        assert_eq!(labels.get(1), Some(0));
    }

    #[test]
    fn test_missing_target_fails_fast() {
        let app = create_app_frame().drop_many([TARGET_COL]);
        let err = build_features(
            &app,
            &create_bureau_frame(),
            &create_empty_prev_frame(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ScorerError::SchemaError(_)));
    }

    #[test]
    fn test_prediction_mode_needs_no_target() {
        let app = create_app_frame().drop_many([TARGET_COL]);
        let set = build_features(
            &app,
            &create_bureau_frame(),
            &create_empty_prev_frame(),
            false,
        )
        .unwrap();
        assert!(set.labels.is_none());
        assert_eq!(set.features.height(), 2);
    }

    #[test]
    fn test_history_free_applicant_gets_nulls() {
        let set = build_features(
            &create_app_frame(),
            &create_bureau_frame(),
            &create_empty_prev_frame(),
            true,
        )
        .unwrap();

        let active = set.features.column("BUREAU_ACTIVE_CNT").unwrap().u32().unwrap();
        assert_eq!(active.get(0), Some(1));
        assert!(active.get(1).is_none());

        let prev_cnt = set.features.column("PREV_APP_CNT").unwrap().u32().unwrap();
        assert!(prev_cnt.get(0).is_none());
        assert!(prev_cnt.get(1).is_none());
    }
}
