//! End-to-end orchestration: raw CSVs in, trained model artifact or
//! submission file out.

use ndarray::Array1;
use polars::prelude::*;
use std::path::Path;

use crate::data::{load_raw_tables, write_predictions, ApplicationKind};
use crate::error::{Result, ScorerError};
use crate::features::policy::{CAT_FEATURES, TARGET_COL};
use crate::features::build_features;
use crate::model::{stratified_split, Dataset, GbdtClassifier, GbdtConfig};

/// Share of training rows held out for validation and early stopping.
pub const VALIDATION_RATIO: f64 = 0.2;

/// Train on `application_train.csv` (+ history tables) under `data_dir` and
/// write the model artifact to `model_path`.
pub fn train_and_save(data_dir: &Path, model_path: &Path, seed: u64) -> Result<GbdtClassifier> {
    let config = GbdtConfig {
        random_seed: seed,
        ..Default::default()
    };
    train_with_config(data_dir, model_path, config)
}

pub fn train_with_config(
    data_dir: &Path,
    model_path: &Path,
    config: GbdtConfig,
) -> Result<GbdtClassifier> {
    let raw = load_raw_tables(data_dir, ApplicationKind::Train)?;
    tracing::info!(
        applications = raw.application.height(),
        bureau_rows = raw.bureau.height(),
        previous_rows = raw.previous.height(),
        "loaded raw tables"
    );

    let feature_set = build_features(&raw.application, &raw.bureau, &raw.previous, true)?;
    let labels = feature_set
        .labels
        .ok_or_else(|| ScorerError::SchemaError(format!("{TARGET_COL} column missing")))?;
    let y = column_to_labels(&labels)?;

    let (train_idx, val_idx) = stratified_split(&y, VALIDATION_RATIO, config.random_seed)?;
    tracing::info!(
        train = train_idx.len(),
        validation = val_idx.len(),
        features = feature_set.features.width(),
        "split training data"
    );

    let train_df = take_rows(&feature_set.features, &train_idx)?;
    let val_df = take_rows(&feature_set.features, &val_idx)?;
    let y_train = select_labels(&y, &train_idx);
    let y_val = select_labels(&y, &val_idx);

    let train_ds = Dataset::new(&train_df, &CAT_FEATURES)?;
    let val_ds = Dataset::new(&val_df, &CAT_FEATURES)?;

    let mut model = GbdtClassifier::new(config);
    model.fit(&train_ds, &y_train, &val_ds, &y_val)?;
    tracing::info!(
        best_iteration = model.best_iteration(),
        best_score = model.best_score(),
        "training finished"
    );

    if let Some(parent) = model_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    model.save(model_path)?;
    Ok(model)
}

/// Score `application_test.csv` under `data_dir` with the artifact at
/// `model_path` and write the two-column submission file to `out_path`.
pub fn predict_and_save(data_dir: &Path, model_path: &Path, out_path: &Path) -> Result<DataFrame> {
    let raw = load_raw_tables(data_dir, ApplicationKind::Test)?;
    let feature_set = build_features(&raw.application, &raw.bureau, &raw.previous, false)?;

    let model = GbdtClassifier::load(model_path)?;
    let dataset = Dataset::new(&feature_set.features, &CAT_FEATURES)?;
    let proba = model.predict_proba(&dataset)?;
    tracing::info!(rows = proba.len(), "scored applications");

    let mut out = DataFrame::new(vec![
        feature_set.ids.clone(),
        Column::new(TARGET_COL.into(), proba.to_vec()),
    ])?;
    write_predictions(&mut out, out_path)?;
    Ok(out)
}

fn column_to_labels(column: &Column) -> Result<Array1<f64>> {
    let casted = column.cast(&DataType::Float64)?;
    let values = casted.f64()?;
    let mut y = Vec::with_capacity(values.len());
    for value in values {
        y.push(value.ok_or_else(|| {
            ScorerError::DataError(format!("null value in {TARGET_COL} column"))
        })?);
    }
    Ok(Array1::from_vec(y))
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let taken = df.take(&IdxCa::from_vec("idx".into(), idx))?;
    Ok(taken)
}

fn select_labels(y: &Array1<f64>, indices: &[usize]) -> Array1<f64> {
    indices.iter().map(|&i| y[i]).collect()
}
