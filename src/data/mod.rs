//! Raw table loading and prediction output
//!
//! CSV boundary of the pipeline: reads the three raw tables from a data
//! directory and writes the predictions file. A missing raw file is reported
//! together with every other missing file, not one at a time.

use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScorerError};

pub const BUREAU_FILE: &str = "bureau.csv";
pub const PREV_APP_FILE: &str = "previous_application.csv";

/// Which applicant table a run reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationKind {
    Train,
    Test,
}

impl ApplicationKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ApplicationKind::Train => "application_train.csv",
            ApplicationKind::Test => "application_test.csv",
        }
    }
}

/// The three raw tables of one run.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub application: DataFrame,
    pub bureau: DataFrame,
    pub previous: DataFrame,
}

/// Read a CSV file with a header row, inferring the schema from a generous
/// prefix so sparsely populated columns still type correctly.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Load the raw tables for one run, failing with a single report listing
/// every missing file before any of them is read.
pub fn load_raw_tables(data_dir: &Path, kind: ApplicationKind) -> Result<RawTables> {
    let paths: [PathBuf; 3] = [
        data_dir.join(kind.file_name()),
        data_dir.join(BUREAU_FILE),
        data_dir.join(PREV_APP_FILE),
    ];

    let missing: Vec<String> = paths
        .iter()
        .filter(|p| !p.exists())
        .map(|p| p.display().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ScorerError::MissingInputs(missing));
    }

    Ok(RawTables {
        application: read_csv(&paths[0])?,
        bureau: read_csv(&paths[1])?,
        previous: read_csv(&paths[2])?,
    })
}

/// Write a predictions frame as CSV, creating parent directories.
pub fn write_predictions(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(df)?;
    Ok(())
}
