//! Dataset handed to the classifier
//!
//! Couples a feature table with the explicit list of categorical columns.
//! Categorical cells are never handed to the model truly-missing: on
//! construction they are cast to strings and filled with the sentinel.

use polars::prelude::*;

use crate::error::Result;
use crate::features::policy::CATEGORICAL_MISSING;

/// Feature table plus categorical-column metadata.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    cat_columns: Vec<String>,
}

impl Dataset {
    /// Build a dataset from a feature table. Categorical names absent from
    /// the table are ignored; present ones are cast to String and their
    /// nulls replaced with the missing sentinel.
    pub fn new(df: &DataFrame, cat_features: &[&str]) -> Result<Self> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cat_columns: Vec<String> = cat_features
            .iter()
            .filter(|c| names.iter().any(|n| n == *c))
            .map(|c| c.to_string())
            .collect();

        let frame = if cat_columns.is_empty() {
            df.clone()
        } else {
            let fills: Vec<Expr> = cat_columns
                .iter()
                .map(|c| {
                    col(c.as_str())
                        .cast(DataType::String)
                        .fill_null(lit(CATEGORICAL_MISSING))
                })
                .collect();
            df.clone().lazy().with_columns(fills).collect()?
        };

        Ok(Self { frame, cat_columns })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn cat_columns(&self) -> &[String] {
        &self.cat_columns
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
