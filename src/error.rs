//! Error types for the credit scorer

use thiserror::Error;

/// Result type alias for scorer operations
pub type Result<T> = std::result::Result<T, ScorerError>;

/// Main error type for the credit scorer
#[derive(Error, Debug)]
pub enum ScorerError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Missing input files: {}", .0.join(", "))]
    MissingInputs(Vec<String>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for ScorerError {
    fn from(err: polars::error::PolarsError) -> Self {
        ScorerError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ScorerError {
    fn from(err: serde_json::Error) -> Self {
        ScorerError::SerializationError(err.to_string())
    }
}
