//! Error types for the costwise pipeline

use thiserror::Error;

/// Result type alias for costwise operations
pub type Result<T> = std::result::Result<T, CostwiseError>;

/// Main error type for the pipeline.
///
/// A small closed set of kinds so callers can tell an I/O failure from a
/// schema mismatch from a missing artifact without string matching.
#[derive(Error, Debug)]
pub enum CostwiseError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Model not fitted")]
    NotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for CostwiseError {
    fn from(err: polars::error::PolarsError) -> Self {
        CostwiseError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CostwiseError {
    fn from(err: serde_json::Error) -> Self {
        CostwiseError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CostwiseError {
    fn from(err: ndarray::ShapeError) -> Self {
        CostwiseError::SchemaMismatch {
            expected: "valid array shape".to_string(),
            actual: err.to_string(),
        }
    }
}
