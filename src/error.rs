use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for the prediction pipeline.
///
/// Fatal kinds (`MissingDataset`, `DatasetFormat`) halt the session.
/// `InvalidCategory` is recoverable by prompting for a valid code.
/// `Schema`, `NoFeatures` and `DataQuality` abort the training step only.
/// `ModelUnavailable` disables model-assisted prediction; filter-based
/// results remain available.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("dataset file missing: {0}")]
    MissingDataset(PathBuf),

    #[error("could not read dataset: {0}")]
    DatasetFormat(String),

    #[error("unknown category code '{category}', available: {}", .available.join(", "))]
    InvalidCategory {
        category: String,
        available: Vec<String>,
    },

    #[error("dataset schema error: {0}")]
    Schema(String),

    #[error("no usable feature columns found in dataset")]
    NoFeatures,

    #[error("data quality error: {0}")]
    DataQuality(String),

    #[error("model training failed: {0}")]
    Training(String),

    #[error("failed to persist model artifacts: {0}")]
    Persist(String),

    #[error("model artifacts unavailable: {0}")]
    ModelUnavailable(String),
}
