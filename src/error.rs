//! Error types for Mindtrack

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while training or scoring
#[derive(Debug, Error)]
pub enum DetectError {
    /// A canonical feature name resolved to no column after derivation.
    /// Carries the comma-joined list of every missing column.
    #[error("Missing feature column(s): {0}")]
    MissingColumn(String),

    /// No persisted model bundle exists for the requested user.
    #[error("Model bundle not found for user {user_id} at {}", .path.display())]
    BundleNotFound { user_id: String, path: PathBuf },

    /// A new-entry record lacks a canonical feature (standalone adapter path).
    #[error("Missing feature in entry: {0}")]
    MissingFeature(String),

    /// The dataset loader was given a file with an unrecognized extension.
    #[error("Unsupported file type: {} (expected .csv or .json)", .0.display())]
    UnsupportedFileType(PathBuf),

    /// A matrix was fed to a scaler or model fitted on a different width.
    #[error("Feature matrix has {actual} column(s), expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Column lengths disagree when assembling a table.
    #[error("Column {name} has {actual} row(s), table has {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}
