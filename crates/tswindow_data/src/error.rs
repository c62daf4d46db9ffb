//! Error types for tswindow_data.

use thiserror::Error;

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur in data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Scaling parameters were requested before any fit.
    #[error("Scaler has not been fitted")]
    NotFitted,

    /// A fit or split was attempted on too few records.
    #[error("Not enough data: need at least {needed} records, got {got}")]
    NotEnoughData {
        /// Minimum number of records required.
        needed: usize,
        /// Number of records available.
        got: usize,
    },

    /// Window or batch configuration cannot produce a batch.
    #[error("Invalid window configuration: {0}")]
    InvalidWindowConfig(String),

    /// Feature and target series have different lengths.
    #[error("Length mismatch: {features} feature records vs {targets} target records")]
    LengthMismatch {
        /// Number of feature records.
        features: usize,
        /// Number of target records.
        targets: usize,
    },

    /// Series column count differs from the fitted dimensions.
    #[error("Dimension mismatch: expected {expected} columns, got {got}")]
    DimensionMismatch {
        /// Dimensions the scaler was fit on.
        expected: usize,
        /// Dimensions of the series passed in.
        got: usize,
    },

    /// Index out of bounds.
    #[error("Index {index} out of bounds for length {length}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The length of the collection.
        length: usize,
    },

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Split error.
    #[error("Split error: {0}")]
    SplitError(String),

    /// File format error.
    #[error("File format error: {0}")]
    FormatError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Metric resolution or evaluation error.
    #[error("Metric error: {0}")]
    Metric(#[from] tswindow_metrics::MetricError),
}
