//! Error types for tswindow_metrics.

use thiserror::Error;

/// Result type alias using [`MetricError`].
pub type Result<T> = std::result::Result<T, MetricError>;

/// Errors that can occur while resolving or evaluating metrics.
#[derive(Error, Debug)]
pub enum MetricError {
    /// A requested metric name has no registered implementation.
    #[error("Unknown metric '{0}'")]
    UnknownMetric(String),

    /// Predictions and labels have different shapes.
    #[error("Shape mismatch: predictions {preds:?} vs labels {labels:?}")]
    ShapeMismatch {
        /// Shape of the predictions.
        preds: Vec<usize>,
        /// Shape of the labels.
        labels: Vec<usize>,
    },

    /// Predictions and labels are empty.
    #[error("Cannot evaluate metrics on empty input")]
    EmptyInput,
}
