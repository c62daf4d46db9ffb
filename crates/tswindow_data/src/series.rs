//! Paired feature/target series.

use std::ops::Range;

use ndarray::{s, Array2};

use crate::error::{DataError, Result};

/// An ordered sequence of records, each holding a feature and a target vector.
///
/// Stored as two row-aligned arrays:
/// - `features`: `(n_records, n_features)`
/// - `targets`: `(n_records, n_targets)`
///
/// Either side may have zero columns.
///
/// # Example
///
/// ```rust
/// use ndarray::Array2;
/// use tswindow_data::Series;
///
/// let series = Series::new(Array2::zeros((100, 3)), Array2::zeros((100, 1))).unwrap();
/// assert_eq!(series.len(), 100);
/// assert_eq!(series.n_features(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    features: Array2<f32>,
    targets: Array2<f32>,
}

impl Series {
    /// Create a series from row-aligned feature and target arrays.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::LengthMismatch`] if the row counts differ.
    pub fn new(features: Array2<f32>, targets: Array2<f32>) -> Result<Self> {
        if features.nrows() != targets.nrows() {
            return Err(DataError::LengthMismatch {
                features: features.nrows(),
                targets: targets.nrows(),
            });
        }
        Ok(Self { features, targets })
    }

    /// Create a series whose features are its targets.
    ///
    /// Useful for univariate autoregressive setups.
    #[must_use]
    pub fn autoregressive(values: Array2<f32>) -> Self {
        Self {
            features: values.clone(),
            targets: values,
        }
    }

    /// Create an empty series with the given column counts.
    #[must_use]
    pub fn empty(n_features: usize, n_targets: usize) -> Self {
        Self {
            features: Array2::zeros((0, n_features)),
            targets: Array2::zeros((0, n_targets)),
        }
    }

    /// Get the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.nrows()
    }

    /// Check if the series has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Get the number of target columns.
    #[must_use]
    pub fn n_targets(&self) -> usize {
        self.targets.ncols()
    }

    /// Get a reference to the features.
    #[must_use]
    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    /// Get a reference to the targets.
    #[must_use]
    pub fn targets(&self) -> &Array2<f32> {
        &self.targets
    }

    /// Split into `(features, targets)`.
    #[must_use]
    pub fn into_parts(self) -> (Array2<f32>, Array2<f32>) {
        (self.features, self.targets)
    }

    /// Copy out a contiguous range of records.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfBounds`] if the range ends past the series.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.end > self.len() || range.start > range.end {
            return Err(DataError::IndexOutOfBounds {
                index: range.end.max(range.start),
                length: self.len(),
            });
        }
        Ok(Self {
            features: self.features.slice(s![range.clone(), ..]).to_owned(),
            targets: self.targets.slice(s![range, ..]).to_owned(),
        })
    }
}
