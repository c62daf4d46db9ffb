//! Chronological train/valid/test splitting.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::series::Series;

/// Configuration for a chronological split.
///
/// Records are assigned in order: the first `train_ratio` share to train, then
/// `gap` skipped records, the next `valid_ratio` share to valid, another `gap`,
/// and the remainder to test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Share of records for training.
    pub train_ratio: f32,
    /// Share of records for validation.
    pub valid_ratio: f32,
    /// Records dropped between consecutive partitions.
    pub gap: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.7,
            valid_ratio: 0.15,
            gap: 0,
        }
    }
}

impl SplitConfig {
    /// Create a new split configuration.
    #[must_use]
    pub fn new(train_ratio: f32, valid_ratio: f32) -> Self {
        Self {
            train_ratio,
            valid_ratio,
            gap: 0,
        }
    }

    /// Set the gap between partitions.
    #[must_use]
    pub fn with_gap(mut self, gap: usize) -> Self {
        self.gap = gap;
        self
    }
}

/// Splits one series into train, valid and test partitions.
pub trait SplitPolicy {
    /// Produce `(train, valid, test)`.
    fn split(&self, series: &Series) -> Result<(Series, Series, Series)>;
}

impl SplitPolicy for SplitConfig {
    fn split(&self, series: &Series) -> Result<(Series, Series, Series)> {
        time_split(series, self)
    }
}

impl<F> SplitPolicy for F
where
    F: Fn(&Series) -> Result<(Series, Series, Series)>,
{
    fn split(&self, series: &Series) -> Result<(Series, Series, Series)> {
        self(series)
    }
}

/// Record ranges for a chronological split of `n` records.
///
/// Train always gets at least one record and test at least one; valid gets at
/// least one when `valid_ratio > 0`.
///
/// # Errors
///
/// Returns [`DataError::SplitError`] if the ratios are out of range or `n` is
/// too small for the requested partitions and gaps.
pub fn time_split_indices(
    n: usize,
    config: &SplitConfig,
) -> Result<(Range<usize>, Range<usize>, Range<usize>)> {
    let total_ratio = config.train_ratio + config.valid_ratio;
    if config.train_ratio <= 0.0 || config.valid_ratio < 0.0 || total_ratio >= 1.0 {
        return Err(DataError::SplitError(format!(
            "train_ratio must be > 0, valid_ratio >= 0 and their sum < 1, got {} + {}",
            config.train_ratio, config.valid_ratio
        )));
    }

    let n_train = ((n as f32 * config.train_ratio).round() as usize).max(1);
    let n_valid = if config.valid_ratio > 0.0 {
        ((n as f32 * config.valid_ratio).round() as usize).max(1)
    } else {
        0
    };

    let gaps = if n_valid > 0 { 2 * config.gap } else { config.gap };
    let required = n_train + n_valid + gaps + 1;
    if required > n {
        return Err(DataError::SplitError(format!(
            "Not enough records: {} available, but need at least {} (train={}, valid={}, gap={}, test>=1)",
            n, required, n_train, n_valid, config.gap
        )));
    }

    let train_end = n_train;
    let (valid, test_start) = if n_valid > 0 {
        let valid_start = train_end + config.gap;
        let valid_end = valid_start + n_valid;
        (valid_start..valid_end, valid_end + config.gap)
    } else {
        (train_end..train_end, train_end + config.gap)
    };

    Ok((0..train_end, valid, test_start..n))
}

/// Split a series chronologically into `(train, valid, test)`.
///
/// # Errors
///
/// See [`time_split_indices`].
pub fn time_split(series: &Series, config: &SplitConfig) -> Result<(Series, Series, Series)> {
    let (train, valid, test) = time_split_indices(series.len(), config)?;
    tracing::debug!(
        "Time split of {} records: train {:?}, valid {:?}, test {:?}",
        series.len(),
        train,
        valid,
        test
    );
    Ok((series.slice(train)?, series.slice(valid)?, series.slice(test)?))
}
