//! Window arithmetic for strided lookback batching.
//!
//! A window covers `stride * n_strided + lookback` input steps, followed by
//! `horizon` label steps when labels are requested:
//!
//! ```text
//! |x . . x . . x . . |x x x x| y y |
//!  n_strided samples   lookback horizon
//!  every `stride` steps
//! ```
//!
//! A batch is `batch_size` such windows, each shifted by one step, so it spans
//! `offset = window_size + batch_size - 1` consecutive records.

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Sliding window and batch geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Most recent contiguous steps in each input (`T`).
    pub lookback: usize,
    /// Strided samples taken before the lookback block (`n`).
    pub n_strided: usize,
    /// Spacing between strided samples (`T_skip`).
    pub stride: usize,
    /// Steps after the input used as the label.
    pub horizon: usize,
    /// Windows per batch.
    pub batch_size: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            lookback: 24,
            n_strided: 0,
            stride: 1,
            horizon: 1,
            batch_size: 32,
        }
    }
}

impl WindowConfig {
    /// Create a new window configuration.
    #[must_use]
    pub fn new(
        lookback: usize,
        n_strided: usize,
        stride: usize,
        horizon: usize,
        batch_size: usize,
    ) -> Self {
        Self {
            lookback,
            n_strided,
            stride,
            horizon,
            batch_size,
        }
    }

    /// Set the lookback length.
    #[must_use]
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    /// Set the number of strided samples and their spacing.
    #[must_use]
    pub fn with_strided(mut self, n_strided: usize, stride: usize) -> Self {
        self.n_strided = n_strided;
        self.stride = stride;
        self
    }

    /// Set the forecast horizon.
    #[must_use]
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Check that the configuration can produce batches.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidWindowConfig`] if `lookback`, `stride` or
    /// `batch_size` is zero, or if the labelled batch span overflows `usize`.
    pub fn validate(&self) -> Result<()> {
        if self.lookback == 0 {
            return Err(DataError::InvalidWindowConfig(
                "lookback must be > 0".to_string(),
            ));
        }
        if self.stride == 0 {
            return Err(DataError::InvalidWindowConfig(
                "stride must be >= 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(DataError::InvalidWindowConfig(
                "batch_size must be > 0".to_string(),
            ));
        }

        self.stride
            .checked_mul(self.n_strided)
            .and_then(|span| span.checked_add(self.lookback))
            .and_then(|span| span.checked_add(self.horizon))
            .and_then(|span| span.checked_add(self.batch_size - 1))
            .ok_or_else(|| {
                DataError::InvalidWindowConfig(format!(
                    "window span overflows: stride={} n_strided={} lookback={} horizon={} batch_size={}",
                    self.stride, self.n_strided, self.lookback, self.horizon, self.batch_size
                ))
            })?;
        Ok(())
    }

    /// Steps covered by the input part of a window: `stride * n_strided + lookback`.
    #[must_use]
    pub fn input_span(&self) -> usize {
        self.stride * self.n_strided + self.lookback
    }

    /// Window length, including the horizon when labels are requested.
    #[must_use]
    pub fn window_size(&self, provide_label: bool) -> usize {
        if provide_label {
            self.input_span() + self.horizon
        } else {
            self.input_span()
        }
    }

    /// Consecutive records spanned by one batch of overlapping windows.
    #[must_use]
    pub fn offset(&self, provide_label: bool) -> usize {
        self.window_size(provide_label) + self.batch_size - 1
    }

    /// Window-relative rows kept as model input.
    ///
    /// `n_strided` samples spaced `stride` apart, then the `lookback` most recent
    /// input steps. With `stride == 1` this is every input row.
    #[must_use]
    pub fn input_indices(&self) -> Vec<usize> {
        let strided_end = self.stride * self.n_strided;
        (0..self.n_strided)
            .map(|j| j * self.stride)
            .chain(strided_end..strided_end + self.lookback)
            .collect()
    }

    /// Number of batches a chunk of `n_items` records yields.
    ///
    /// Zero when the chunk is not longer than [`offset`](Self::offset),
    /// otherwise `ceil((n_items - offset) / batch_size)`.
    #[must_use]
    pub fn n_batches(&self, n_items: usize, provide_label: bool) -> usize {
        let offset = self.offset(provide_label);
        if n_items <= offset {
            0
        } else {
            (n_items - offset + self.batch_size - 1) / self.batch_size
        }
    }
}
