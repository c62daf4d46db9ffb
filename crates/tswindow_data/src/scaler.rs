//! Per-dimension affine scaling fit on one series and applied to others.
//!
//! Fitting and applying are separate types: a [`Scaler`] only carries its
//! configuration, and [`Scaler::fit_scaling`] consumes it to produce a
//! [`FittedScaler`]. Applying parameters that were never fit is therefore not
//! expressible.
//!
//! # Example
//!
//! ```rust
//! use ndarray::array;
//! use tswindow_data::Scaler;
//!
//! let train = array![[1.0f32, 10.0], [3.0, 10.0]];
//! let (scaler, scaled) = Scaler::standard().fit_scaling(&train).unwrap();
//! assert_eq!(scaled[[0, 0]], -1.0);
//!
//! let valid = array![[2.0f32, 10.0]];
//! let scaled_valid = scaler.scaling(&valid).unwrap();
//! assert_eq!(scaled_valid[[0, 0]], 0.0);
//! ```

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Scale floor applied when a dimension's spread is zero or not finite.
pub const DEFAULT_MIN_SCALE: f32 = 1e-6;

/// How location and scale are derived from the fit series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    /// Subtract the mean, divide by the population standard deviation.
    #[default]
    Standard,
    /// Subtract the minimum, divide by `max - min`, mapping the fit range to `[0, 1]`.
    MinMax,
}

/// Configuration for a [`Scaler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalerConfig {
    /// Location/scale estimator.
    pub kind: ScalerKind,
    /// Smallest scale used for any dimension. Spreads below this are replaced by it.
    pub min_scale: f32,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            kind: ScalerKind::Standard,
            min_scale: DEFAULT_MIN_SCALE,
        }
    }
}

impl ScalerConfig {
    /// Create a configuration for the given estimator.
    #[must_use]
    pub fn new(kind: ScalerKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Set the scale floor.
    #[must_use]
    pub fn with_min_scale(mut self, min_scale: f32) -> Self {
        self.min_scale = min_scale;
        self
    }
}

/// Fitted per-dimension parameters: `scaled = (x - location) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingParams {
    /// Per-dimension location.
    pub location: Array1<f32>,
    /// Per-dimension scale, always positive.
    pub scale: Array1<f32>,
}

impl ScalingParams {
    /// Number of dimensions covered.
    #[must_use]
    pub fn n_dims(&self) -> usize {
        self.location.len()
    }
}

/// An unfit scaler.
///
/// Call [`fit_scaling`](Self::fit_scaling) to obtain a [`FittedScaler`].
#[derive(Debug, Clone, Default)]
pub struct Scaler {
    config: ScalerConfig,
}

impl Scaler {
    /// Create an unfit scaler.
    #[must_use]
    pub fn new(config: ScalerConfig) -> Self {
        Self { config }
    }

    /// Create an unfit standard (z-score) scaler.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(ScalerConfig::new(ScalerKind::Standard))
    }

    /// Create an unfit min-max scaler.
    #[must_use]
    pub fn min_max() -> Self {
        Self::new(ScalerConfig::new(ScalerKind::MinMax))
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ScalerConfig {
        &self.config
    }

    /// Fit parameters on `series` without transforming it.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotEnoughData`] if `series` has no rows.
    pub fn fit(self, series: &Array2<f32>) -> Result<FittedScaler> {
        let params = estimate(&self.config, series)?;
        tracing::debug!(
            "Fitted {:?} scaler on {} records x {} dims",
            self.config.kind,
            series.nrows(),
            params.n_dims()
        );
        Ok(FittedScaler {
            config: self.config,
            params,
        })
    }

    /// Fit parameters on `series` and return them together with the scaled series.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotEnoughData`] if `series` has no rows.
    pub fn fit_scaling(self, series: &Array2<f32>) -> Result<(FittedScaler, Array2<f32>)> {
        let fitted = self.fit(series)?;
        let scaled = fitted.apply(series);
        Ok((fitted, scaled))
    }
}

/// A scaler holding parameters derived from exactly one fit series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    config: ScalerConfig,
    params: ScalingParams,
}

impl FittedScaler {
    /// Rebuild a fitted scaler from previously computed parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::DimensionMismatch`] if location and scale lengths differ,
    /// and [`DataError::FormatError`] if any scale is not a positive finite number.
    pub fn from_params(config: ScalerConfig, params: ScalingParams) -> Result<Self> {
        if params.location.len() != params.scale.len() {
            return Err(DataError::DimensionMismatch {
                expected: params.location.len(),
                got: params.scale.len(),
            });
        }
        if params.scale.iter().any(|&s| !(s.is_finite() && s > 0.0)) {
            return Err(DataError::FormatError(
                "scaling parameters must have positive finite scales".to_string(),
            ));
        }
        Ok(Self { config, params })
    }

    /// Get the configuration the scaler was fit with.
    #[must_use]
    pub fn config(&self) -> &ScalerConfig {
        &self.config
    }

    /// Get the fitted parameters.
    #[must_use]
    pub fn params(&self) -> &ScalingParams {
        &self.params
    }

    /// Number of dimensions the scaler was fit on.
    #[must_use]
    pub fn n_dims(&self) -> usize {
        self.params.n_dims()
    }

    /// Apply the fitted parameters to `series`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::DimensionMismatch`] if `series` has a different column count.
    pub fn scaling(&self, series: &Array2<f32>) -> Result<Array2<f32>> {
        self.check_dims(series)?;
        Ok(self.apply(series))
    }

    /// Map scaled values back to the original units.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::DimensionMismatch`] if `series` has a different column count.
    pub fn inverse_scaling(&self, series: &Array2<f32>) -> Result<Array2<f32>> {
        self.check_dims(series)?;
        let mut restored = series.to_owned();
        restored *= &self.params.scale;
        restored += &self.params.location;
        Ok(restored)
    }

    /// Replace the parameters with a fit on `series` and return it scaled.
    ///
    /// Every series scaled earlier keeps the old parameters; callers re-fitting
    /// mid-pipeline must rescale those themselves.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotEnoughData`] if `series` has no rows. The old
    /// parameters are kept in that case.
    pub fn refit(&mut self, series: &Array2<f32>) -> Result<Array2<f32>> {
        self.params = estimate(&self.config, series)?;
        Ok(self.apply(series))
    }

    fn check_dims(&self, series: &Array2<f32>) -> Result<()> {
        if series.ncols() != self.n_dims() {
            return Err(DataError::DimensionMismatch {
                expected: self.n_dims(),
                got: series.ncols(),
            });
        }
        Ok(())
    }

    fn apply(&self, series: &Array2<f32>) -> Array2<f32> {
        let mut scaled = series.to_owned();
        scaled -= &self.params.location;
        scaled /= &self.params.scale;
        scaled
    }
}

fn estimate(config: &ScalerConfig, series: &Array2<f32>) -> Result<ScalingParams> {
    if series.nrows() == 0 {
        return Err(DataError::NotEnoughData { needed: 1, got: 0 });
    }

    let (location, spread) = match config.kind {
        ScalerKind::Standard => {
            let mean = series
                .mean_axis(Axis(0))
                .ok_or(DataError::NotEnoughData { needed: 1, got: 0 })?;
            (mean, series.std_axis(Axis(0), 0.0))
        }
        ScalerKind::MinMax => {
            let min = series.fold_axis(Axis(0), f32::INFINITY, |acc, &x| acc.min(x));
            let max = series.fold_axis(Axis(0), f32::NEG_INFINITY, |acc, &x| acc.max(x));
            let range = &max - &min;
            (min, range)
        }
    };

    let min_scale = config.min_scale.max(f32::MIN_POSITIVE);
    let scale = spread.indexed_iter().map(|(dim, &s)| {
        if s.is_finite() && s >= min_scale {
            s
        } else {
            tracing::warn!(
                "Dimension {} has spread {}, using min_scale {}",
                dim,
                s,
                min_scale
            );
            min_scale
        }
    });
    let scale = Array1::from_iter(scale);

    Ok(ScalingParams { location, scale })
}
