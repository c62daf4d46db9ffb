//! # tswindow_metrics
//!
//! Evaluation metrics for windowed time series predictions.
//!
//! This crate provides:
//! - [`Metric`] trait and the regression metrics ([`MSE`], [`MAE`], [`RMSE`],
//!   [`MAPE`], [`SMAPE`], [`R2`])
//! - A static [`registry`] resolving metric names to implementations
//! - [`MetricsCallback`] aggregating several metrics into a [`MetricReport`]
//!
//! ## Example
//!
//! ```rust
//! use ndarray::array;
//! use tswindow_metrics::MetricsCallback;
//!
//! let metrics = MetricsCallback::from_names(&["mse", "mae"]).unwrap();
//! let preds = array![1.0f32, 2.0, 3.0].into_dyn();
//! let labels = array![1.0f32, 2.0, 5.0].into_dyn();
//!
//! let report = metrics.evaluate(preds.view(), labels.view()).unwrap();
//! assert_eq!(report.names().collect::<Vec<_>>(), vec!["mse", "mae"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod callback;
mod error;
mod metrics;
pub mod registry;

pub use callback::{MetricCallback, MetricReport, MetricsCallback};
pub use error::{MetricError, Result};
pub use metrics::{Metric, MAE, MAPE, MSE, R2, RMSE, SMAPE};
pub use registry::{available_metrics, resolve};
