//! # tswindow
//!
//! Time series windowing and batching for forecasting models.
//!
//! tswindow turns a record file into model-ready batches:
//!
//! - **Scaling**: per-dimension standard or min-max scalers fit on the train partition
//! - **Partitions**: chronological train/valid/test split, each wrapped in a data source
//!   that carries its metrics, target scaler and cache location
//! - **Windowing**: lazy batches of overlapping windows with strided long-range samples
//! - **Metrics**: named regression metrics aggregated into an ordered report
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tswindow::prelude::*;
//!
//! let loader = DataLoader::new(
//!     "electricity",
//!     "data/electricity.npz",
//!     &["mse", "mae"],
//!     tswindow::data::cache_dir(),
//!     DataLoaderConfig::default(),
//! )?;
//! let (train, valid, _test) = loader.get_three_datasource()?;
//!
//! // 24-step lookback plus 7 daily samples, predicting one step ahead
//! let config = ProviderConfig::new(WindowConfig::new(24, 7, 24, 1, 32));
//! let train = DataProvider::new(train, config.clone())?;
//! let valid = DataProvider::new(valid, config)?;
//!
//! for batch in train.iterate_batch_data(true) {
//!     let (features, labels) = batch?.into_parts();
//!     // train step
//! }
//! # Ok::<(), DataError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all crates
pub use tswindow_core as core;
pub use tswindow_data as data;
pub use tswindow_metrics as metrics;

/// Prelude module for convenient imports.
///
/// ```rust
/// use tswindow::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tswindow_core::{BatchShape, Split};

    // Metrics
    pub use tswindow_metrics::{Metric, MetricCallback, MetricReport, MetricsCallback};

    // Data
    pub use tswindow_data::{
        static_supplier, time_split, Batch, DataError, DataLoader, DataLoaderConfig,
        DataProvider, DataSource, FittedScaler, ProviderConfig, Scaler, ScalerConfig,
        ScalerKind, Series, SplitConfig, WindowConfig,
    };
}
