//! # tswindow_data
//!
//! Scaling, partition sources and sliding-window batching for time series.
//!
//! This crate provides:
//! - [`Series`] for aligned feature/target records
//! - [`Scaler`] and [`FittedScaler`] for per-dimension normalization
//! - [`DataSource`] for binding a lazy partition supplier to metrics and a scaler
//! - [`DataProvider`] for turning partition chunks into batches of overlapping windows
//! - [`DataLoader`] for assembling the train/valid/test sources from a record file
//! - Record readers for NPZ and NPY files
//!
//! ## Example
//!
//! ```rust,no_run
//! use tswindow_data::{DataLoader, DataLoaderConfig, DataProvider, ProviderConfig, WindowConfig};
//!
//! let loader = DataLoader::new(
//!     "traffic",
//!     "data/traffic.npz",
//!     &["mse", "mae"],
//!     tswindow_data::cache_dir(),
//!     DataLoaderConfig::default(),
//! )?;
//! let (train, _valid, _test) = loader.get_three_datasource()?;
//!
//! let window = WindowConfig::new(24, 7, 24, 1, 32);
//! let provider = DataProvider::new(train, ProviderConfig::new(window))?;
//! for batch in provider.iterate_batch_data(true) {
//!     let batch = batch?;
//!     // feed batch.features / batch.labels to a model
//! }
//! # Ok::<(), tswindow_data::DataError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod io;
mod loader;
mod provider;
mod scaler;
mod series;
mod source;
mod splits;
mod window;

pub use error::{DataError, Result};
pub use io::{read_npy, read_npz, InMemoryRecords, NpzRecordReader, RecordReader};
pub use loader::{DataLoader, DataLoaderConfig};
pub use provider::{Batch, BatchIter, DataProvider, ProviderConfig};
pub use scaler::{
    FittedScaler, Scaler, ScalerConfig, ScalerKind, ScalingParams, DEFAULT_MIN_SCALE,
};
pub use series::Series;
pub use source::{
    static_chunks, static_supplier, DataSource, DataSourceBuilder, PartitionIter,
    PartitionSupplier,
};
pub use splits::{time_split, time_split_indices, SplitConfig, SplitPolicy};
pub use window::WindowConfig;

/// Cache directory, relative to the home directory.
pub const CACHE_DIR: &str = ".cache/tswindow";

/// Get the default cache directory path.
#[must_use]
pub fn cache_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CACHE_DIR)
}
