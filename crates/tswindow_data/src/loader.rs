//! Three-way data source assembly.
//!
//! [`DataLoader`] reads a record file, splits it chronologically, fits feature
//! and target scalers on the train partition and wraps each scaled partition
//! in a [`DataSource`]. It holds no windowing logic.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tswindow_core::Split;
use tswindow_metrics::{MetricCallback, MetricsCallback};

use crate::error::Result;
use crate::io::{NpzRecordReader, RecordReader};
use crate::scaler::{FittedScaler, Scaler, ScalerConfig};
use crate::series::Series;
use crate::source::{static_supplier, DataSource};
use crate::splits::{SplitConfig, SplitPolicy};

/// Configuration for a [`DataLoader`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLoaderConfig {
    /// Chronological split used unless a custom policy is set.
    pub split: SplitConfig,
    /// Scaler fit on the train features.
    pub feature_scaler: ScalerConfig,
    /// Scaler fit on the train targets and bound to every data source.
    pub target_scaler: ScalerConfig,
}

impl DataLoaderConfig {
    /// Set the split configuration.
    #[must_use]
    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    /// Set the feature scaler configuration.
    #[must_use]
    pub fn with_feature_scaler(mut self, config: ScalerConfig) -> Self {
        self.feature_scaler = config;
        self
    }

    /// Set the target scaler configuration.
    #[must_use]
    pub fn with_target_scaler(mut self, config: ScalerConfig) -> Self {
        self.target_scaler = config;
        self
    }
}

/// Builds the train, valid and test [`DataSource`]s for one data set.
///
/// # Example
///
/// ```rust
/// use ndarray::Array2;
/// use tswindow_data::{DataLoader, DataLoaderConfig, InMemoryRecords, Series};
///
/// let values = Array2::from_shape_fn((100, 1), |(i, _)| i as f32);
/// let loader = DataLoader::new("demo", "demo.npz", &["mse", "mae"], "/tmp/cache", DataLoaderConfig::default())
///     .unwrap()
///     .with_reader(InMemoryRecords::new(Series::autoregressive(values)));
///
/// let (train, valid, test) = loader.get_three_datasource().unwrap();
/// assert_eq!(train.name(), "demo_train");
/// assert_eq!(valid.name(), "demo_valid");
/// assert_eq!(test.name(), "demo_test");
/// ```
pub struct DataLoader {
    data_name: String,
    data_filename: PathBuf,
    cache_dir: PathBuf,
    metrics: Arc<MetricsCallback>,
    config: DataLoaderConfig,
    reader: Box<dyn RecordReader>,
    split_policy: Option<Box<dyn SplitPolicy>>,
}

impl DataLoader {
    /// Create a loader.
    ///
    /// Metric names are resolved here so an unknown name fails before any
    /// data is read.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Metric`](crate::DataError::Metric) if a metric name
    /// is not registered.
    pub fn new<S: AsRef<str>>(
        data_name: impl Into<String>,
        data_filename: impl Into<PathBuf>,
        metrics: &[S],
        cache_dir: impl Into<PathBuf>,
        config: DataLoaderConfig,
    ) -> Result<Self> {
        let metrics = MetricsCallback::from_names(metrics)?;
        Ok(Self {
            data_name: data_name.into(),
            data_filename: data_filename.into(),
            cache_dir: cache_dir.into(),
            metrics: Arc::new(metrics),
            config,
            reader: Box::new(NpzRecordReader::default()),
            split_policy: None,
        })
    }

    /// Replace the record reader.
    #[must_use]
    pub fn with_reader<R: RecordReader + 'static>(mut self, reader: R) -> Self {
        self.reader = Box::new(reader);
        self
    }

    /// Replace the chronological split with a custom policy.
    #[must_use]
    pub fn with_split_policy<P: SplitPolicy + 'static>(mut self, policy: P) -> Self {
        self.split_policy = Some(Box::new(policy));
        self
    }

    /// Get the data set name.
    #[must_use]
    pub fn data_name(&self) -> &str {
        &self.data_name
    }

    /// Get the record file path.
    #[must_use]
    pub fn data_filename(&self) -> &Path {
        &self.data_filename
    }

    /// Get the cache location handed to every data source.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get the resolved metrics.
    #[must_use]
    pub fn metrics(&self) -> &MetricsCallback {
        &self.metrics
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &DataLoaderConfig {
        &self.config
    }

    /// Load, split and scale the records into `(train, valid, test)` sources.
    ///
    /// Both scalers are fit on the train partition only. Every source carries
    /// the fitted target scaler, the shared metrics and the cache location.
    ///
    /// # Errors
    ///
    /// Propagates reader, split and scaler errors. An empty train partition
    /// fails with [`DataError::NotEnoughData`](crate::DataError::NotEnoughData).
    pub fn get_three_datasource(&self) -> Result<(DataSource, DataSource, DataSource)> {
        let records = self.reader.read_records(&self.data_filename)?;
        tracing::info!(
            "Loaded {} records ({} features, {} targets) from {}",
            records.len(),
            records.n_features(),
            records.n_targets(),
            self.data_filename.display()
        );

        let (train, valid, test) = match &self.split_policy {
            Some(policy) => policy.split(&records)?,
            None => self.config.split.split(&records)?,
        };
        tracing::info!(
            "Split '{}': train={}, valid={}, test={}",
            self.data_name,
            train.len(),
            valid.len(),
            test.len()
        );

        let (train_feats, train_tgts) = train.into_parts();

        let feature_scaler = Scaler::new(self.config.feature_scaler.clone());
        let (feature_scaler, train_feats) = feature_scaler.fit_scaling(&train_feats)?;

        let target_scaler = Scaler::new(self.config.target_scaler.clone());
        let (target_scaler, train_tgts) = target_scaler.fit_scaling(&train_tgts)?;
        tracing::info!(
            "Fitted scalers on {} train records: {} feature dims, {} target dims",
            train_feats.nrows(),
            feature_scaler.n_dims(),
            target_scaler.n_dims()
        );

        let target_scaler = Arc::new(target_scaler);
        let train = Series::new(train_feats, train_tgts)?;
        let valid = scale_partition(&valid, &feature_scaler, &target_scaler)?;
        let test = scale_partition(&test, &feature_scaler, &target_scaler)?;

        Ok((
            self.bind(Split::Train, train, &target_scaler)?,
            self.bind(Split::Valid, valid, &target_scaler)?,
            self.bind(Split::Test, test, &target_scaler)?,
        ))
    }

    fn bind(&self, split: Split, series: Series, scaler: &Arc<FittedScaler>) -> Result<DataSource> {
        let metrics: Arc<dyn MetricCallback> = self.metrics.clone();
        DataSource::builder(split.partition_name(&self.data_name))
            .split(split)
            .shared_metrics(metrics)
            .supplier(static_supplier(series))
            .scaler(Arc::clone(scaler))
            .cache_dir(self.cache_dir.clone())
            .build()
    }
}

impl fmt::Debug for DataLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataLoader")
            .field("data_name", &self.data_name)
            .field("data_filename", &self.data_filename)
            .field("cache_dir", &self.cache_dir)
            .field("metrics", &self.metrics)
            .field("config", &self.config)
            .field("custom_split", &self.split_policy.is_some())
            .finish()
    }
}

fn scale_partition(
    series: &Series,
    features: &FittedScaler,
    targets: &FittedScaler,
) -> Result<Series> {
    Series::new(
        features.scaling(series.features())?,
        targets.scaling(series.targets())?,
    )
}
