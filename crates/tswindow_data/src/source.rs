//! Partition data sources.
//!
//! A [`DataSource`] binds a lazy supplier of partition chunks together with a
//! metrics callback, an optional fitted target scaler and a cache location.
//!
//! # Consumption contract
//!
//! [`DataSource::load_partition_data`] invokes the supplier and returns a fresh
//! lazy sequence of chunks. [`DataProvider`](crate::DataProvider) calls it
//! exactly once per full epoch and consumes one chunk at a time. Whether a
//! second call replays the same data depends on the supplier: the
//! [`static_supplier`] and [`static_chunks`] suppliers replay their data on every
//! call, streaming suppliers may not.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::{Array2, ArrayViewD};
use tswindow_core::Split;
use tswindow_metrics::{MetricCallback, MetricReport, MetricsCallback};

use crate::error::{DataError, Result};
use crate::scaler::FittedScaler;
use crate::series::Series;

/// A lazy, finite sequence of partition chunks.
pub type PartitionIter = Box<dyn Iterator<Item = Result<Arc<Series>>>>;

/// Produces a fresh [`PartitionIter`] on every call.
///
/// Implemented for any `Fn() -> PartitionIter` closure.
pub trait PartitionSupplier {
    /// Start a new pass over the partition.
    fn supply(&self) -> PartitionIter;
}

impl<F> PartitionSupplier for F
where
    F: Fn() -> PartitionIter,
{
    fn supply(&self) -> PartitionIter {
        self()
    }
}

/// Supplier yielding one in-memory series once per invocation.
pub fn static_supplier(series: Series) -> impl PartitionSupplier {
    let series = Arc::new(series);
    move || -> PartitionIter { Box::new(std::iter::once(Ok::<_, DataError>(Arc::clone(&series)))) }
}

/// Supplier yielding several in-memory chunks in order, once per invocation.
pub fn static_chunks(chunks: Vec<Series>) -> impl PartitionSupplier {
    let chunks: Arc<[Arc<Series>]> = chunks.into_iter().map(Arc::new).collect();
    move || -> PartitionIter {
        let chunks = Arc::clone(&chunks);
        Box::new((0..chunks.len()).map(move |i| Ok::<_, DataError>(Arc::clone(&chunks[i]))))
    }
}

/// A named partition: supplier, metrics, target scaler and cache location.
///
/// Instances are immutable once built. The raw series is not owned; it is
/// produced on demand by the supplier.
///
/// # Example
///
/// ```rust
/// use ndarray::Array2;
/// use tswindow_data::{static_supplier, DataSource, Series};
///
/// let series = Series::new(Array2::zeros((10, 2)), Array2::zeros((10, 1))).unwrap();
/// let source = DataSource::builder("demo_train")
///     .supplier(static_supplier(series))
///     .build()
///     .unwrap();
///
/// let chunks: Vec<_> = source.load_partition_data().collect();
/// assert_eq!(chunks.len(), 1);
/// ```
pub struct DataSource {
    name: String,
    split: Option<Split>,
    metrics: Arc<dyn MetricCallback>,
    supplier: Box<dyn PartitionSupplier>,
    scaler: Option<Arc<FittedScaler>>,
    cache_dir: Option<PathBuf>,
}

impl DataSource {
    /// Create a data source with every collaborator bound.
    pub fn new<M, P>(
        name: impl Into<String>,
        metrics: M,
        supplier: P,
        scaler: Arc<FittedScaler>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self
    where
        M: MetricCallback + 'static,
        P: PartitionSupplier + 'static,
    {
        Self {
            name: name.into(),
            split: None,
            metrics: Arc::new(metrics),
            supplier: Box::new(supplier),
            scaler: Some(scaler),
            cache_dir: Some(cache_dir.into()),
        }
    }

    /// Create a new data source builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> DataSourceBuilder {
        DataSourceBuilder::new(name)
    }

    /// Get the source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the partition role, if tagged.
    #[must_use]
    pub fn split(&self) -> Option<Split> {
        self.split
    }

    /// Get the cache location. Not read or written by this crate.
    #[must_use]
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Start a new pass over the partition.
    ///
    /// Each call invokes the bound supplier once. See the module docs for the
    /// restartability contract.
    #[must_use]
    pub fn load_partition_data(&self) -> PartitionIter {
        tracing::trace!("Loading partition data for '{}'", self.name);
        self.supplier.supply()
    }

    /// Evaluate predictions against labels with the bound metrics callback.
    ///
    /// No caching is performed.
    ///
    /// # Errors
    ///
    /// Propagates the callback's [`MetricError`](tswindow_metrics::MetricError).
    pub fn evaluate(
        &self,
        preds: ArrayViewD<'_, f32>,
        labels: ArrayViewD<'_, f32>,
    ) -> Result<MetricReport> {
        Ok(self.metrics.evaluate(preds, labels)?)
    }

    /// Get the bound target scaler.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFitted`] if the source was built without one.
    pub fn scaler(&self) -> Result<&FittedScaler> {
        self.scaler.as_deref().ok_or(DataError::NotFitted)
    }

    /// Map scaled targets or predictions back to original units.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFitted`] without a bound scaler and
    /// [`DataError::DimensionMismatch`] on a column count mismatch.
    pub fn inverse_scaling(&self, series: &Array2<f32>) -> Result<Array2<f32>> {
        self.scaler()?.inverse_scaling(series)
    }
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("name", &self.name)
            .field("split", &self.split)
            .field("scaler", &self.scaler.is_some())
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}

/// Builder for [`DataSource`].
pub struct DataSourceBuilder {
    name: String,
    split: Option<Split>,
    metrics: Option<Arc<dyn MetricCallback>>,
    supplier: Option<Box<dyn PartitionSupplier>>,
    scaler: Option<Arc<FittedScaler>>,
    cache_dir: Option<PathBuf>,
}

impl DataSourceBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            split: None,
            metrics: None,
            supplier: None,
            scaler: None,
            cache_dir: None,
        }
    }

    /// Tag the partition role.
    #[must_use]
    pub fn split(mut self, split: Split) -> Self {
        self.split = Some(split);
        self
    }

    /// Bind the metrics callback. Defaults to one with no metrics.
    #[must_use]
    pub fn metrics<M: MetricCallback + 'static>(mut self, metrics: M) -> Self {
        self.metrics = Some(Arc::new(metrics));
        self
    }

    /// Bind a shared metrics callback.
    #[must_use]
    pub fn shared_metrics(mut self, metrics: Arc<dyn MetricCallback>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Bind the partition supplier.
    #[must_use]
    pub fn supplier<P: PartitionSupplier + 'static>(mut self, supplier: P) -> Self {
        self.supplier = Some(Box::new(supplier));
        self
    }

    /// Bind the fitted target scaler.
    #[must_use]
    pub fn scaler(mut self, scaler: Arc<FittedScaler>) -> Self {
        self.scaler = Some(scaler);
        self
    }

    /// Set the cache location.
    #[must_use]
    pub fn cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    /// Build the data source.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidInput`] if no supplier was bound.
    pub fn build(self) -> Result<DataSource> {
        let supplier = self.supplier.ok_or_else(|| {
            DataError::InvalidInput(format!("data source '{}' has no supplier", self.name))
        })?;
        let metrics: Arc<dyn MetricCallback> = match self.metrics {
            Some(metrics) => metrics,
            None => Arc::new(MetricsCallback::default()),
        };

        Ok(DataSource {
            name: self.name,
            split: self.split,
            metrics,
            supplier,
            scaler: self.scaler,
            cache_dir: self.cache_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaler::Scaler;
    use ndarray::array;
    use std::cell::Cell;
    use std::rc::Rc;

    fn create_test_series(n: usize) -> Series {
        let values = Array2::from_shape_fn((n, 1), |(i, _)| i as f32);
        Series::autoregressive(values)
    }

    #[test]
    fn test_static_supplier_restartable() {
        let source = DataSource::builder("demo")
            .supplier(static_supplier(create_test_series(5)))
            .build()
            .unwrap();

        for _ in 0..2 {
            let chunks: Vec<_> = source.load_partition_data().collect::<Result<_>>().unwrap();
            assert_eq!(chunks.len(), 1);
            assert_eq!(chunks[0].len(), 5);
        }
    }

    #[test]
    fn test_static_chunks_order() {
        let source = DataSource::builder("demo")
            .supplier(static_chunks(vec![create_test_series(3), create_test_series(7)]))
            .build()
            .unwrap();
        let lens: Vec<usize> = source
            .load_partition_data()
            .map(|chunk| chunk.map(|c| c.len()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(lens, vec![3, 7]);
    }

    #[test]
    fn test_supplier_invoked_per_load() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let supplier = move || -> PartitionIter {
            counter.set(counter.get() + 1);
            Box::new(std::iter::empty())
        };
        let source = DataSource::builder("stream").supplier(supplier).build().unwrap();

        assert_eq!(calls.get(), 0);
        let _ = source.load_partition_data();
        let _ = source.load_partition_data();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_builder_requires_supplier() {
        assert!(DataSource::builder("nothing").build().is_err());
    }

    #[test]
    fn test_scaler_not_fitted() {
        let source = DataSource::builder("demo")
            .supplier(static_supplier(create_test_series(2)))
            .build()
            .unwrap();
        assert!(matches!(source.scaler(), Err(DataError::NotFitted)));
        assert!(matches!(
            source.inverse_scaling(&array![[1.0f32]]),
            Err(DataError::NotFitted)
        ));
    }

    #[test]
    fn test_inverse_scaling_with_scaler() {
        let (scaler, scaled) = Scaler::standard()
            .fit_scaling(&array![[0.0f32], [2.0]])
            .unwrap();
        let source = DataSource::new(
            "demo_train",
            MetricsCallback::default(),
            static_supplier(create_test_series(2)),
            Arc::new(scaler),
            "/tmp/cache",
        );
        let restored = source.inverse_scaling(&scaled).unwrap();
        assert_eq!(restored, array![[0.0f32], [2.0]]);
        assert_eq!(source.cache_dir(), Some(Path::new("/tmp/cache")));
    }

    #[test]
    fn test_evaluate_uses_callback() {
        let source = DataSource::builder("demo")
            .supplier(static_supplier(create_test_series(2)))
            .metrics(MetricsCallback::from_names(&["mae"]).unwrap())
            .build()
            .unwrap();
        let preds = array![1.0f32, 3.0].into_dyn();
        let labels = array![2.0f32, 2.0].into_dyn();
        let report = source.evaluate(preds.view(), labels.view()).unwrap();
        assert_eq!(report.get("mae"), Some(1.0));

        let wrong = array![1.0f32].into_dyn();
        assert!(matches!(
            source.evaluate(wrong.view(), labels.view()),
            Err(DataError::Metric(_))
        ));
    }
}
