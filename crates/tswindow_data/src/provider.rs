//! Sliding-window batch provider.
//!
//! [`DataProvider`] turns each partition chunk of a [`DataSource`] into
//! fixed-shape batches of overlapping windows.
//!
//! For a chunk of `n_items` records the provider starts at `idx = offset` and,
//! while `idx < n_items`, takes the `offset` records `[idx - offset, idx)`,
//! slides a `window_size` window across them one step at a time to get
//! `batch_size` windows, and advances `idx` by `batch_size` (clipped to
//! `n_items`). A chunk not longer than `offset` contributes no batches.
//!
//! # Example
//!
//! ```rust
//! use ndarray::Array2;
//! use tswindow_data::{static_supplier, DataProvider, DataSource, ProviderConfig, Series, WindowConfig};
//!
//! let series = Series::autoregressive(Array2::zeros((15, 1)));
//! let source = DataSource::builder("demo")
//!     .supplier(static_supplier(series))
//!     .build()
//!     .unwrap();
//!
//! let config = ProviderConfig::new(WindowConfig::new(3, 2, 2, 1, 4));
//! let provider = DataProvider::new(source, config).unwrap();
//!
//! let batches: Vec<_> = provider.iterate_batch_data(true).collect::<Result<_, _>>().unwrap();
//! assert_eq!(batches.len(), 1);
//! assert_eq!(batches[0].features.dim(), (4, 5, 1));
//! ```

use std::iter::FusedIterator;
use std::sync::Arc;

use ndarray::{Array3, ArrayView2};
use serde::{Deserialize, Serialize};
use tswindow_core::BatchShape;

use crate::error::Result;
use crate::series::Series;
use crate::source::{DataSource, PartitionIter};
use crate::window::WindowConfig;

/// Configuration for a [`DataProvider`].
///
/// With `subsample_input` (the default) each window's input has
/// `n_strided + lookback` steps. Set it to false to get the whole
/// `stride * n_strided + lookback` span instead: for `lookback = 3`,
/// `n_strided = 2`, `stride = 2`, `horizon = 1`, `batch_size = 4` and a
/// 15-record partition that gives one batch with `[4, 7, D]` input and
/// `[4, 1, D]` labels, where the default gives `[4, 5, D]` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Window and batch geometry.
    pub window: WindowConfig,
    /// Keep only the strided samples plus the lookback block as input.
    /// When false the whole input span is returned.
    pub subsample_input: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            subsample_input: true,
        }
    }
}

impl ProviderConfig {
    /// Create a provider configuration with input sub-sampling enabled.
    #[must_use]
    pub fn new(window: WindowConfig) -> Self {
        Self {
            window,
            subsample_input: true,
        }
    }

    /// Enable or disable input sub-sampling.
    #[must_use]
    pub fn with_subsample_input(mut self, subsample: bool) -> Self {
        self.subsample_input = subsample;
        self
    }
}

/// One batch of windows.
///
/// `features` has shape `(batch_size, input_steps, n_features)`; `labels`, when
/// requested, has shape `(batch_size, horizon, n_targets)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Model input drawn from the feature series.
    pub features: Array3<f32>,
    /// Labels drawn from the target series.
    pub labels: Option<Array3<f32>>,
}

impl Batch {
    /// Number of windows in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.dim().0
    }

    /// Check if the batch has no windows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape of the features.
    #[must_use]
    pub fn features_shape(&self) -> BatchShape {
        BatchShape::from(self.features.dim())
    }

    /// Shape of the labels, if any.
    #[must_use]
    pub fn labels_shape(&self) -> Option<BatchShape> {
        self.labels.as_ref().map(|labels| BatchShape::from(labels.dim()))
    }

    /// Split into `(features, labels)`.
    #[must_use]
    pub fn into_parts(self) -> (Array3<f32>, Option<Array3<f32>>) {
        (self.features, self.labels)
    }
}

/// Produces batches of overlapping windows from a [`DataSource`].
#[derive(Debug)]
pub struct DataProvider {
    source: DataSource,
    config: ProviderConfig,
    input_rows: Vec<usize>,
}

impl DataProvider {
    /// Create a provider.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidWindowConfig`](crate::DataError::InvalidWindowConfig)
    /// if the window configuration cannot produce batches.
    pub fn new(source: DataSource, config: ProviderConfig) -> Result<Self> {
        config.window.validate()?;
        let input_rows = if config.subsample_input {
            config.window.input_indices()
        } else {
            (0..config.window.input_span()).collect()
        };
        Ok(Self {
            source,
            config,
            input_rows,
        })
    }

    /// Get the bound data source.
    #[must_use]
    pub fn data_source(&self) -> &DataSource {
        &self.source
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Number of input steps per window after sub-sampling.
    #[must_use]
    pub fn input_steps(&self) -> usize {
        self.input_rows.len()
    }

    /// Number of batches a chunk of `n_items` records yields.
    #[must_use]
    pub fn n_batches(&self, n_items: usize, provide_label: bool) -> usize {
        self.config.window.n_batches(n_items, provide_label)
    }

    /// Iterate over one epoch of batches.
    ///
    /// Calls [`DataSource::load_partition_data`] exactly once and pulls chunks
    /// lazily; at most one chunk is held at a time. Each item is a [`Batch`]
    /// whose `labels` are present iff `provide_label`. A supplier error is
    /// yielded once and ends the iteration.
    #[must_use]
    pub fn iterate_batch_data(&self, provide_label: bool) -> BatchIter<'_> {
        let window = &self.config.window;
        BatchIter {
            chunks: self.source.load_partition_data(),
            window,
            input_rows: &self.input_rows,
            input_span: window.input_span(),
            horizon: window.horizon,
            batch_size: window.batch_size,
            offset: window.offset(provide_label),
            provide_label,
            current: None,
            idx: 0,
            n_chunks: 0,
            n_records: 0,
            n_expected: 0,
            done: false,
        }
    }
}

/// Lazy iterator over the batches of one epoch.
///
/// Created by [`DataProvider::iterate_batch_data`].
pub struct BatchIter<'a> {
    chunks: PartitionIter,
    window: &'a WindowConfig,
    input_rows: &'a [usize],
    input_span: usize,
    horizon: usize,
    batch_size: usize,
    offset: usize,
    provide_label: bool,
    current: Option<Arc<Series>>,
    idx: usize,
    n_chunks: usize,
    n_records: usize,
    n_expected: usize,
    done: bool,
}

impl BatchIter<'_> {
    /// Records in the chunks pulled so far.
    #[must_use]
    pub fn records_seen(&self) -> usize {
        self.n_records
    }

    /// Batches the chunks pulled so far yield, per
    /// [`WindowConfig::n_batches`]. Equals the number of batches produced once
    /// the iterator is exhausted.
    #[must_use]
    pub fn expected_batches(&self) -> usize {
        self.n_expected
    }

    /// Build the batch whose windows start at rows `start..start + batch_size`.
    fn assemble(&self, series: &Series, start: usize) -> Batch {
        let end = start + self.offset;
        let features = series.features().slice(ndarray::s![start..end, ..]);
        let features = self.windowed(features, self.input_rows.iter().copied());

        let labels = self.provide_label.then(|| {
            let targets = series.targets().slice(ndarray::s![start..end, ..]);
            self.windowed(targets, self.input_span..self.input_span + self.horizon)
        });

        Batch { features, labels }
    }

    /// Stack `batch_size` windows of `rows`, window `k` starting at slice row `k`.
    fn windowed<I>(&self, slice: ArrayView2<'_, f32>, rows: I) -> Array3<f32>
    where
        I: Iterator<Item = usize>,
    {
        let rows: Vec<usize> = rows.collect();
        Array3::from_shape_fn(
            (self.batch_size, rows.len(), slice.ncols()),
            |(k, step, dim)| slice[[k + rows[step], dim]],
        )
    }
}

impl Iterator for BatchIter<'_> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            if let Some(series) = self.current.as_ref() {
                let n_items = series.len();
                if self.idx < n_items {
                    let batch = self.assemble(series, self.idx - self.offset);
                    tracing::trace!(
                        "Batch at idx {} of chunk {}: features {}",
                        self.idx,
                        self.n_chunks,
                        batch.features_shape()
                    );
                    self.idx = (self.idx + self.batch_size).min(n_items);
                    return Some(Ok(batch));
                }
                self.current = None;
            }

            match self.chunks.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(series)) => {
                    self.n_chunks += 1;
                    let n_items = series.len();
                    let expected = self.window.n_batches(n_items, self.provide_label);
                    self.n_records += n_items;
                    self.n_expected += expected;
                    tracing::debug!(
                        "Partition chunk {}: {} records, offset {}, {} batch(es)",
                        self.n_chunks,
                        n_items,
                        self.offset,
                        expected
                    );
                    self.idx = self.offset;
                    self.current = Some(series);
                }
            }
        }
    }
}

impl FusedIterator for BatchIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::source::{static_chunks, static_supplier};
    use ndarray::Array2;

    /// Series where feature `[i, d]` is `i * 10 + d` and target `[i, 0]` is `-i`.
    fn create_test_series(n: usize, n_features: usize) -> Series {
        let features = Array2::from_shape_fn((n, n_features), |(i, d)| (i * 10 + d) as f32);
        let targets = Array2::from_shape_fn((n, 1), |(i, _)| -(i as f32));
        Series::new(features, targets).unwrap()
    }

    fn create_provider(series: Series, config: ProviderConfig) -> DataProvider {
        let source = DataSource::builder("test")
            .supplier(static_supplier(series))
            .build()
            .unwrap();
        DataProvider::new(source, config).unwrap()
    }

    fn collect(provider: &DataProvider, provide_label: bool) -> Vec<Batch> {
        provider
            .iterate_batch_data(provide_label)
            .collect::<Result<_>>()
            .unwrap()
    }

    #[test]
    fn test_scenario_single_batch() {
        let window = WindowConfig::new(3, 2, 2, 1, 4);
        let config = ProviderConfig::new(window).with_subsample_input(false);
        let provider = create_provider(create_test_series(15, 2), config);

        let batches = collect(&provider, true);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].features_shape(), BatchShape::new(4, 7, 2));
        assert_eq!(batches[0].labels_shape(), Some(BatchShape::new(4, 1, 1)));
    }

    #[test]
    fn test_scenario_window_contents() {
        // idx = 11, slice [0, 11), window k covers rows k..k+8
        let window = WindowConfig::new(3, 2, 2, 1, 4);
        let provider = create_provider(create_test_series(15, 1), ProviderConfig::new(window));

        let batches = collect(&provider, true);
        let batch = &batches[0];
        assert_eq!(batch.features.dim(), (4, 5, 1));

        for k in 0..4 {
            let rows: Vec<f32> = batch.features.slice(ndarray::s![k, .., 0]).to_vec();
            let expected: Vec<f32> = [0, 2, 4, 5, 6].iter().map(|&r| ((k + r) * 10) as f32).collect();
            assert_eq!(rows, expected);

            let labels = batch.labels.as_ref().unwrap();
            assert_eq!(labels[[k, 0, 0]], -((k + 7) as f32));
        }
    }

    #[test]
    fn test_without_labels() {
        let window = WindowConfig::new(3, 2, 2, 1, 4);
        let provider = create_provider(create_test_series(15, 1), ProviderConfig::new(window));

        // offset = 7 + 4 - 1 = 10; idx = 10, 14
        let batches = collect(&provider, false);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.labels.is_none()));
        assert_eq!(batches[1].features[[0, 0, 0]], 40.0);
    }

    #[test]
    fn test_short_chunk_yields_nothing() {
        let window = WindowConfig::new(3, 2, 2, 1, 4);
        for n in 0..=11 {
            let provider = create_provider(create_test_series(n, 1), ProviderConfig::new(window.clone()));
            assert_eq!(provider.iterate_batch_data(true).count(), 0, "n = {}", n);
        }
    }

    #[test]
    fn test_batch_count_matches_formula() {
        for batch_size in 1..5 {
            let window = WindowConfig::new(2, 1, 3, 2, batch_size);
            for n in 0..40 {
                let provider =
                    create_provider(create_test_series(n, 1), ProviderConfig::new(window.clone()));
                let count = provider.iterate_batch_data(true).count();
                assert_eq!(count, provider.n_batches(n, true));
            }
        }
    }

    #[test]
    fn test_clipped_final_batch_spans_offset() {
        // offset = 11; idx = 11, 15, 19 (19 < 20), then min(23, 20) = 20 ends.
        let window = WindowConfig::new(3, 2, 2, 1, 4);
        let config = ProviderConfig::new(window).with_subsample_input(false);
        let provider = create_provider(create_test_series(20, 1), config);

        let batches = collect(&provider, true);
        assert_eq!(batches.len(), 3);
        let last = &batches[2];
        // slice [8, 19): first window starts at row 8, last label row is 18
        assert_eq!(last.features[[0, 0, 0]], 80.0);
        assert_eq!(last.labels.as_ref().unwrap()[[3, 0, 0]], -18.0);
    }

    #[test]
    fn test_multiple_chunks() {
        let window = WindowConfig::new(2, 0, 1, 1, 2);
        let source = DataSource::builder("chunks")
            .supplier(static_chunks(vec![
                create_test_series(10, 1),
                create_test_series(3, 1),
                create_test_series(6, 1),
            ]))
            .build()
            .unwrap();
        let provider = DataProvider::new(source, ProviderConfig::new(window)).unwrap();

        // offset = 3 + 2 - 1 = 4: chunk of 10 -> idx 4, 6, 8 (3 batches); 3 -> 0; 6 -> idx 4 (1 batch)
        assert_eq!(provider.iterate_batch_data(true).count(), 4);
    }

    #[test]
    fn test_iterator_tracks_records_and_expected_batches() {
        let window = WindowConfig::new(2, 0, 1, 1, 2);
        let source = DataSource::builder("chunks")
            .supplier(static_chunks(vec![
                create_test_series(10, 1),
                create_test_series(3, 1),
                create_test_series(6, 1),
            ]))
            .build()
            .unwrap();
        let provider = DataProvider::new(source, ProviderConfig::new(window)).unwrap();

        let mut iter = provider.iterate_batch_data(true);
        let produced = iter.by_ref().count();
        assert_eq!(iter.records_seen(), 19);
        assert_eq!(iter.expected_batches(), 4);
        assert_eq!(produced, iter.expected_batches());
    }

    #[test]
    fn test_epochs_restart() {
        let window = WindowConfig::new(2, 0, 1, 1, 2);
        let provider = create_provider(create_test_series(10, 1), ProviderConfig::new(window));
        let first = collect(&provider, true);
        let second = collect(&provider, true);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_horizon_labels() {
        let window = WindowConfig::new(2, 0, 1, 0, 2);
        let provider = create_provider(create_test_series(6, 1), ProviderConfig::new(window));
        let batches = collect(&provider, true);
        assert_eq!(batches[0].labels_shape(), Some(BatchShape::new(2, 0, 1)));
    }

    #[test]
    fn test_invalid_config_is_eager() {
        let source = DataSource::builder("bad")
            .supplier(static_supplier(create_test_series(10, 1)))
            .build()
            .unwrap();
        let window = WindowConfig::new(3, 0, 1, 1, 0);
        assert!(matches!(
            DataProvider::new(source, ProviderConfig::new(window)),
            Err(DataError::InvalidWindowConfig(_))
        ));
    }

    #[test]
    fn test_supplier_error_ends_iteration() {
        let supplier = || -> PartitionIter {
            Box::new(
                vec![
                    Ok(Arc::new(create_test_series(6, 1))),
                    Err(DataError::FormatError("truncated chunk".to_string())),
                    Ok(Arc::new(create_test_series(6, 1))),
                ]
                .into_iter(),
            )
        };
        let source = DataSource::builder("stream").supplier(supplier).build().unwrap();
        let window = WindowConfig::new(2, 0, 1, 1, 2);
        let provider = DataProvider::new(source, ProviderConfig::new(window)).unwrap();

        let mut iter = provider.iterate_batch_data(true);
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(iter.next(), Some(Err(DataError::FormatError(_)))));
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_stride_one_subsample_is_identity() {
        let window = WindowConfig::new(3, 2, 1, 1, 2);
        let series = create_test_series(12, 2);
        let sub = create_provider(series.clone(), ProviderConfig::new(window.clone()));
        let full = create_provider(series, ProviderConfig::new(window).with_subsample_input(false));
        assert_eq!(collect(&sub, true), collect(&full, true));
    }
}
