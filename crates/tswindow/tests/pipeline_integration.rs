//! Integration tests for the load → split → scale → window pipeline.
//!
//! These tests run end to end on synthetic series written to a temporary NPZ file.

use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::{s, Array2, Axis};
use ndarray_npy::NpzWriter;
use tswindow::data::PartitionIter;
use tswindow::prelude::*;

const N_RECORDS: usize = 500;

/// Create a daily-seasonal series with a noise channel.
///
/// Features are `[seasonal + noise, uniform noise]`, the target is the seasonal channel.
fn create_synthetic_series(n_records: usize) -> (Array2<f32>, Array2<f32>) {
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let mut features = Array2::<f32>::zeros((n_records, 2));
    let mut targets = Array2::<f32>::zeros((n_records, 1));
    for t in 0..n_records {
        let seasonal = (2.0 * std::f32::consts::PI * t as f32 / 24.0).sin() * 5.0 + 10.0;
        let value = seasonal + rng.gen::<f32>() * 0.1;
        features[[t, 0]] = value;
        features[[t, 1]] = rng.gen::<f32>();
        targets[[t, 0]] = value;
    }

    (features, targets)
}

fn write_records(path: &Path, features: &Array2<f32>, targets: &Array2<f32>) {
    let mut npz = NpzWriter::new(File::create(path).expect("Failed to create npz"));
    npz.add_array("features", features).expect("Failed to write features");
    npz.add_array("targets", targets).expect("Failed to write targets");
    npz.finish().expect("Failed to finish npz");
}

fn window_config() -> WindowConfig {
    // span = 4 * 3 + 8 = 20, window = 22, offset = 37
    WindowConfig::new(8, 3, 4, 2, 16)
}

fn load_sources(dir: &Path) -> (DataSource, DataSource, DataSource) {
    let (features, targets) = create_synthetic_series(N_RECORDS);
    let path = dir.join("synthetic.npz");
    write_records(&path, &features, &targets);

    let loader = DataLoader::new(
        "synthetic",
        &path,
        &["mse", "mae", "r2"],
        dir.join("cache"),
        DataLoaderConfig::default(),
    )
    .expect("Failed to create loader");
    loader.get_three_datasource().expect("Failed to build data sources")
}

#[test]
fn test_npz_pipeline_batch_counts_and_shapes() {
    let dir = tempfile::tempdir().unwrap();
    let (train, valid, test) = load_sources(dir.path());

    let expected_records = [350, 75, 75];
    for (source, n_records) in [train, valid, test].into_iter().zip(expected_records) {
        let provider = DataProvider::new(source, ProviderConfig::new(window_config())).unwrap();
        let batches: Vec<Batch> = provider
            .iterate_batch_data(true)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(batches.len(), provider.n_batches(n_records, true));
        for batch in &batches {
            assert_eq!(batch.features_shape(), BatchShape::new(16, 11, 2));
            assert_eq!(batch.labels_shape(), Some(BatchShape::new(16, 2, 1)));
        }
    }
}

#[test]
fn test_labels_restore_original_targets() {
    let dir = tempfile::tempdir().unwrap();
    let (train, _, _) = load_sources(dir.path());
    let (_, targets) = create_synthetic_series(N_RECORDS);

    let provider = DataProvider::new(train, ProviderConfig::new(window_config())).unwrap();
    let first = provider.iterate_batch_data(true).next().unwrap().unwrap();
    let labels = first.labels.unwrap();

    // first batch covers records [0, 37); window k labels records k + 20 and k + 21
    for k in 0..16 {
        let scaled = labels.index_axis(Axis(0), k).to_owned();
        let restored = provider.data_source().inverse_scaling(&scaled).unwrap();
        for h in 0..2 {
            let expected = targets[[k + 20 + h, 0]];
            assert!(
                (restored[[h, 0]] - expected).abs() < 1e-3,
                "window {} step {}: {} vs {}",
                k,
                h,
                restored[[h, 0]],
                expected
            );
        }
    }
}

#[test]
fn test_strided_input_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (train, _, _) = load_sources(dir.path());

    let subsampled = DataProvider::new(train, ProviderConfig::new(window_config())).unwrap();
    let first = subsampled.iterate_batch_data(false).next().unwrap().unwrap();

    let chunk = subsampled.data_source().load_partition_data().next().unwrap().unwrap();
    let expected_rows = [0, 4, 8, 12, 13, 14, 15, 16, 17, 18, 19];
    for k in [0, 7, 15] {
        for (step, &row) in expected_rows.iter().enumerate() {
            assert_eq!(
                first.features.slice(s![k, step, ..]),
                chunk.features().slice(s![k + row, ..])
            );
        }
    }
}

#[test]
fn test_evaluate_in_original_units() {
    let dir = tempfile::tempdir().unwrap();
    let (_, valid, _) = load_sources(dir.path());

    let chunk = valid.load_partition_data().next().unwrap().unwrap();
    let labels = valid.inverse_scaling(chunk.targets()).unwrap();
    let preds = &labels + 0.5;

    let report = valid
        .evaluate(preds.view().into_dyn(), labels.view().into_dyn())
        .unwrap();
    assert_eq!(report.names().collect::<Vec<_>>(), vec!["mse", "mae", "r2"]);
    assert!((report.get("mse").unwrap() - 0.25).abs() < 1e-4);
    assert!((report.get("mae").unwrap() - 0.5).abs() < 1e-4);
    assert!(report.get("r2").unwrap() < 1.0);
}

#[test]
fn test_streaming_supplier_called_once_per_epoch() {
    let (features, targets) = create_synthetic_series(N_RECORDS);
    let series = Series::new(features, targets).unwrap();
    let chunks: Vec<Arc<Series>> = (0..5)
        .map(|i| Arc::new(series.slice(i * 100..(i + 1) * 100).unwrap()))
        .collect();

    let calls = Arc::new(AtomicUsize::new(0));
    let supplier = {
        let calls = Arc::clone(&calls);
        move || -> PartitionIter {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::new(chunks.clone().into_iter().map(Ok::<_, DataError>))
        }
    };
    let source = DataSource::builder("stream")
        .split(Split::Train)
        .supplier(supplier)
        .build()
        .unwrap();
    let provider = DataProvider::new(source, ProviderConfig::new(window_config())).unwrap();

    let first: Vec<Batch> = provider.iterate_batch_data(true).collect::<Result<_, _>>().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // each 100-record chunk: ceil((100 - 37) / 16) = 4
    assert_eq!(first.len(), 5 * 4);

    let second: Vec<Batch> = provider.iterate_batch_data(true).collect::<Result<_, _>>().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(first, second);
}

#[test]
fn test_partition_shorter_than_offset() {
    let (features, targets) = create_synthetic_series(37);
    let source = DataSource::builder("short")
        .supplier(static_supplier(Series::new(features, targets).unwrap()))
        .build()
        .unwrap();
    let provider = DataProvider::new(source, ProviderConfig::new(window_config())).unwrap();

    assert_eq!(provider.iterate_batch_data(true).count(), 0);
    // without labels the offset drops to 35
    assert_eq!(provider.iterate_batch_data(false).count(), 1);
}
