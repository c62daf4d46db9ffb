//! Record readers.
//!
//! A [`RecordReader`] turns a data file into one [`Series`]. The default
//! [`NpzRecordReader`] reads NumPy archives; [`InMemoryRecords`] serves arrays
//! the caller already holds.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::{Array, Array1, Array2, Axis, Dimension, Ix1, Ix2, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpyExt, ReadNpzError};

use crate::error::{DataError, Result};
use crate::series::Series;

/// Reads a full record file into a [`Series`].
pub trait RecordReader: Send + Sync {
    /// Read all records at `path`.
    fn read_records(&self, path: &Path) -> Result<Series>;
}

/// Reader for NumPy `.npz` archives and single `.npy` arrays.
///
/// An archive must hold a feature array under `features_key`. The target array
/// under `targets_key` is optional; without it the series is autoregressive and
/// the features double as targets. Arrays may be 1-D (one column) or 2-D
/// `[n_records, n_dims]`, stored as `f32` or `f64`.
///
/// A `.npy` file is read as the feature array of an autoregressive series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpzRecordReader {
    features_key: String,
    targets_key: String,
}

impl Default for NpzRecordReader {
    fn default() -> Self {
        Self {
            features_key: "features".to_string(),
            targets_key: "targets".to_string(),
        }
    }
}

impl NpzRecordReader {
    /// Create a reader with the default `features` / `targets` keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the archive key of the feature array.
    #[must_use]
    pub fn with_features_key(mut self, key: impl Into<String>) -> Self {
        self.features_key = key.into();
        self
    }

    /// Set the archive key of the target array.
    #[must_use]
    pub fn with_targets_key(mut self, key: impl Into<String>) -> Self {
        self.targets_key = key.into();
        self
    }
}

impl RecordReader for NpzRecordReader {
    fn read_records(&self, path: &Path) -> Result<Series> {
        let is_npy = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("npy"));
        if is_npy {
            return Ok(Series::autoregressive(read_npy(path)?));
        }

        let (features, targets) = read_npz(path, &self.features_key, &self.targets_key)?;
        match targets {
            Some(targets) => Series::new(features, targets),
            None => {
                tracing::debug!(
                    "No '{}' array in {}, using features as targets",
                    self.targets_key,
                    path.display()
                );
                Ok(Series::autoregressive(features))
            }
        }
    }
}

/// Serves one in-memory series regardless of the path.
#[derive(Debug, Clone)]
pub struct InMemoryRecords {
    series: Series,
}

impl InMemoryRecords {
    /// Wrap a series.
    #[must_use]
    pub fn new(series: Series) -> Self {
        Self { series }
    }
}

impl RecordReader for InMemoryRecords {
    fn read_records(&self, _path: &Path) -> Result<Series> {
        Ok(self.series.clone())
    }
}

/// Read a 1-D or 2-D array from a `.npy` file as `[n_records, n_dims]`.
///
/// `f64` data is converted to `f32`.
pub fn read_npy<P: AsRef<Path>>(path: P) -> Result<Array2<f32>> {
    let path = path.as_ref();

    if let Ok(arr) = Array2::<f32>::read_npy(BufReader::new(File::open(path)?)) {
        return Ok(arr);
    }
    if let Ok(arr) = Array2::<f64>::read_npy(BufReader::new(File::open(path)?)) {
        return Ok(arr.mapv(|x| x as f32));
    }
    if let Ok(arr) = Array1::<f32>::read_npy(BufReader::new(File::open(path)?)) {
        return Ok(arr.insert_axis(Axis(1)));
    }
    Array1::<f64>::read_npy(BufReader::new(File::open(path)?))
        .map(|arr| arr.mapv(|x| x as f32).insert_axis(Axis(1)))
        .map_err(|e| {
            DataError::FormatError(format!(
                "Failed to read {} as a 1-D or 2-D f32/f64 array: {}",
                path.display(),
                e
            ))
        })
}

/// Read a required feature array and an optional target array from a `.npz` archive.
///
/// The target array is `None` only when the archive has no entry under
/// `targets_key`. An entry that exists but is not a 1-D or 2-D float array is
/// an error.
pub fn read_npz<P: AsRef<Path>>(
    path: P,
    features_key: &str,
    targets_key: &str,
) -> Result<(Array2<f32>, Option<Array2<f32>>)> {
    let path = path.as_ref();
    let mut npz = NpzReader::new(File::open(path)?)
        .map_err(|e| DataError::FormatError(format!("Failed to read npz file: {}", e)))?;
    let names = npz
        .names()
        .map_err(|e| DataError::FormatError(format!("Failed to list npz entries: {}", e)))?;

    let features = match entry_name(&names, features_key) {
        Some(name) => read_matrix(&mut npz, &name)?,
        None => {
            return Err(DataError::FormatError(format!(
                "No array '{}' in {} (entries: {:?})",
                features_key,
                path.display(),
                names
            )));
        }
    };
    let targets = match entry_name(&names, targets_key) {
        Some(name) => Some(read_matrix(&mut npz, &name)?),
        None => None,
    };

    Ok((features, targets))
}

/// Archive entry for `key`, stored with or without the `.npy` suffix.
fn entry_name(names: &[String], key: &str) -> Option<String> {
    let with_ext = format!("{}.npy", key);
    names
        .iter()
        .find(|name| name.as_str() == with_ext || name.as_str() == key)
        .cloned()
}

/// Read entry `name` as `[n_records, n_dims]`, promoting a 1-D array to one column.
fn read_matrix(npz: &mut NpzReader<File>, name: &str) -> Result<Array2<f32>> {
    if let Ok(arr) = read_entry::<Ix2>(npz, name) {
        return Ok(arr);
    }
    read_entry::<Ix1>(npz, name)
        .map(|arr| arr.insert_axis(Axis(1)))
        .map_err(|e| {
            DataError::FormatError(format!(
                "Entry '{}' is not a 1-D or 2-D f32/f64 array: {}",
                name, e
            ))
        })
}

/// Read entry `name` as `f32`, accepting `f64` data.
fn read_entry<D: Dimension>(
    npz: &mut NpzReader<File>,
    name: &str,
) -> std::result::Result<Array<f32, D>, ReadNpzError> {
    match npz.by_name::<OwnedRepr<f32>, D>(name) {
        Ok(arr) => Ok(arr),
        Err(_) => npz
            .by_name::<OwnedRepr<f64>, D>(name)
            .map(|arr| arr.mapv(|x| x as f32)),
    }
}
