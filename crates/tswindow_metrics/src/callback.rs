//! Aggregating metrics callback and its report type.

use std::sync::Arc;

use ndarray::ArrayViewD;
use serde::{Deserialize, Serialize};

use crate::error::{MetricError, Result};
use crate::metrics::Metric;
use crate::registry;

/// Metric values keyed by name, in the order the metrics were requested.
///
/// # Example
///
/// ```rust
/// use tswindow_metrics::MetricReport;
///
/// let mut report = MetricReport::new();
/// report.insert("mse", 0.25);
/// report.insert("mae", 0.5);
/// assert_eq!(report.get("mae"), Some(0.5));
/// assert_eq!(report.to_string(), "mse=0.2500 mae=0.5000");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    values: Vec<(String, f32)>,
}

impl MetricReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: f32) {
        let name = name.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.values.push((name, value)),
        }
    }

    /// Get a value by metric name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f32> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Iterate over metric names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    /// Number of recorded metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no metric was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Display for MetricReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={:.4}", name, value)?;
        }
        Ok(())
    }
}

/// A callback evaluating predictions against labels.
///
/// Implemented by [`MetricsCallback`] and by any matching closure, so a data
/// source can be bound to either.
pub trait MetricCallback: Send + Sync {
    /// Evaluate `preds` against `labels`.
    fn evaluate(&self, preds: ArrayViewD<'_, f32>, labels: ArrayViewD<'_, f32>)
        -> Result<MetricReport>;
}

impl<F> MetricCallback for F
where
    F: Fn(ArrayViewD<'_, f32>, ArrayViewD<'_, f32>) -> Result<MetricReport> + Send + Sync,
{
    fn evaluate(
        &self,
        preds: ArrayViewD<'_, f32>,
        labels: ArrayViewD<'_, f32>,
    ) -> Result<MetricReport> {
        self(preds, labels)
    }
}

#[derive(Clone)]
enum MetricSlot {
    Registered(&'static dyn Metric),
    Custom(Arc<dyn Metric>),
}

impl MetricSlot {
    fn metric(&self) -> &dyn Metric {
        match self {
            MetricSlot::Registered(metric) => *metric,
            MetricSlot::Custom(metric) => metric.as_ref(),
        }
    }
}

/// Evaluates an ordered list of metrics and aggregates them into a [`MetricReport`].
///
/// Names are resolved against the static [`registry`] when the callback is
/// built, so an unknown name fails before any training starts.
///
/// # Example
///
/// ```rust
/// use tswindow_metrics::{MetricError, MetricsCallback};
///
/// assert!(MetricsCallback::from_names(&["rmse", "r2"]).is_ok());
/// assert!(matches!(
///     MetricsCallback::from_names(&["rmse", "nope"]),
///     Err(MetricError::UnknownMetric(_))
/// ));
/// ```
#[derive(Clone, Default)]
pub struct MetricsCallback {
    metrics: Vec<MetricSlot>,
}

impl MetricsCallback {
    /// Build a callback from metric names.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::UnknownMetric`] for the first name that is not registered.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let metrics = names
            .iter()
            .map(|name| registry::resolve(name.as_ref()).map(MetricSlot::Registered))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!("Resolved {} metric(s)", metrics.len());
        Ok(Self { metrics })
    }

    /// Append a metric that is not part of the registry.
    #[must_use]
    pub fn with_metric<M: Metric + 'static>(mut self, metric: M) -> Self {
        self.metrics.push(MetricSlot::Custom(Arc::new(metric)));
        self
    }

    /// Names of the bound metrics, in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|slot| slot.metric().name())
    }

    /// Number of bound metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Check if no metric is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Evaluate every bound metric.
    ///
    /// With no bound metrics this returns an empty report for any input.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::ShapeMismatch`] if the shapes differ and
    /// [`MetricError::EmptyInput`] if both arrays are empty.
    pub fn evaluate(
        &self,
        preds: ArrayViewD<'_, f32>,
        labels: ArrayViewD<'_, f32>,
    ) -> Result<MetricReport> {
        let mut report = MetricReport::new();
        if self.metrics.is_empty() {
            return Ok(report);
        }

        if preds.shape() != labels.shape() {
            return Err(MetricError::ShapeMismatch {
                preds: preds.shape().to_vec(),
                labels: labels.shape().to_vec(),
            });
        }
        if preds.is_empty() {
            return Err(MetricError::EmptyInput);
        }

        for slot in &self.metrics {
            let metric = slot.metric();
            report.insert(metric.name(), metric.compute(&preds, &labels));
        }
        Ok(report)
    }
}

impl MetricCallback for MetricsCallback {
    fn evaluate(
        &self,
        preds: ArrayViewD<'_, f32>,
        labels: ArrayViewD<'_, f32>,
    ) -> Result<MetricReport> {
        MetricsCallback::evaluate(self, preds, labels)
    }
}

impl std::fmt::Debug for MetricsCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
