//! Static registry resolving metric names to implementations.
//!
//! Names are matched exactly (lowercase). The registry is fixed at compile
//! time; callers needing custom metrics attach them to a
//! [`MetricsCallback`](crate::MetricsCallback) with
//! [`with_metric`](crate::MetricsCallback::with_metric).
//!
//! # Example
//!
//! ```rust
//! use tswindow_metrics::registry;
//!
//! let mse = registry::resolve("mse").unwrap();
//! assert_eq!(mse.name(), "mse");
//! assert!(registry::resolve("accuracy").is_err());
//! ```

use crate::error::{MetricError, Result};
use crate::metrics::{Metric, MAE, MAPE, MSE, R2, RMSE, SMAPE};

static REGISTRY: &[&(dyn Metric + 'static)] = &[&MSE, &MAE, &RMSE, &MAPE, &SMAPE, &R2];

/// Resolve a metric by name.
///
/// # Errors
///
/// Returns [`MetricError::UnknownMetric`] if no metric is registered under `name`.
pub fn resolve(name: &str) -> Result<&'static dyn Metric> {
    REGISTRY
        .iter()
        .copied()
        .find(|metric| metric.name() == name)
        .ok_or_else(|| MetricError::UnknownMetric(name.to_string()))
}

/// Names of all registered metrics, in registration order.
pub fn available_metrics() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|metric| metric.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known() {
        for name in available_metrics() {
            assert_eq!(resolve(name).unwrap().name(), name);
        }
    }

    #[test]
    fn test_resolve_unknown() {
        match resolve("MSE") {
            Err(MetricError::UnknownMetric(name)) => assert_eq!(name, "MSE"),
            other => panic!("expected UnknownMetric, got {:?}", other.map(|m| m.name().to_string())),
        }
    }

    #[test]
    fn test_available_metrics() {
        let names: Vec<_> = available_metrics().collect();
        assert_eq!(names, vec!["mse", "mae", "rmse", "mape", "smape", "r2"]);
    }
}
