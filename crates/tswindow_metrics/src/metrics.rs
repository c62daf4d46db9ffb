//! Regression metrics over predictions and labels of any shape.

use ndarray::ArrayViewD;

/// Labels smaller than this in magnitude are skipped by [`MAPE`].
const MAPE_EPS: f64 = 1e-8;

/// Trait for evaluation metrics.
///
/// Implementations assume `preds` and `labels` have identical shapes;
/// [`MetricsCallback`](crate::MetricsCallback) checks this before calling.
pub trait Metric: Send + Sync {
    /// Compute the metric from predictions and labels.
    fn compute(&self, preds: &ArrayViewD<'_, f32>, labels: &ArrayViewD<'_, f32>) -> f32;

    /// Get the metric name.
    fn name(&self) -> &str;

    /// Whether higher is better.
    fn higher_is_better(&self) -> bool {
        false
    }
}

fn mean_of<F>(preds: &ArrayViewD<'_, f32>, labels: &ArrayViewD<'_, f32>, f: F) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    let n = preds.len();
    if n == 0 {
        return f64::NAN;
    }
    let sum: f64 = preds
        .iter()
        .zip(labels.iter())
        .map(|(&p, &y)| f(f64::from(p), f64::from(y)))
        .sum();
    sum / n as f64
}

/// Mean Squared Error metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct MSE;

impl Metric for MSE {
    fn compute(&self, preds: &ArrayViewD<'_, f32>, labels: &ArrayViewD<'_, f32>) -> f32 {
        mean_of(preds, labels, |p, y| (p - y) * (p - y)) as f32
    }

    fn name(&self) -> &str {
        "mse"
    }
}

/// Mean Absolute Error metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct MAE;

impl Metric for MAE {
    fn compute(&self, preds: &ArrayViewD<'_, f32>, labels: &ArrayViewD<'_, f32>) -> f32 {
        mean_of(preds, labels, |p, y| (p - y).abs()) as f32
    }

    fn name(&self) -> &str {
        "mae"
    }
}

/// Root Mean Squared Error metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct RMSE;

impl Metric for RMSE {
    fn compute(&self, preds: &ArrayViewD<'_, f32>, labels: &ArrayViewD<'_, f32>) -> f32 {
        mean_of(preds, labels, |p, y| (p - y) * (p - y)).sqrt() as f32
    }

    fn name(&self) -> &str {
        "rmse"
    }
}

/// Mean Absolute Percentage Error, in percent.
///
/// Entries whose label is (numerically) zero are skipped. Returns NaN when
/// every label is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct MAPE;

impl Metric for MAPE {
    fn compute(&self, preds: &ArrayViewD<'_, f32>, labels: &ArrayViewD<'_, f32>) -> f32 {
        let mut total = 0.0f64;
        let mut count = 0usize;
        for (&p, &y) in preds.iter().zip(labels.iter()) {
            let y = f64::from(y);
            if y.abs() > MAPE_EPS {
                total += ((f64::from(p) - y) / y).abs();
                count += 1;
            }
        }
        if count == 0 {
            return f32::NAN;
        }
        (100.0 * total / count as f64) as f32
    }

    fn name(&self) -> &str {
        "mape"
    }
}

/// Symmetric Mean Absolute Percentage Error, in percent (range `[0, 200]`).
///
/// Pairs where both prediction and label are zero contribute zero error.
#[derive(Debug, Clone, Copy, Default)]
pub struct SMAPE;

impl Metric for SMAPE {
    fn compute(&self, preds: &ArrayViewD<'_, f32>, labels: &ArrayViewD<'_, f32>) -> f32 {
        let smape = mean_of(preds, labels, |p, y| {
            let denom = p.abs() + y.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (p - y).abs() / denom
            }
        });
        (100.0 * smape) as f32
    }

    fn name(&self) -> &str {
        "smape"
    }
}

/// Coefficient of determination.
///
/// For constant labels the score is 1.0 on a perfect fit and 0.0 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct R2;

impl Metric for R2 {
    fn compute(&self, preds: &ArrayViewD<'_, f32>, labels: &ArrayViewD<'_, f32>) -> f32 {
        let n = labels.len();
        if n == 0 {
            return f32::NAN;
        }
        let mean = labels.iter().map(|&y| f64::from(y)).sum::<f64>() / n as f64;

        let mut ss_res = 0.0f64;
        let mut ss_tot = 0.0f64;
        for (&p, &y) in preds.iter().zip(labels.iter()) {
            let (p, y) = (f64::from(p), f64::from(y));
            ss_res += (y - p) * (y - p);
            ss_tot += (y - mean) * (y - mean);
        }

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        (1.0 - ss_res / ss_tot) as f32
    }

    fn name(&self) -> &str {
        "r2"
    }

    fn higher_is_better(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, ArrayD};

    fn pair(preds: &[f32], labels: &[f32]) -> (ArrayD<f32>, ArrayD<f32>) {
        (
            ndarray::Array1::from(preds.to_vec()).into_dyn(),
            ndarray::Array1::from(labels.to_vec()).into_dyn(),
        )
    }

    #[test]
    fn test_metric_names() {
        assert_eq!(MSE.name(), "mse");
        assert_eq!(MAE.name(), "mae");
        assert_eq!(RMSE.name(), "rmse");
        assert_eq!(MAPE.name(), "mape");
        assert_eq!(SMAPE.name(), "smape");
        assert_eq!(R2.name(), "r2");
    }

    #[test]
    fn test_higher_is_better() {
        assert!(!MSE.higher_is_better());
        assert!(!MAE.higher_is_better());
        assert!(R2.higher_is_better());
    }

    #[test]
    fn test_error_metrics() {
        let (p, y) = pair(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 6.0]);
        assert!((MSE.compute(&p.view(), &y.view()) - 1.0).abs() < 1e-6);
        assert!((MAE.compute(&p.view(), &y.view()) - 0.5).abs() < 1e-6);
        assert!((RMSE.compute(&p.view(), &y.view()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_metrics_accept_any_rank() {
        let p = array![[[1.0f32], [2.0]], [[3.0], [4.0]]].into_dyn();
        let y = array![[[2.0f32], [2.0]], [[3.0], [2.0]]].into_dyn();
        assert!((MSE.compute(&p.view(), &y.view()) - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_mape_skips_zero_labels() {
        let (p, y) = pair(&[1.0, 110.0], &[0.0, 100.0]);
        assert!((MAPE.compute(&p.view(), &y.view()) - 10.0).abs() < 1e-4);

        let (p, y) = pair(&[1.0], &[0.0]);
        assert!(MAPE.compute(&p.view(), &y.view()).is_nan());
    }

    #[test]
    fn test_smape_bounds() {
        let (p, y) = pair(&[0.0, 1.0], &[0.0, -1.0]);
        // (0 + 2) / 2 pairs * 100
        assert!((SMAPE.compute(&p.view(), &y.view()) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_r2() {
        let (p, y) = pair(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!((R2.compute(&p.view(), &y.view()) - 1.0).abs() < 1e-6);

        let (p, y) = pair(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]);
        assert!(R2.compute(&p.view(), &y.view()).abs() < 1e-6);

        let (p, y) = pair(&[1.0, 2.0], &[5.0, 5.0]);
        assert_eq!(R2.compute(&p.view(), &y.view()), 0.0);
    }
}
