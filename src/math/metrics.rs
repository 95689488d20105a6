//! Regression quality metrics.

use nalgebra::DVector;

/// Mean squared error between `y_true` and `y_pred`.
pub fn mse(y_true: &DVector<f64>, y_pred: &DVector<f64>) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    (y_true - y_pred).norm_squared() / n as f64
}

/// Coefficient of determination.
///
/// A constant target scores `1.0` when predicted exactly and `0.0` otherwise.
pub fn r2_score(y_true: &DVector<f64>, y_pred: &DVector<f64>) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    let mean = y_true.mean();
    let ss_res = (y_true - y_pred).norm_squared();
    let ss_tot: f64 = y_true.iter().map(|v| (v - mean) * (v - mean)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Signal-to-noise ratio in dB: mean of `20·log10(|y_i| / noise_std)` over
/// non-zero `y_i`.
///
/// Noiseless data (`noise_std == 0`) has infinite SNR.
pub fn snr_db(y_true: &DVector<f64>, noise_std: f64) -> f64 {
    if noise_std == 0.0 {
        return f64::INFINITY;
    }
    let vals: Vec<f64> = y_true
        .iter()
        .filter(|v| **v != 0.0)
        .map(|v| 20.0 * (v.abs() / noise_std).log10())
        .collect();
    if vals.is_empty() {
        return f64::NEG_INFINITY;
    }
    vals.iter().sum::<f64>() / vals.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction() {
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(mse(&y, &y), 0.0);
        assert_eq!(r2_score(&y, &y), 1.0);
    }

    #[test]
    fn mean_prediction_scores_zero() {
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let p = DVector::from_element(3, 2.0);
        assert!((r2_score(&y, &p)).abs() < 1e-12);
        assert!((mse(&y, &p) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn constant_target() {
        let y = DVector::from_element(4, 5.0);
        assert_eq!(r2_score(&y, &y), 1.0);
        assert_eq!(r2_score(&y, &DVector::zeros(4)), 0.0);
    }

    #[test]
    fn snr_in_decibels() {
        let y = DVector::from_vec(vec![10.0, -10.0, 0.0]);
        assert!((snr_db(&y, 1.0) - 20.0).abs() < 1e-12);
        assert!(snr_db(&y, 0.0).is_infinite());
    }
}
