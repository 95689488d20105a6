//! Step-size rule and backtracking for normalized IHT.
//!
//! The normalized step size is the exact minimizer of the least-squares loss
//! along the gradient restricted to the active support:
//!
//! ```text
//! μ = ‖g_S‖² / ‖X_S g_S‖²
//! ```
//!
//! When a step changes the support the quadratic model on the old support no
//! longer applies, so `μ` is halved until
//!
//! ```text
//! μ · ‖X(w_new − w_old)‖² ≤ 0.99 · ‖w_new − w_old‖²
//! ```
//!
//! or the backtracking budget runs out. Both norms are measured once, on the
//! first trial step.

use nalgebra::{DMatrix, DVector};

use crate::math::{mul_columns, norm_squared_on, topk};

/// Fraction of `‖Δw‖²` that `μ‖XΔw‖²` may not exceed after a support change.
pub const STABILITY_MARGIN: f64 = 0.99;

/// Normalized step size on the support `cols`.
///
/// Returns `None` only when the gradient is exactly zero on the support. A
/// non-finite ratio is returned as is; the caller decides how to fail.
pub fn normalized_step_size(x: &DMatrix<f64>, g: &DVector<f64>, cols: &[usize]) -> Option<f64> {
    let num = norm_squared_on(g, cols);
    if num == 0.0 {
        return None;
    }
    let den = mul_columns(x, g, cols).norm_squared();
    Some(num / den)
}

/// `w_prev + μ·g`.
pub fn gradient_step(w_prev: &DVector<f64>, g: &DVector<f64>, mu: f64) -> DVector<f64> {
    let mut out = w_prev.clone();
    out.axpy(mu, g, 1.0);
    out
}

/// Whether `μ` violates the local stability bound for the given norms.
pub fn violates_stability(mu: f64, omega_top: f64, omega_bot: f64) -> bool {
    mu * omega_bot > STABILITY_MARGIN * omega_top
}

/// Result of a backtracking pass.
#[derive(Debug, Clone)]
pub struct Backtrack {
    /// Thresholded iterate built with the final `mu`.
    pub w: DVector<f64>,
    /// Top-k indices of `w` (ascending).
    pub indices: Vec<usize>,
    pub mu: f64,
    /// Number of halvings performed.
    pub steps: usize,
    /// True when the loop stopped on the budget with the bound still violated.
    pub exhausted: bool,
    /// `‖w_trial − w_prev‖²` of the first trial.
    pub omega_top: f64,
    /// `‖X w_trial − X w_prev‖²` of the first trial.
    pub omega_bot: f64,
}

/// Shrink `mu` geometrically after a support change.
///
/// `trial` and `trial_indices` are the first thresholded iterate built with
/// `mu`. Exhausting `max_steps` is not an error; the last iterate is kept and
/// `exhausted` is set.
#[allow(clippy::too_many_arguments)]
pub fn backtrack(
    x: &DMatrix<f64>,
    g: &DVector<f64>,
    w_prev: &DVector<f64>,
    xw_prev: &DVector<f64>,
    k: usize,
    mu: f64,
    trial: DVector<f64>,
    trial_indices: Vec<usize>,
    max_steps: usize,
) -> Backtrack {
    let omega_top = (&trial - w_prev).norm_squared();
    let omega_bot = (mul_columns(x, &trial, &trial_indices) - xw_prev).norm_squared();

    let mut mu = mu;
    let mut w = trial;
    let mut indices = trial_indices;
    let mut steps = 0;

    while violates_stability(mu, omega_top, omega_bot) && steps < max_steps {
        mu /= 2.0;
        (w, indices) = topk(&gradient_step(w_prev, g, mu), k);
        steps += 1;
    }

    Backtrack {
        w,
        indices,
        mu,
        steps,
        exhausted: violates_stability(mu, omega_top, omega_bot),
        omega_top,
        omega_bot,
    }
}
