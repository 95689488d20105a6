//! Normalized Iterative Hard Thresholding for L0-constrained least squares.
//!
//! Minimizes `‖y − Xw‖² / 2` subject to `w` having at most `k` non-zeros.
//!
//! Each iteration:
//! 1. residual `d = y − X w_prev` and gradient `g = Xᵗ d`
//! 2. normalized step size `μ` from `g` restricted to the previous support
//! 3. `w = TopK(w_prev + μ g, k)`
//! 4. if the support changed, backtrack on `μ` (see [`crate::fit::step`])
//! 5. stop when `‖w − w_prev‖∞ / (‖w_prev‖∞ + 1) < tol`
//!
//! The first support is the top-k of `Xᵗy` (the gradient at the origin), not
//! the support of the all-zero starting point.

use log::{debug, info, trace, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::IhtError;
use crate::fit::step::{backtrack, gradient_step, normalized_step_size};
use crate::math::{inf_norm, mask_count, mask_indices, mul_columns, support_mask, topk, topk_indices};

/// Solver options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IhtConfig {
    /// Target support size.
    pub k: usize,
    /// Tolerance on the scaled step norm.
    pub tol: f64,
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Maximum number of step-size halvings per iteration (0 disables backtracking).
    pub max_backtrack: usize,
    /// Log progress at `info` level. Never changes the numbers.
    pub verbose: bool,
}

impl Default for IhtConfig {
    fn default() -> Self {
        Self {
            k: 1,
            tol: 1e-4,
            max_iter: 100,
            max_backtrack: 50,
            verbose: false,
        }
    }
}

impl IhtConfig {
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    /// Checks that do not depend on the data.
    pub fn validate(&self) -> Result<(), IhtError> {
        if self.k < 1 {
            return Err(IhtError::InvalidParameters(format!("k must be >= 1, got {}", self.k)));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(IhtError::InvalidParameters(format!(
                "tol must be finite and > 0, got {}",
                self.tol
            )));
        }
        if self.max_iter < 1 {
            return Err(IhtError::InvalidParameters("max_iter must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Full validation against a design matrix and response.
    pub fn validate_problem(&self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(), IhtError> {
        self.validate()?;
        let (n, m) = x.shape();
        if n == 0 || m == 0 {
            return Err(IhtError::InvalidParameters(format!(
                "design matrix must be non-empty, got {n}x{m}"
            )));
        }
        if y.len() != n {
            return Err(IhtError::InvalidParameters(format!(
                "dimension mismatch: X has {n} rows but y has {} entries",
                y.len()
            )));
        }
        if self.k > m {
            return Err(IhtError::InvalidParameters(format!(
                "k={} exceeds the number of features m={m}",
                self.k
            )));
        }
        Ok(())
    }
}

/// How a successful solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// Scaled step norm fell below `tol`.
    Converged,
    /// The gradient vanished on the active support; the previous iterate is
    /// returned unchanged.
    Stationary,
}

/// Diagnostics for one accepted iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iter: usize,
    pub loss: f64,
    pub step_norm: f64,
    pub scaled_step_norm: f64,
    pub mu: f64,
    pub backtracks: usize,
    pub backtrack_exhausted: bool,
}

/// Output of one IHT iteration body.
#[derive(Debug, Clone)]
pub struct Step {
    pub w: DVector<f64>,
    /// Top-k indices of `w` (ascending).
    pub indices: Vec<usize>,
    pub xw: DVector<f64>,
    pub mu: f64,
    pub backtracks: usize,
    /// Backtracking stopped on the budget with the stability bound violated.
    pub exhausted: bool,
}

/// A successful solve.
#[derive(Debug, Clone)]
pub struct IhtFit {
    /// At most `k` non-zero entries.
    pub weights: DVector<f64>,
    pub support: Vec<bool>,
    /// Number of accepted iterations.
    pub iterations: usize,
    /// `‖y − Xw‖² / 2` at the returned weights.
    pub loss: f64,
    pub termination: Termination,
    /// Iterations whose backtracking ran out of budget.
    pub exhausted_backtracks: usize,
    pub history: Vec<IterationRecord>,
}

impl IhtFit {
    pub fn support_indices(&self) -> Vec<usize> {
        mask_indices(&self.support)
    }
}

/// Starting point for [`IhtSolver::solve_from`].
#[derive(Debug, Clone)]
pub struct WarmStart {
    pub w: DVector<f64>,
    pub support: Vec<bool>,
}

impl From<&IhtFit> for WarmStart {
    fn from(fit: &IhtFit) -> Self {
        Self {
            w: fit.weights.clone(),
            support: fit.support.clone(),
        }
    }
}

/// One IHT iteration: normalized gradient step, hard thresholding, and
/// backtracking when the support changes.
///
/// `g` is the full gradient `Xᵗ(y − X w_prev)`. Fails with
/// [`IhtError::NonFiniteLoss`] when `g` or the step size is not finite, and
/// with [`IhtError::DegenerateStepSize`] when `g` vanishes on `sup_prev`.
#[allow(clippy::too_many_arguments)]
pub fn iht_step(
    x: &DMatrix<f64>,
    g: &DVector<f64>,
    w_prev: &DVector<f64>,
    sup_prev: &[usize],
    xw_prev: &DVector<f64>,
    k: usize,
    max_backtrack: usize,
    iter: usize,
) -> Result<Step, IhtError> {
    if g.iter().any(|v| !v.is_finite()) {
        return Err(IhtError::NonFiniteLoss { iter, loss: f64::NAN });
    }
    let mu = normalized_step_size(x, g, sup_prev).ok_or(IhtError::DegenerateStepSize { iter })?;
    if !mu.is_finite() {
        return Err(IhtError::NonFiniteLoss { iter, loss: f64::NAN });
    }

    let (w, indices) = topk(&gradient_step(w_prev, g, mu), k);

    if indices == sup_prev {
        let xw = mul_columns(x, &w, &indices);
        return Ok(Step {
            w,
            indices,
            xw,
            mu,
            backtracks: 0,
            exhausted: false,
        });
    }

    let bt = backtrack(x, g, w_prev, xw_prev, k, mu, w, indices, max_backtrack);
    let xw = mul_columns(x, &bt.w, &bt.indices);
    Ok(Step {
        w: bt.w,
        indices: bt.indices,
        xw,
        mu: bt.mu,
        backtracks: bt.steps,
        exhausted: bt.exhausted,
    })
}

/// Normalized IHT solver.
///
/// Borrows `X` and `y` immutably, so one matrix can back several concurrent
/// solves; all iterate state is owned by the call.
#[derive(Debug, Clone)]
pub struct IhtSolver {
    config: IhtConfig,
}

struct State {
    w: DVector<f64>,
    sup: Vec<usize>,
    xw: DVector<f64>,
    d: DVector<f64>,
}

impl IhtSolver {
    /// Build a solver, rejecting data-independent parameter errors eagerly.
    pub fn new(config: IhtConfig) -> Result<Self, IhtError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IhtConfig {
        &self.config
    }

    /// Solve from the origin, seeding the support with the top-k of `Xᵗy`.
    pub fn solve(&self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<IhtFit, IhtError> {
        self.config.validate_problem(x, y)?;
        let m = x.ncols();
        let xty = x.tr_mul(y);
        let state = State {
            w: DVector::zeros(m),
            sup: topk_indices(xty.as_slice(), self.config.k),
            xw: DVector::zeros(x.nrows()),
            d: y.clone(),
        };
        self.run(x, y, state)
    }

    /// Solve starting from a caller-supplied iterate and support.
    pub fn solve_from(
        &self,
        x: &DMatrix<f64>,
        y: &DVector<f64>,
        start: WarmStart,
    ) -> Result<IhtFit, IhtError> {
        self.config.validate_problem(x, y)?;
        let m = x.ncols();
        if start.w.len() != m || start.support.len() != m {
            return Err(IhtError::InvalidParameters(format!(
                "warm start must have {m} weights and a {m}-entry support, got {} and {}",
                start.w.len(),
                start.support.len()
            )));
        }
        let active = mask_count(&start.support);
        if active == 0 || active > self.config.k {
            return Err(IhtError::InvalidParameters(format!(
                "warm start support has {active} entries, expected 1..={}",
                self.config.k
            )));
        }
        if start
            .w
            .iter()
            .zip(start.support.iter())
            .any(|(&wi, &on)| !on && wi != 0.0)
        {
            return Err(IhtError::InvalidParameters(
                "warm start weights are non-zero outside the support".to_string(),
            ));
        }

        let xw = x * &start.w;
        let d = y - &xw;
        let state = State {
            sup: mask_indices(&start.support),
            w: start.w,
            xw,
            d,
        };
        self.run(x, y, state)
    }

    fn run(&self, x: &DMatrix<f64>, y: &DVector<f64>, mut state: State) -> Result<IhtFit, IhtError> {
        let cfg = &self.config;
        let m = x.ncols();
        let report_every = (cfg.max_iter / 10).max(1);
        let mut history = Vec::new();
        let mut exhausted_backtracks = 0;
        let mut last_scaled = f64::INFINITY;

        for iter in 0..cfg.max_iter {
            let g = x.tr_mul(&state.d);

            let step = match iht_step(
                x,
                &g,
                &state.w,
                &state.sup,
                &state.xw,
                cfg.k,
                cfg.max_backtrack,
                iter,
            ) {
                Ok(step) => step,
                Err(IhtError::DegenerateStepSize { .. }) => {
                    let loss = state.d.norm_squared() / 2.0;
                    if !loss.is_finite() {
                        return Err(IhtError::NonFiniteLoss { iter, loss });
                    }
                    debug!("IHT gradient vanished on the support at iteration {iter}; stopping with loss {loss:.4}");
                    return Ok(IhtFit {
                        weights: state.w,
                        support: support_mask(m, &state.sup),
                        iterations: iter,
                        loss,
                        termination: Termination::Stationary,
                        exhausted_backtracks,
                        history,
                    });
                }
                Err(e) => return Err(e),
            };

            let d = y - &step.xw;
            let loss = d.norm_squared() / 2.0;
            if !loss.is_finite() {
                return Err(IhtError::NonFiniteLoss { iter, loss });
            }

            let step_norm = inf_norm(&(&step.w - &state.w));
            let scaled = step_norm / (inf_norm(&state.w) + 1.0);
            let converged = scaled < cfg.tol;

            if step.exhausted {
                exhausted_backtracks += 1;
                warn!(
                    "IHT iteration {iter}: backtracking budget ({}) exhausted, accepting step with mu {:.3e}",
                    cfg.max_backtrack, step.mu
                );
            }

            history.push(IterationRecord {
                iter,
                loss,
                step_norm,
                scaled_step_norm: scaled,
                mu: step.mu,
                backtracks: step.backtracks,
                backtrack_exhausted: step.exhausted,
            });

            if cfg.verbose && iter % report_every == 0 {
                info!(
                    "Iteration {iter}, loss {loss:.4}, weights norm {step_norm:.4}, scaled norm {scaled:.4}, mu {:.5}",
                    step.mu
                );
                if step.backtracks != 0 {
                    info!("Backtracking finished in {} steps", step.backtracks);
                }
            } else {
                trace!(
                    "iter={iter} loss={loss:.6e} step={step_norm:.3e} scaled={scaled:.3e} mu={:.3e} bt={}",
                    step.mu, step.backtracks
                );
            }

            if converged {
                let msg = format!(
                    "IHT has converged in {iter} iterations with loss {loss:.4}, weights norm {step_norm:.4}"
                );
                if cfg.verbose {
                    info!("{msg}");
                } else {
                    debug!("{msg}");
                }
                return Ok(IhtFit {
                    support: support_mask(m, &step.indices),
                    weights: step.w,
                    iterations: iter + 1,
                    loss,
                    termination: Termination::Converged,
                    exhausted_backtracks,
                    history,
                });
            }

            state = State {
                w: step.w,
                sup: step.indices,
                xw: step.xw,
                d,
            };
            last_scaled = scaled;
        }

        Err(IhtError::MaxIterationsExceeded {
            max_iter: cfg.max_iter,
            last_scaled_step_norm: last_scaled,
        })
    }
}

/// Convenience wrapper: validate `config` and solve from the origin.
pub fn solve(x: &DMatrix<f64>, y: &DVector<f64>, config: &IhtConfig) -> Result<IhtFit, IhtError> {
    IhtSolver::new(config.clone())?.solve(x, y)
}
