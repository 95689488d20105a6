//! Dense baseline: ordinary least squares ranked by permutation importance.
//!
//! The baseline fits all features at once and then ranks them by how much the
//! R² drops when a single column is shuffled. Two selections are derived:
//!
//! - the top-T features, where T is the true number of informative features
//! - the smallest prefix of the ranking whose cumulative importance stays
//!   within `explanation_rate` of the total

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

use crate::error::{AppError, EXIT_INPUT, EXIT_NUMERIC};
use crate::math::{r2_score, solve_least_squares};

/// Fit `y ≈ Xβ` without an intercept.
pub fn fit_ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, AppError> {
    if x.nrows() != y.len() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("X has {} rows but y has {} entries.", x.nrows(), y.len()),
        ));
    }
    solve_least_squares(x, y)
        .ok_or_else(|| AppError::new(EXIT_NUMERIC, "Least squares baseline is too ill-conditioned to solve."))
}

/// Per-feature permutation importances.
#[derive(Debug, Clone, PartialEq)]
pub struct Importances {
    /// Mean drop in R² over the repeats.
    pub mean: Vec<f64>,
    /// Population standard deviation of the drop.
    pub std: Vec<f64>,
}

/// Permutation importance of every column of `x` for the linear model `coef`.
///
/// Each feature gets its own generator seeded from `rng`, so the result does
/// not depend on how rayon schedules the features.
pub fn permutation_importance<R: Rng + ?Sized>(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    coef: &DVector<f64>,
    n_repeats: usize,
    rng: &mut R,
) -> Result<Importances, AppError> {
    if n_repeats == 0 {
        return Err(AppError::new(EXIT_INPUT, "n_repeats must be >= 1."));
    }
    if coef.len() != x.ncols() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Expected {} coefficients, got {}.", x.ncols(), coef.len()),
        ));
    }

    let n = x.nrows();
    let base_pred = x * coef;
    let base_score = r2_score(y, &base_pred);
    let seeds: Vec<u64> = (0..x.ncols()).map(|_| rng.next_u64()).collect();

    let per_feature: Vec<(f64, f64)> = seeds
        .par_iter()
        .enumerate()
        .map(|(j, &seed)| {
            let mut rng = StdRng::seed_from_u64(seed);
            let col = x.column(j);
            let mut perm: Vec<usize> = (0..n).collect();
            let drops: Vec<f64> = (0..n_repeats)
                .map(|_| {
                    perm.shuffle(&mut rng);
                    let mut pred = base_pred.clone();
                    for i in 0..n {
                        pred[i] += coef[j] * (col[perm[i]] - col[i]);
                    }
                    base_score - r2_score(y, &pred)
                })
                .collect();
            mean_std(&drops)
        })
        .collect();

    let (mean, std): (Vec<f64>, Vec<f64>) = per_feature.into_iter().unzip();
    Ok(Importances { mean, std })
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Draw one score per feature from `N(mean, std)`.
///
/// This randomizes the ranking of features whose importance is within noise.
pub fn sample_scores<R: Rng + ?Sized>(imp: &Importances, rng: &mut R) -> Result<Vec<f64>, AppError> {
    imp.mean
        .iter()
        .zip(imp.std.iter())
        .map(|(&mean, &std)| {
            if std == 0.0 {
                return Ok(mean);
            }
            let normal = Normal::new(mean, std)
                .map_err(|e| AppError::new(EXIT_NUMERIC, format!("Importance distribution error: {e}")))?;
            Ok(normal.sample(rng))
        })
        .collect()
}

/// Feature indices sorted by descending score (ties: lower index first).
pub fn rank_features(scores: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..scores.len()).collect();
    idx.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then_with(|| a.cmp(&b)));
    idx
}

/// Features whose cumulative score (in ranking order) stays within
/// `rate · total`.
pub fn explained_features(scores: &[f64], ranking: &[usize], rate: f64) -> Vec<usize> {
    let mut cumsum = Vec::with_capacity(ranking.len());
    let mut acc = 0.0;
    for &j in ranking {
        acc += scores[j];
        cumsum.push(acc);
    }
    let threshold = acc * rate;
    ranking
        .iter()
        .zip(cumsum.iter())
        .filter_map(|(&j, &c)| (c <= threshold).then_some(j))
        .collect()
}

/// Keep `coef` on `features`, zero elsewhere.
pub fn restrict(coef: &DVector<f64>, features: &[usize]) -> DVector<f64> {
    let mut out = DVector::zeros(coef.len());
    for &j in features {
        out[j] = coef[j];
    }
    out
}
