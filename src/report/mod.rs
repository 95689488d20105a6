//! Evaluation of feature selections against a known ground truth, plus
//! formatted terminal output.
//!
//! Selections are scored on the noisy observations `y`; the noise floor
//! scores `y` against the clean signal and is the best any selection can do.

use nalgebra::DVector;
use rand::Rng;

use crate::domain::{Dataset, PermImportanceConfig, SelectionSummary, SolverSection};
use crate::error::{AppError, EXIT_INPUT};
use crate::fit::{
    IhtConfig, IhtFit, IhtSolver, Importances, explained_features, fit_ols, permutation_importance,
    rank_features, restrict, sample_scores,
};
use crate::math::{mse, r2_score};

pub mod format;

pub use format::*;

/// Score the model `weights` restricted to the `selected` features.
pub fn summarize(label: &str, dataset: &Dataset, weights: &DVector<f64>, selected: &[usize]) -> SelectionSummary {
    let y_hat = &dataset.x * weights;
    let true_positives = selected.iter().filter(|&&j| dataset.features_mask[j]).count();
    SelectionSummary {
        label: label.to_string(),
        mse: mse(&dataset.y, &y_hat),
        r2: r2_score(&dataset.y, &y_hat),
        n_features: selected.len(),
        true_positives,
        false_positives: selected.len() - true_positives,
    }
}

/// Best achievable fit given the observation noise.
pub fn noise_floor(dataset: &Dataset) -> SelectionSummary {
    let informative = dataset.informative_count();
    SelectionSummary {
        label: "noise floor".to_string(),
        mse: mse(&dataset.y_true, &dataset.y),
        r2: r2_score(&dataset.y_true, &dataset.y),
        n_features: informative,
        true_positives: informative,
        false_positives: 0,
    }
}

/// Outputs of an IHT evaluation.
#[derive(Debug, Clone)]
pub struct IhtReport {
    pub config: IhtConfig,
    pub fit: IhtFit,
    pub summary: SelectionSummary,
}

/// Solve with the configured `k`, or the true informative count when unset.
pub fn evaluate_iht(dataset: &Dataset, solver: &SolverSection) -> Result<IhtReport, AppError> {
    let config = solver.to_iht_config(dataset.informative_count());
    let fit = IhtSolver::new(config.clone())?.solve(&dataset.x, &dataset.y)?;
    let summary = summarize(
        &format!("IHT (k={})", config.k),
        dataset,
        &fit.weights,
        &fit.support_indices(),
    );
    Ok(IhtReport { config, fit, summary })
}

/// Outputs of the OLS + permutation-importance baseline.
#[derive(Debug, Clone)]
pub struct BaselineReport {
    pub coef: DVector<f64>,
    pub importances: Importances,
    /// Noisy scores drawn from the importances, one per feature.
    pub scores: Vec<f64>,
    pub noise_floor: SelectionSummary,
    /// Top-T features, T being the true informative count.
    pub top: SelectionSummary,
    /// Features within the explanation rate.
    pub explained: SelectionSummary,
    pub explanation_rate: f64,
}

pub fn evaluate_baseline<R: Rng + ?Sized>(
    dataset: &Dataset,
    config: &PermImportanceConfig,
    rng: &mut R,
) -> Result<BaselineReport, AppError> {
    if !(config.explanation_rate > 0.0 && config.explanation_rate <= 1.0) {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("explanation_rate must be in (0, 1], got {}.", config.explanation_rate),
        ));
    }

    let coef = fit_ols(&dataset.x, &dataset.y)?;
    let importances = permutation_importance(&dataset.x, &dataset.y, &coef, config.n_repeats, rng)?;
    let scores = sample_scores(&importances, rng)?;
    let ranking = rank_features(&scores);

    let t = dataset.informative_count();
    let top_idx = &ranking[..t.min(ranking.len())];
    let top = summarize(
        &format!("OLS top {t}"),
        dataset,
        &restrict(&coef, top_idx),
        top_idx,
    );

    let explained_idx = explained_features(&scores, &ranking, config.explanation_rate);
    let explained = summarize(
        &format!("OLS {:.0}% explained", config.explanation_rate * 100.0),
        dataset,
        &restrict(&coef, &explained_idx),
        &explained_idx,
    );

    Ok(BaselineReport {
        coef,
        importances,
        scores,
        noise_floor: noise_floor(dataset),
        top,
        explained,
        explanation_rate: config.explanation_rate,
    })
}
