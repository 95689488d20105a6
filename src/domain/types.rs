//! Shared domain types.
//!
//! These types are kept serializable so that a whole run can be described in
//! a TOML file and its outputs exported to JSON.

use clap::ValueEnum;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::fit::IhtConfig;

/// Which synthetic generator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Independently chosen informative features.
    Sparse,
    /// Contiguous feature groups switched on or off together.
    Grouped,
}

/// How informative coefficients are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeatureFill {
    /// Integers drawn uniformly (`[1, 4m)` for sparse, `[1, 4·groups)` for grouped).
    Const,
    /// Standard normal draws (powers of a shared draw within a polynomial group).
    Normal,
}

/// Synthetic dataset parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub kind: DataKind,
    /// Number of observations.
    pub n: usize,
    /// Number of features.
    pub m: usize,
    /// Observation noise standard deviation.
    pub noise_std: f64,
    /// Probability that a feature (or group) is disabled.
    pub redundancy_rate: f64,
    pub fill: FeatureFill,
    /// Polynomial degree for sparse data: informative features come in groups
    /// of this size holding successive powers of one draw.
    pub poly_degree: Option<usize>,
    /// Number of groups (grouped data only).
    pub num_groups: Option<usize>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            kind: DataKind::Sparse,
            n: 200,
            m: 50,
            noise_std: 0.5,
            redundancy_rate: 0.9,
            fill: FeatureFill::Const,
            poly_degree: None,
            num_groups: None,
        }
    }
}

/// Solver section of a run configuration.
///
/// `k = None` means "use the true number of informative features", which is
/// only known for synthetic data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSection {
    pub k: Option<usize>,
    pub tol: f64,
    pub max_iter: usize,
    pub max_backtrack: usize,
    pub verbose: bool,
}

impl Default for SolverSection {
    fn default() -> Self {
        let base = IhtConfig::default();
        Self {
            k: None,
            tol: base.tol,
            max_iter: base.max_iter,
            max_backtrack: base.max_backtrack,
            verbose: base.verbose,
        }
    }
}

impl SolverSection {
    /// Resolve into a solver config, falling back to `default_k` when `k` is unset.
    pub fn to_iht_config(&self, default_k: usize) -> IhtConfig {
        IhtConfig {
            k: self.k.unwrap_or(default_k),
            tol: self.tol,
            max_iter: self.max_iter,
            max_backtrack: self.max_backtrack,
            verbose: self.verbose,
        }
    }
}

/// Permutation-importance evaluation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PermImportanceConfig {
    /// Shuffles per feature.
    pub n_repeats: usize,
    /// Fraction of cumulative importance that the selected features must explain.
    pub explanation_rate: f64,
}

impl Default for PermImportanceConfig {
    fn default() -> Self {
        Self {
            n_repeats: 5,
            explanation_rate: 0.95,
        }
    }
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Seed for the explicit random generator; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub data: DataConfig,
    pub solver: SolverSection,
    pub evaluation: PermImportanceConfig,
}

/// A regression fixture with known ground truth.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Noisy observations (n).
    pub y: DVector<f64>,
    /// Design matrix (n × m).
    pub x: DMatrix<f64>,
    /// True coefficients (m).
    pub w_true: DVector<f64>,
    /// Noiseless observations `X · w_true` (n).
    pub y_true: DVector<f64>,
    /// True where `w_true` is non-zero.
    pub features_mask: Vec<bool>,
    /// Group label per feature for grouped data (`0` = disabled group).
    pub group_labels: Option<Vec<usize>>,
}

impl Dataset {
    pub fn n(&self) -> usize {
        self.x.nrows()
    }

    pub fn m(&self) -> usize {
        self.x.ncols()
    }

    /// Number of informative features.
    pub fn informative_count(&self) -> usize {
        self.features_mask.iter().filter(|&&on| on).count()
    }
}

/// Quality of one feature selection, as reported to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub label: String,
    pub mse: f64,
    pub r2: f64,
    pub n_features: usize,
    /// Selected features that are truly informative.
    pub true_positives: usize,
    /// Selected features that are not.
    pub false_positives: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_config_parses_partial_toml() {
        let cfg: RunConfig = toml::from_str(
            r#"
            seed = 7

            [data]
            n = 100
            fill = "normal"
            poly_degree = 2

            [solver]
            k = 4
            tol = 1e-6
            "#,
        )
        .unwrap();

        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.data.n, 100);
        assert_eq!(cfg.data.m, DataConfig::default().m);
        assert_eq!(cfg.data.fill, FeatureFill::Normal);
        assert_eq!(cfg.data.poly_degree, Some(2));
        assert_eq!(cfg.solver.k, Some(4));
        assert_eq!(cfg.solver.max_iter, 100);
        assert_eq!(cfg.evaluation, PermImportanceConfig::default());
    }

    #[test]
    fn run_config_rejects_unknown_fields() {
        let err = toml::from_str::<RunConfig>("[solver]\nmax_step = 3\n");
        assert!(err.is_err());
    }

    #[test]
    fn solver_section_resolves_k() {
        let section = SolverSection::default();
        assert_eq!(section.to_iht_config(6).k, 6);

        let section = SolverSection {
            k: Some(2),
            ..SolverSection::default()
        };
        assert_eq!(section.to_iht_config(6).k, 2);
    }
}
