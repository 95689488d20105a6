//! Command-line parsing for the sparse feature selection tool.
//!
//! Argument parsing is kept apart from the solver and evaluation code. Every
//! data, solver, and evaluation flag is optional so that it can override a
//! `--config` file; unset flags fall back to the file, then to defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DataKind, FeatureFill, RunConfig};
use crate::error::AppError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fes", version, about = "Sparse feature selection with Normalized IHT")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate data, run IHT, and report the selected support.
    Iht(RunArgs),
    /// Generate data and rank features with OLS + permutation importance.
    Baseline(RunArgs),
    /// Run IHT and the baseline on the same data.
    Compare(RunArgs),
    /// Run IHT for every k in a range (in parallel).
    Sweep(SweepArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    /// TOML run configuration; flags below override it.
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Random seed (entropy when unset).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Synthetic data kind [default: sparse].
    #[arg(long, value_enum)]
    pub kind: Option<DataKind>,

    /// Number of observations [default: 200].
    #[arg(short = 'n', long = "samples")]
    pub n: Option<usize>,

    /// Number of features [default: 50].
    #[arg(short = 'm', long = "features")]
    pub m: Option<usize>,

    /// Observation noise standard deviation [default: 0.5].
    #[arg(long)]
    pub noise_std: Option<f64>,

    /// Probability that a feature (or group) is disabled [default: 0.9].
    #[arg(long)]
    pub redundancy_rate: Option<f64>,

    /// How informative coefficients are filled [default: const].
    #[arg(long, value_enum)]
    pub fill: Option<FeatureFill>,

    /// Polynomial degree of informative feature groups (sparse data).
    #[arg(long)]
    pub poly_degree: Option<usize>,

    /// Number of feature groups (grouped data).
    #[arg(long)]
    pub num_groups: Option<usize>,

    /// Support size [default: true number of informative features].
    #[arg(short = 'k', long)]
    pub k: Option<usize>,

    /// Convergence tolerance on the scaled step norm [default: 1e-4].
    #[arg(long)]
    pub tol: Option<f64>,

    /// Maximum number of iterations [default: 100].
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// Maximum step-size halvings per iteration [default: 50].
    #[arg(long)]
    pub max_backtrack: Option<usize>,

    /// Log solver progress.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Permutation-importance shuffles per feature [default: 5].
    #[arg(long)]
    pub n_repeats: Option<usize>,

    /// Cumulative importance kept by the baseline selection [default: 0.95].
    #[arg(long)]
    pub explanation_rate: Option<f64>,

    /// Render ASCII loss and weight plots.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the run to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

/// Options for `fes sweep`.
#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Smallest support size.
    #[arg(long, default_value_t = 1)]
    pub k_min: usize,

    /// Largest support size [default: 2 × true informative count, capped at m].
    #[arg(long)]
    pub k_max: Option<usize>,
}

/// Build the run configuration: `--config` file (if any), then flags.
pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let mut cfg = match &args.config {
        Some(path) => crate::io::load_run_config(path)?,
        None => RunConfig::default(),
    };

    if args.seed.is_some() {
        cfg.seed = args.seed;
    }

    let data = &mut cfg.data;
    if let Some(v) = args.kind {
        data.kind = v;
    }
    if let Some(v) = args.n {
        data.n = v;
    }
    if let Some(v) = args.m {
        data.m = v;
    }
    if let Some(v) = args.noise_std {
        data.noise_std = v;
    }
    if let Some(v) = args.redundancy_rate {
        data.redundancy_rate = v;
    }
    if let Some(v) = args.fill {
        data.fill = v;
    }
    if args.poly_degree.is_some() {
        data.poly_degree = args.poly_degree;
    }
    if args.num_groups.is_some() {
        data.num_groups = args.num_groups;
    }

    let solver = &mut cfg.solver;
    if args.k.is_some() {
        solver.k = args.k;
    }
    if let Some(v) = args.tol {
        solver.tol = v;
    }
    if let Some(v) = args.max_iter {
        solver.max_iter = v;
    }
    if let Some(v) = args.max_backtrack {
        solver.max_backtrack = v;
    }
    solver.verbose |= args.verbose;

    if let Some(v) = args.n_repeats {
        cfg.evaluation.n_repeats = v;
    }
    if let Some(v) = args.explanation_rate {
        cfg.evaluation.explanation_rate = v;
    }

    Ok(cfg)
}
