//! Shared run pipeline used by every subcommand.
//!
//! config -> seeded generator -> synthetic dataset -> IHT and/or baseline
//! (or a k sweep). The caller only decides what to print and export.

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::{Dataset, RunConfig};
use crate::error::{AppError, EXIT_INPUT};
use crate::fit::{SweepEntry, sweep_k};
use crate::report::{BaselineReport, IhtReport, evaluate_baseline, evaluate_iht};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub config: RunConfig,
    /// Seed actually used (drawn from entropy when the config has none).
    pub seed: u64,
    pub dataset: Dataset,
    pub iht: Option<IhtReport>,
    pub baseline: Option<BaselineReport>,
    pub sweep: Vec<SweepEntry>,
}

/// Which evaluations a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluations {
    pub iht: bool,
    pub baseline: bool,
}

fn prepare(config: &RunConfig) -> Result<(u64, StdRng, Dataset), AppError> {
    let seed = config.seed.unwrap_or_else(rand::random);
    info!("Using seed {seed}");
    let mut rng = StdRng::seed_from_u64(seed);
    let dataset = crate::data::generate(&config.data, &mut rng)?;
    Ok((seed, rng, dataset))
}

/// Generate data and run the requested evaluations on it.
pub fn run_selection(config: &RunConfig, evals: Evaluations) -> Result<RunOutput, AppError> {
    let (seed, mut rng, dataset) = prepare(config)?;

    let iht = if evals.iht {
        Some(evaluate_iht(&dataset, &config.solver)?)
    } else {
        None
    };
    let baseline = if evals.baseline {
        Some(evaluate_baseline(&dataset, &config.evaluation, &mut rng)?)
    } else {
        None
    };

    Ok(RunOutput {
        config: config.clone(),
        seed,
        dataset,
        iht,
        baseline,
        sweep: Vec::new(),
    })
}

/// Generate data and solve for every `k` in `k_min..=k_max`.
///
/// `k_max` defaults to twice the true informative count, capped at `m`.
pub fn run_sweep(config: &RunConfig, k_min: usize, k_max: Option<usize>) -> Result<RunOutput, AppError> {
    let (seed, _, dataset) = prepare(config)?;

    let k_max = k_max.unwrap_or_else(|| (2 * dataset.informative_count()).min(dataset.m()));
    if k_min > k_max {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Empty k range: k_min={k_min} > k_max={k_max}."),
        ));
    }

    let ks: Vec<usize> = (k_min..=k_max).collect();
    let base = config.solver.to_iht_config(k_min);
    info!("Sweeping k over {k_min}..={k_max}");
    let sweep = sweep_k(&dataset.x, &dataset.y, &base, &ks);

    Ok(RunOutput {
        config: config.clone(),
        seed,
        dataset,
        iht: None,
        baseline: None,
        sweep,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DataConfig;

    fn config() -> RunConfig {
        RunConfig {
            seed: Some(21),
            data: DataConfig {
                n: 120,
                m: 15,
                noise_std: 0.1,
                redundancy_rate: 0.8,
                ..DataConfig::default()
            },
            ..RunConfig::default()
        }
    }

    #[test]
    fn compare_runs_both_on_the_same_data() {
        let out = run_selection(&config(), Evaluations { iht: true, baseline: true }).unwrap();
        assert_eq!(out.seed, 21);
        let iht = out.iht.unwrap();
        let baseline = out.baseline.unwrap();
        assert_eq!(iht.config.k, out.dataset.informative_count());
        assert_eq!(baseline.top.n_features, out.dataset.informative_count());
        assert_eq!(baseline.noise_floor.n_features, out.dataset.informative_count());
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let evals = Evaluations { iht: false, baseline: true };
        let a = run_selection(&config(), evals).unwrap();
        let b = run_selection(&config(), evals).unwrap();
        assert_eq!(a.dataset.x, b.dataset.x);
        assert_eq!(a.baseline.unwrap().scores, b.baseline.unwrap().scores);
    }

    #[test]
    fn sweep_covers_the_range_in_order() {
        let out = run_sweep(&config(), 1, Some(4)).unwrap();
        assert_eq!(out.sweep.iter().map(|e| e.k).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert!(run_sweep(&config(), 5, Some(4)).is_err());
    }
}
