//! Synthetic regression fixtures with a known sparse ground truth.
//!
//! All randomness comes from the generator passed in by the caller, so a
//! fixture is fully determined by its config and seed.

use log::info;
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand::seq::index;
use rand_distr::{Binomial, Distribution, StandardNormal};

use crate::domain::{DataConfig, DataKind, Dataset, FeatureFill};
use crate::error::{AppError, EXIT_INPUT};
use crate::math::snr_db;

/// Generate a dataset of the configured kind.
pub fn generate<R: Rng + ?Sized>(config: &DataConfig, rng: &mut R) -> Result<Dataset, AppError> {
    match config.kind {
        DataKind::Sparse => generate_sparse(config, rng),
        DataKind::Grouped => generate_grouped(config, rng),
    }
}

fn validate_common(config: &DataConfig) -> Result<(), AppError> {
    if config.n == 0 || config.m == 0 {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Dataset must have n >= 1 and m >= 1 (got n={}, m={}).", config.n, config.m),
        ));
    }
    if !(config.noise_std.is_finite() && config.noise_std >= 0.0) {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("noise_std must be finite and >= 0, got {}.", config.noise_std),
        ));
    }
    if !(0.0..=1.0).contains(&config.redundancy_rate) {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("redundancy_rate must be in [0, 1], got {}.", config.redundancy_rate),
        ));
    }
    Ok(())
}

/// Sparse data: each feature is informative with probability
/// `1 − redundancy_rate` (at least one always is).
///
/// With `poly_degree = d`, informative features come in groups of `d` holding
/// `a, a², …, a^d` for one normal draw `a` (`Normal` fill), and trailing
/// features that do not complete a group are dropped.
pub fn generate_sparse<R: Rng + ?Sized>(config: &DataConfig, rng: &mut R) -> Result<Dataset, AppError> {
    validate_common(config)?;
    let m = config.m;

    let degree = config.poly_degree.unwrap_or(1);
    if degree == 0 || degree > m {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("poly_degree must be in 1..={m}, got {degree}."),
        ));
    }

    let binomial = Binomial::new(m as u64, 1.0 - config.redundancy_rate)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid redundancy rate: {e}")))?;
    let drawn = binomial.sample(rng) as usize;
    let num = drawn.max(1).max(degree).min(m);

    let chosen = index::sample(rng, m, num).into_vec();
    let kept = &chosen[..(num / degree) * degree];

    let mut w = DVector::zeros(m);
    match config.fill {
        FeatureFill::Const => {
            for &i in kept {
                w[i] = rng.gen_range(1..4 * m) as f64;
            }
        }
        FeatureFill::Normal => {
            for group in kept.chunks(degree) {
                let base: f64 = rng.sample(StandardNormal);
                let mut value = base;
                for &i in group {
                    w[i] = value;
                    value *= base;
                }
            }
        }
    }

    let dataset = observe(config, w, None, rng);
    info!("Synthetic sparse test dataset is generated");
    log_summary(config, &dataset);
    Ok(dataset)
}

/// Grouped data: features are split into `num_groups` contiguous groups at
/// random boundaries. The first group is always informative; every other
/// group is kept with probability `1 − redundancy_rate`.
pub fn generate_grouped<R: Rng + ?Sized>(config: &DataConfig, rng: &mut R) -> Result<Dataset, AppError> {
    validate_common(config)?;
    let m = config.m;

    let groups = config.num_groups.unwrap_or(0);
    if groups < 2 {
        return Err(AppError::new(EXIT_INPUT, "The number of groups cannot be unset or less than 2."));
    }
    if m < groups + 1 {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Grouped data needs m >= num_groups + 1 (got m={m}, num_groups={groups})."),
        ));
    }

    let mut bounds: Vec<usize> = index::sample(rng, m - 2, groups - 1)
        .into_iter()
        .map(|i| i + 1)
        .collect();
    bounds.sort_unstable();
    bounds.insert(0, 0);
    bounds.push(m);

    let mut w = DVector::zeros(m);
    let mut labels = vec![0usize; m];

    for (g, span) in bounds.windows(2).enumerate() {
        let keep = g == 0 || rng.gen_bool(1.0 - config.redundancy_rate);
        if !keep {
            continue;
        }
        let range = span[0]..span[1];
        for i in range.clone() {
            labels[i] = g + 1;
        }
        match config.fill {
            FeatureFill::Const => {
                let value = rng.gen_range(1..4 * groups) as f64;
                for i in range {
                    w[i] = value;
                }
            }
            FeatureFill::Normal => {
                for i in range {
                    w[i] = rng.sample(StandardNormal);
                }
            }
        }
    }

    let dataset = observe(config, w, Some(labels), rng);
    info!("Synthetic grouped test dataset is generated ({groups} groups)");
    log_summary(config, &dataset);
    Ok(dataset)
}

/// Draw the design matrix and observations for fixed true weights.
fn observe<R: Rng + ?Sized>(
    config: &DataConfig,
    w_true: DVector<f64>,
    group_labels: Option<Vec<usize>>,
    rng: &mut R,
) -> Dataset {
    let (n, m) = (config.n, config.m);
    let features_mask = w_true.iter().map(|v| *v != 0.0).collect();

    let x = DMatrix::from_fn(n, m, |_, _| rng.sample::<f64, _>(StandardNormal));
    let y_true = &x * &w_true;
    let noise = DVector::from_fn(n, |_, _| rng.sample::<f64, _>(StandardNormal));
    let y = &y_true + noise * config.noise_std;

    Dataset {
        y,
        x,
        w_true,
        y_true,
        features_mask,
        group_labels,
    }
}

fn log_summary(config: &DataConfig, dataset: &Dataset) {
    info!(
        "Number of observations: {}, features dim. {}, number of informative features {}",
        dataset.n(),
        dataset.m(),
        dataset.informative_count()
    );
    info!("Observations SNR: {:.3} dB", snr_db(&dataset.y_true, config.noise_std));
    info!("Features fill: {:?}", config.fill);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sparse_config() -> DataConfig {
        DataConfig {
            n: 30,
            m: 20,
            noise_std: 0.0,
            redundancy_rate: 0.7,
            ..DataConfig::default()
        }
    }

    #[test]
    fn sparse_data_is_consistent() {
        let mut rng = StdRng::seed_from_u64(1);
        let ds = generate_sparse(&sparse_config(), &mut rng).unwrap();

        assert_eq!(ds.x.shape(), (30, 20));
        assert_eq!(ds.y.len(), 30);
        assert!(ds.informative_count() >= 1);
        for (i, &on) in ds.features_mask.iter().enumerate() {
            assert_eq!(on, ds.w_true[i] != 0.0);
            if on {
                // Const fill draws integers in [1, 4m).
                assert!(ds.w_true[i] >= 1.0 && ds.w_true[i] < 80.0);
                assert_eq!(ds.w_true[i].fract(), 0.0);
            }
        }
        // Noiseless: observations equal the clean signal.
        assert_eq!(ds.y, ds.y_true);
        assert_eq!(ds.y_true, &ds.x * &ds.w_true);
    }

    #[test]
    fn same_seed_same_dataset() {
        let cfg = sparse_config();
        let a = generate_sparse(&cfg, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generate_sparse(&cfg, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.x, b.x);
        assert_eq!(a.w_true, b.w_true);
    }

    #[test]
    fn full_redundancy_still_keeps_one_feature() {
        let cfg = DataConfig {
            redundancy_rate: 1.0,
            ..sparse_config()
        };
        let ds = generate_sparse(&cfg, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(ds.informative_count(), 1);
    }

    #[test]
    fn polynomial_groups_hold_powers() {
        let cfg = DataConfig {
            m: 30,
            redundancy_rate: 0.5,
            fill: FeatureFill::Normal,
            poly_degree: Some(3),
            ..sparse_config()
        };
        let ds = generate_sparse(&cfg, &mut StdRng::seed_from_u64(3)).unwrap();
        let count = ds.informative_count();
        assert!(count >= 3);
        assert_eq!(count % 3, 0);

        // Every informative magnitude is a power of some base |a|: check that the
        // product structure holds by looking for a^1, a^2, a^3 triples.
        let vals: Vec<f64> = ds.w_true.iter().copied().filter(|v| *v != 0.0).collect();
        let mut matched = 0;
        for &a in &vals {
            let has_sq = vals.iter().any(|&v| (v - a * a).abs() < 1e-12);
            let has_cube = vals.iter().any(|&v| (v - a * a * a).abs() < 1e-12);
            if has_sq && has_cube {
                matched += 1;
            }
        }
        assert!(matched >= count / 3);
    }

    #[test]
    fn grouped_data_labels_contiguous_groups() {
        let cfg = DataConfig {
            kind: DataKind::Grouped,
            m: 24,
            redundancy_rate: 0.5,
            num_groups: Some(4),
            ..sparse_config()
        };
        let ds = generate(&cfg, &mut StdRng::seed_from_u64(5)).unwrap();
        let labels = ds.group_labels.clone().unwrap();

        // The first group always survives and starts at feature 0.
        assert_eq!(labels[0], 1);
        for (i, &label) in labels.iter().enumerate() {
            assert_eq!(label != 0, ds.features_mask[i]);
        }
        // Const fill: one value per group.
        for g in 1..=4 {
            let vals: Vec<f64> = (0..24).filter(|&i| labels[i] == g).map(|i| ds.w_true[i]).collect();
            assert!(vals.windows(2).all(|p| p[0] == p[1]));
        }
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut rng = StdRng::seed_from_u64(0);
        let bad = DataConfig {
            redundancy_rate: 1.5,
            ..sparse_config()
        };
        assert!(generate_sparse(&bad, &mut rng).is_err());

        let bad = DataConfig {
            kind: DataKind::Grouped,
            num_groups: Some(1),
            ..sparse_config()
        };
        assert!(generate(&bad, &mut rng).is_err());

        let bad = DataConfig {
            poly_degree: Some(0),
            ..sparse_config()
        };
        assert!(generate_sparse(&bad, &mut rng).is_err());
    }
}
