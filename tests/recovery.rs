use approx::assert_abs_diff_eq;
use fes_iht::app::pipeline::{Evaluations, run_selection, run_sweep};
use fes_iht::domain::{DataConfig, FeatureFill, RunConfig, SolverSection};
use fes_iht::error::IhtError;
use fes_iht::fit::{IhtConfig, IhtSolver, Termination, WarmStart, sweep_k};
use fes_iht::math::{mask_count, nnz};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Gaussian design with a planted support of comparable magnitudes.
fn planted(n: usize, m: usize, support: &[(usize, f64)], seed: u64) -> (DMatrix<f64>, DVector<f64>, DVector<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = DMatrix::from_fn(n, m, |_, _| rng.sample::<f64, _>(StandardNormal));
    let mut w = DVector::zeros(m);
    for &(j, v) in support {
        w[j] = v;
    }
    let y = &x * &w;
    (x, y, w)
}

#[test]
fn noiseless_recovery_with_enough_observations() {
    // n = 200 >= 5 k ln m ≈ 102 for k = 5, m = 60.
    let support = [(3, 2.0), (11, -1.5), (27, 1.0), (40, -2.5), (58, 1.75)];
    let (x, y, w) = planted(200, 60, &support, 17);

    let config = IhtConfig {
        max_iter: 500,
        tol: 1e-8,
        ..IhtConfig::with_k(5)
    };
    let fit = IhtSolver::new(config).unwrap().solve(&x, &y).unwrap();

    assert_eq!(fit.support_indices(), vec![3, 11, 27, 40, 58]);
    for j in 0..60 {
        assert_abs_diff_eq!(fit.weights[j], w[j], epsilon = 1e-4);
    }
    assert!(fit.loss < 1e-6);
}

#[test]
fn weights_never_exceed_the_budget() {
    let cfg = DataConfig {
        n: 80,
        m: 30,
        noise_std: 1.0,
        redundancy_rate: 0.7,
        fill: FeatureFill::Normal,
        ..DataConfig::default()
    };
    let ds = fes_iht::data::generate(&cfg, &mut StdRng::seed_from_u64(4)).unwrap();

    let base = IhtConfig {
        max_iter: 300,
        ..IhtConfig::default()
    };
    let ks: Vec<usize> = (1..=30).collect();
    for entry in sweep_k(&ds.x, &ds.y, &base, &ks) {
        match entry.result {
            Ok(fit) => {
                assert!(nnz(&fit.weights) <= entry.k);
                assert!(mask_count(&fit.support) <= entry.k);
                assert!(fit.iterations <= base.max_iter);
                assert!(fit.loss.is_finite());
            }
            // Non-convergence is allowed on noisy data, never a broken budget.
            Err(e) => assert!(matches!(e, IhtError::MaxIterationsExceeded { .. })),
        }
    }
}

#[test]
fn solution_warm_start_is_a_fixed_point() {
    let support = [(0, 1.0), (5, -2.0), (9, 1.5)];
    let (x, y, _) = planted(100, 12, &support, 5);
    let solver = IhtSolver::new(IhtConfig {
        tol: 1e-10,
        max_iter: 500,
        ..IhtConfig::with_k(3)
    })
    .unwrap();

    let fit = solver.solve(&x, &y).unwrap();
    let again = solver.solve_from(&x, &y, WarmStart::from(&fit)).unwrap();
    assert!(again.iterations <= 1);
    assert_eq!(again.support, fit.support);
}

#[test]
fn zero_response_stops_at_the_origin() {
    let (x, _, _) = planted(20, 6, &[], 2);
    let y = DVector::zeros(20);
    let fit = IhtSolver::new(IhtConfig::with_k(2)).unwrap().solve(&x, &y).unwrap();

    assert_eq!(fit.termination, Termination::Stationary);
    assert_eq!(fit.iterations, 0);
    assert_eq!(fit.loss, 0.0);
    assert_eq!(nnz(&fit.weights), 0);
}

#[test]
fn compare_pipeline_end_to_end() {
    let config = RunConfig {
        seed: Some(8),
        data: DataConfig {
            n: 200,
            m: 25,
            noise_std: 0.2,
            redundancy_rate: 0.8,
            ..DataConfig::default()
        },
        solver: SolverSection {
            max_iter: 300,
            ..SolverSection::default()
        },
        ..RunConfig::default()
    };
    let run = run_selection(&config, Evaluations { iht: true, baseline: true }).unwrap();
    let iht = run.iht.as_ref().unwrap();
    let baseline = run.baseline.as_ref().unwrap();

    assert!(iht.summary.r2 > 0.99);
    assert!(iht.summary.n_features <= run.dataset.informative_count());
    assert_eq!(baseline.top.n_features, run.dataset.informative_count());

    let export = fes_iht::app::to_export(&run);
    assert_eq!(export.seed, 8);
    assert_eq!(export.iht.as_ref().unwrap().support, iht.fit.support_indices());
    assert_eq!(export.truth.w_true.len(), 25);
    let json = serde_json::to_string(&export).unwrap();
    assert!(json.contains("\"tool\":\"fes\""));
}

#[test]
fn sweep_pipeline_defaults_k_max() {
    let config = RunConfig {
        seed: Some(3),
        data: DataConfig {
            n: 60,
            m: 10,
            redundancy_rate: 0.7,
            ..DataConfig::default()
        },
        ..RunConfig::default()
    };
    let run = run_sweep(&config, 1, None).unwrap();
    let expected = (2 * run.dataset.informative_count()).min(10);
    assert_eq!(run.sweep.len(), expected);
}
