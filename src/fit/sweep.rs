//! Solve the same problem for several support sizes in parallel.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::error::IhtError;
use crate::fit::iht::{IhtConfig, IhtFit, solve};

/// Result of one support size.
#[derive(Debug, Clone)]
pub struct SweepEntry {
    pub k: usize,
    pub result: Result<IhtFit, IhtError>,
}

/// Run IHT once per `k` in `ks`, sharing every other option with `base`.
///
/// Each solve is independent; entries come back in the order of `ks`.
pub fn sweep_k(x: &DMatrix<f64>, y: &DVector<f64>, base: &IhtConfig, ks: &[usize]) -> Vec<SweepEntry> {
    ks.par_iter()
        .map(|&k| {
            let config = IhtConfig { k, ..base.clone() };
            SweepEntry {
                k,
                result: solve(x, y, &config),
            }
        })
        .collect()
}
