//! Small dense helpers on top of `nalgebra` used by the IHT iteration.

use nalgebra::{DMatrix, DVector};

/// `X[:, cols] · v[cols]` without materializing the column subset.
pub fn mul_columns(x: &DMatrix<f64>, v: &DVector<f64>, cols: &[usize]) -> DVector<f64> {
    let mut out = DVector::zeros(x.nrows());
    for &j in cols {
        let vj = v[j];
        if vj != 0.0 {
            out.axpy(vj, &x.column(j), 1.0);
        }
    }
    out
}

/// Squared Euclidean norm of `v[cols]`.
pub fn norm_squared_on(v: &DVector<f64>, cols: &[usize]) -> f64 {
    cols.iter().map(|&j| v[j] * v[j]).sum()
}

/// Infinity norm (largest absolute entry); `0.0` for an empty vector.
pub fn inf_norm(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

/// Number of non-zero entries.
pub fn nnz(v: &DVector<f64>) -> usize {
    v.iter().filter(|x| **x != 0.0).count()
}
