//! Top-k selection by magnitude and support masks.
//!
//! Hard thresholding keeps the `k` entries of largest absolute value and zeroes
//! the rest. The selection is deterministic: when several entries share the
//! magnitude at the `k`-th boundary, the lower index wins.
//!
//! Indices are always returned in ascending order so that two supports can be
//! compared directly.

use std::cmp::Ordering;

use nalgebra::DVector;

/// Order two entries so that "larger magnitude first, then lower index" sorts
/// to the front.
fn magnitude_order(values: &[f64], a: usize, b: usize) -> Ordering {
    values[b]
        .abs()
        .total_cmp(&values[a].abs())
        .then_with(|| a.cmp(&b))
}

/// Indices of the `k` largest-magnitude entries of `values` (ascending).
///
/// If `k >= values.len()` every index is returned.
pub fn topk_indices(values: &[f64], k: usize) -> Vec<usize> {
    let len = values.len();
    let mut idx: Vec<usize> = (0..len).collect();
    if k == 0 {
        return Vec::new();
    }
    if k < len {
        idx.select_nth_unstable_by(k - 1, |&a, &b| magnitude_order(values, a, b));
        idx.truncate(k);
    }
    idx.sort_unstable();
    idx
}

/// Hard-threshold `v` to its top-`k` entries.
///
/// Returns the thresholded vector (non-selected entries set to exactly `0.0`)
/// together with the selected indices.
pub fn topk(v: &DVector<f64>, k: usize) -> (DVector<f64>, Vec<usize>) {
    let idx = topk_indices(v.as_slice(), k);
    let mut out = DVector::zeros(v.len());
    for &i in &idx {
        out[i] = v[i];
    }
    (out, idx)
}

/// Boolean membership mask of length `m`, true exactly at `indices`.
///
/// # Panics
/// Panics if an index is out of bounds.
pub fn support_mask(m: usize, indices: &[usize]) -> Vec<bool> {
    let mut mask = vec![false; m];
    for &i in indices {
        mask[i] = true;
    }
    mask
}

/// Indices where `mask` is true (ascending).
pub fn mask_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &on)| on.then_some(i))
        .collect()
}

/// Number of active entries in a mask.
pub fn mask_count(mask: &[bool]) -> usize {
    mask.iter().filter(|&&on| on).count()
}
