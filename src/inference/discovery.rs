//! inference::discovery — Benjamini–Hochberg step-up.
//!
//! Sort the `m` p-values ascending, find the largest rank `k` with
//! `p_(k) ≤ level·k/m`, and reject the `k` smallest. No such rank means no
//! discoveries, which is not an error.
//!
//! Ties keep their input order (stable sort). Rejected hypotheses are
//! reported by their original index, ascending.
use crate::inference::{
    errors::{InferenceError, InferenceResult},
    options::verify_level,
};

/// Indices of the hypotheses rejected by BH at `level`.
///
/// # Errors
/// - `InvalidLevel` for `level` outside (0, 1).
/// - `InvalidPValue` for a p-value outside [0, 1] or NaN.
pub fn benjamini_hochberg(p_values: &[f64], level: f64) -> InferenceResult<Vec<usize>> {
    verify_level(level)?;
    if let Some((index, &value)) =
        p_values.iter().enumerate().find(|(_, p)| !(0.0..=1.0).contains(*p))
    {
        return Err(InferenceError::InvalidPValue { index, value });
    }

    let m = p_values.len();
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let rejected_count = order
        .iter()
        .enumerate()
        .rev()
        .find(|&(rank, &idx)| p_values[idx] <= level * (rank + 1) as f64 / m as f64)
        .map_or(0, |(rank, _)| rank + 1);

    let mut rejected = order[..rejected_count].to_vec();
    rejected.sort_unstable();
    Ok(rejected)
}
