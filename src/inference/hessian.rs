//! inference::hessian — curvature-based standard errors.
//!
//! Purpose
//! -------
//! Turn the gradient map of a scalar objective into standard errors at its
//! minimizer: the objective's Hessian is taken as the observed information,
//! and standard errors are the square roots of the diagonal of its
//! Moore–Penrose pseudoinverse. The selective MLE uses this with the
//! one-dimensional gradient `f'(μ)` of its negative log-likelihood.
//!
//! Key behaviors
//! -------------
//! - [`compute_hessian`] differentiates the gradient map.
//! - [`fill_dmatrix`] copies the `ndarray` Hessian into a `nalgebra`
//!   matrix; [`solve_for_se`] eigen-decomposes it.
//!
//! Invariants & assumptions
//! ------------------------
//! - Eigenvalues at most [`EIGEN_EPS`] are treated as zero, so flat
//!   directions get a zero contribution rather than an infinite one.
//!   Callers that need to detect a flat objective check the returned SE
//!   against zero.
//! - No explicit inverse is formed.
use crate::optimization::{
    barrier_descent::{
        finite_diff::compute_hessian,
        types::{Grad, Hessian, Theta},
    },
    errors::OptResult,
    numerical_stability::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::Array1;

/// Standard errors at `theta_hat` from the gradient map `gradient`.
///
/// # Errors
/// - Any error from [`compute_hessian`], e.g. a non-finite Hessian.
pub fn calc_standard_errors<F: Fn(&Theta) -> Grad>(
    gradient: &F, theta_hat: &Theta,
) -> OptResult<Array1<f64>> {
    let n = theta_hat.len();
    let info = compute_hessian(gradient, theta_hat)?;
    let mut info_nalg = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(&info, &mut info_nalg);
    Ok(solve_for_se(info_nalg, n))
}

// ---- Helper methods ----

/// Copy a square `ndarray` Hessian into `target`, column by column.
fn fill_dmatrix(info: &Hessian, target: &mut DMatrix<f64>) {
    for j in 0..info.ncols() {
        for i in 0..info.nrows() {
            target[(i, j)] = info[[i, j]];
        }
    }
}

/// `SE_i = sqrt(Σ_{k: λ_k > EIGEN_EPS} Q[i,k]² / λ_k)` with `J = Q Λ Qᵀ`.
fn solve_for_se(info: DMatrix<f64>, n: usize) -> Array1<f64> {
    let eigen = info.symmetric_eigen();
    let q = eigen.eigenvectors;
    Array1::from_shape_fn(n, |i| {
        eigen
            .eigenvalues
            .iter()
            .enumerate()
            .filter(|(_, lambda)| **lambda > EIGEN_EPS)
            .map(|(k, &lambda)| q[(i, k)] * q[(i, k)] / lambda)
            .sum::<f64>()
            .sqrt()
    })
}
