//! barrier_descent::finite_diff — curvature of a gradient map.
//!
//! The selective MLE has an analytic gradient in the mean but no closed-form
//! second derivative; its standard error differentiates that gradient
//! numerically with `finitediff`. Central differences are tried first, then
//! forward differences, and the result is symmetrized so it satisfies
//! [`validate_hessian`] exactly.
use crate::optimization::{
    barrier_descent::{
        types::{Grad, Hessian, Theta},
        validation::validate_hessian,
    },
    errors::OptResult,
};
use finitediff::FiniteDiff;

/// Hessian of a scalar objective from its gradient map `f`.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Gradient map `θ ↦ ∇c(θ)`, C¹ near `theta`.
/// - `theta`: `&Theta`
///   Evaluation point.
///
/// Returns
/// -------
/// `OptResult<Hessian>`
///   Finite, symmetric `n × n` matrix with `n = theta.len()`.
///
/// Notes
/// -----
/// - The central-difference validation error is dropped; only the forward
///   fallback's validation result is surfaced.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut hess = theta.central_hessian(f);
    if validate_hessian(&hess, dim).is_err() {
        hess = theta.forward_hessian(f);
        validate_hessian(&hess, dim)?;
    }
    symmetrize_hess(&mut hess);
    Ok(hess)
}

// ---- Helper methods ----

/// Average each off-diagonal pair in place; the diagonal is untouched.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
