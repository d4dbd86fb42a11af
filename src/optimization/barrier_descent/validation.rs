//! Validation helpers for the feasible-descent minimizer.
//!
//! - **Option checks**: [`verify_tolerance`], [`verify_max_iter`],
//!   [`verify_step`], [`verify_budget`] reject configurations the solver
//!   cannot run with.
//! - **Derivative checks**: [`validate_grad`], [`validate_hessian`] enforce
//!   shape and finiteness.
//! - **Outcome checks**: [`validate_x_hat`], [`validate_value`] guard what is
//!   handed back to callers.
use crate::optimization::{
    barrier_descent::types::{Grad, Hessian, Theta},
    errors::{OptError, OptResult},
};

/// Relative tolerance must be finite and strictly positive.
///
/// # Errors
/// Returns [`OptError::InvalidTolerance`] otherwise.
pub fn verify_tolerance(tol: f64) -> OptResult<()> {
    if !tol.is_finite() {
        return Err(OptError::InvalidTolerance { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(OptError::InvalidTolerance { tol, reason: "Tolerance must be positive." });
    }
    Ok(())
}

/// # Errors
/// Returns [`OptError::InvalidMaxIter`] when `max_iter == 0`.
pub fn verify_max_iter(max_iter: usize) -> OptResult<()> {
    if max_iter == 0 {
        return Err(OptError::InvalidMaxIter {
            max_iter,
            reason: "Maximum iterations must be greater than zero.",
        });
    }
    Ok(())
}

/// Initial step must be finite and strictly positive.
///
/// # Errors
/// Returns [`OptError::InvalidStep`] otherwise.
pub fn verify_step(step: f64) -> OptResult<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(OptError::InvalidStep { step, reason: "Step must be finite and positive." });
    }
    Ok(())
}

/// # Errors
/// Returns [`OptError::InvalidBudget`] when `value == 0`.
pub fn verify_budget(name: &'static str, value: usize) -> OptResult<()> {
    if value == 0 {
        return Err(OptError::InvalidBudget { name, value });
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if `grad.len() != dim`.
/// - [`OptError::InvalidGradient`] for the first non-finite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    if let Some((index, &value)) = grad.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::InvalidGradient {
            index,
            value,
            reason: "Gradient elements must be finite.",
        });
    }
    Ok(())
}

/// Unwrap the best point reported by the executor.
///
/// # Errors
/// - [`OptError::MissingMinimizer`] if the executor kept no point.
/// - [`OptError::InvalidMinimizer`] for the first non-finite entry.
pub fn validate_x_hat(x_hat: Option<Theta>) -> OptResult<Theta> {
    let x_hat = x_hat.ok_or(OptError::MissingMinimizer)?;
    if let Some((index, &value)) = x_hat.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::InvalidMinimizer {
            index,
            value,
            reason: "Optimization variables must be finite.",
        });
    }
    Ok(x_hat)
}

/// # Errors
/// Returns [`OptError::NonFiniteCost`] if `value` is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

/// Validate a `dim × dim` matrix with finite entries.
///
/// # Errors
/// - [`OptError::HessianDimMismatch`] for a wrong shape.
/// - [`OptError::InvalidHessian`] with the first offending position.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(OptError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    for ((row, col), &value) in hessian.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidHessian { row, col, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Rejection of zero budgets, zero iterations, and bad tolerances/steps.
    // - First-offender reporting for gradients and outcome vectors.
    // - Shape checks for Hessians.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Confirm the option validators accept sane values and reject bad ones.
    //
    // Given
    // -----
    // - tol ∈ {1e-6, 0, NaN}, step ∈ {1, -1}, budgets {40, 0}, max_iter {0}.
    //
    // Expect
    // ------
    // - Only the sane values pass.
    fn option_validators_accept_and_reject() {
        assert!(verify_tolerance(1e-6).is_ok());
        assert!(verify_tolerance(0.0).is_err());
        assert!(verify_tolerance(f64::NAN).is_err());
        assert!(verify_step(1.0).is_ok());
        assert!(verify_step(-1.0).is_err());
        assert!(verify_budget("descent", 40).is_ok());
        assert_eq!(
            verify_budget("feasibility", 0),
            Err(OptError::InvalidBudget { name: "feasibility", value: 0 })
        );
        assert!(verify_max_iter(0).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Check the first non-finite gradient entry is the one reported.
    //
    // Given
    // -----
    // - grad = [0, NaN, inf] with dim 3, and a length mismatch case.
    //
    // Expect
    // ------
    // - `InvalidGradient { index: 1, .. }` and `GradientDimMismatch`.
    fn validate_grad_reports_first_offender() {
        // Arrange
        let grad = array![0.0, f64::NAN, f64::INFINITY];

        // Act
        let err = validate_grad(&grad, 3).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::InvalidGradient { index: 1, .. }));
        assert_eq!(
            validate_grad(&array![1.0], 2),
            Err(OptError::GradientDimMismatch { expected: 2, found: 1 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Guard the outcome vector.
    //
    // Given
    // -----
    // - `None`, a vector with `-inf`, and a finite vector.
    //
    // Expect
    // ------
    // - `MissingMinimizer`, `InvalidMinimizer`, and `Ok` respectively.
    fn validate_x_hat_guards_outcome() {
        assert_eq!(validate_x_hat(None), Err(OptError::MissingMinimizer));
        assert!(matches!(
            validate_x_hat(Some(array![1.0, f64::NEG_INFINITY])),
            Err(OptError::InvalidMinimizer { index: 1, .. })
        ));
        assert_eq!(validate_x_hat(Some(array![0.5])), Ok(array![0.5]));
    }

    #[test]
    // Purpose
    // -------
    // Reject non-square matrices.
    //
    // Given
    // -----
    // - A 2×3 zero matrix checked against dim 2.
    //
    // Expect
    // ------
    // - `HessianDimMismatch { expected: 2, found: (2, 3) }`.
    fn validate_hessian_checks_shape() {
        let h = Array2::<f64>::zeros((2, 3));
        assert_eq!(
            validate_hessian(&h, 2),
            Err(OptError::HessianDimMismatch { expected: 2, found: (2, 3) })
        );
    }
}
