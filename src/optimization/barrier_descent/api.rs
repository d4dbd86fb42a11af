//! High-level entry point for minimizing a [`SmoothObjective`] over its open
//! feasible domain.
//!
//! Checks the starting point, delegates to [`run_descent`], and maps the
//! failure modes onto the grid-point taxonomy callers recover from:
//! `InfeasiblePoint` and `NumericalDivergence`.
use crate::optimization::{
    barrier_descent::{
        adapter::ArgMinAdapter,
        run::run_descent,
        traits::{DescentOptions, DescentOutcome, SmoothObjective},
        types::Theta,
    },
    errors::{OptError, OptResult},
};

/// Minimize `f` starting from the feasible point `x0`.
///
/// # Behavior
/// - Rejects an infeasible `x0` with `InfeasiblePoint { attempts: 0 }`.
/// - Rejects a non-finite `c(x0)` with `NumericalDivergence`.
/// - Runs [`FeasibleDescent`](super::solver::FeasibleDescent) via
///   [`run_descent`]; hitting `max_iter` is not an error, the outcome is
///   returned with `converged = false`.
///
/// # Errors
/// - `InfeasiblePoint` when a step cannot re-enter the domain within
///   `feasibility_budget` halvings.
/// - `NumericalDivergence` when the objective is non-finite where a value
///   was required.
/// - Any error raised by `f.evaluate`.
///
/// # Example
/// ```
/// use ndarray::{Array1, array};
/// use rust_selectinf::optimization::barrier_descent::{
///     DescentOptions, EvalRequest, Evaluation, SmoothObjective, minimize,
/// };
/// use rust_selectinf::optimization::errors::OptResult;
///
/// /// `Σ (x_k − log x_k)`, minimized at x = 1.
/// struct LogBarrier;
///
/// impl SmoothObjective for LogBarrier {
///     fn evaluate(&self, x: &Array1<f64>, req: EvalRequest) -> OptResult<Evaluation> {
///         Ok(Evaluation {
///             value: req.value.then(|| x.iter().map(|&v| v - v.ln()).sum()),
///             gradient: req.gradient.then(|| x.mapv(|v| 1.0 - 1.0 / v)),
///         })
///     }
///     fn is_feasible(&self, x: &Array1<f64>) -> bool {
///         x.iter().all(|&v| v > 0.0)
///     }
/// }
///
/// let out = minimize(&LogBarrier, array![0.2, 4.0], &DescentOptions::default())?;
/// assert!((out.x_hat[0] - 1.0).abs() < 1e-2);
/// # Ok::<(), rust_selectinf::optimization::errors::OptError>(())
/// ```
pub fn minimize<F: SmoothObjective>(
    f: &F, x0: Theta, opts: &DescentOptions,
) -> OptResult<DescentOutcome> {
    if !f.is_feasible(&x0) {
        return Err(OptError::InfeasiblePoint { attempts: 0 });
    }
    let c0 = f.value(&x0)?;
    if !c0.is_finite() {
        return Err(OptError::NumericalDivergence { value: c0 });
    }
    run_descent(x0, opts, ArgMinAdapter::new(f)).map_err(|err| match err {
        OptError::NonFiniteCost { value } => OptError::NumericalDivergence { value },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::barrier_descent::traits::{EvalRequest, Evaluation};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Convergence to the minimizer of a separable log-barrier objective,
    //   including a start close to the boundary.
    // - The max-iteration caveat (`converged = false`, no error).
    // - Rejection of infeasible and non-finite starting points.
    // - Propagation of an `InfeasiblePoint` raised by a tiny budget.
    // -------------------------------------------------------------------------

    /// `Σ (a_k x_k − log x_k)`, minimized at `x_k = 1/a_k`.
    struct WeightedLogBarrier {
        a: ndarray::Array1<f64>,
    }

    impl SmoothObjective for WeightedLogBarrier {
        fn evaluate(&self, x: &Theta, req: EvalRequest) -> OptResult<Evaluation> {
            let value = req.value.then(|| {
                x.iter().zip(self.a.iter()).map(|(&v, &a)| a * v - v.ln()).sum::<f64>()
            });
            let gradient = req.gradient.then(|| {
                ndarray::Zip::from(x).and(&self.a).map_collect(|&v, &a| a - 1.0 / v)
            });
            Ok(Evaluation { value, gradient })
        }
        fn is_feasible(&self, x: &Theta) -> bool {
            x.iter().all(|&v| v > 0.0)
        }
    }

    #[test]
    // Purpose
    // -------
    // Reach the analytic minimizer from a start near the boundary.
    //
    // Given
    // -----
    // - a = [1, 0.5], x0 = [1e-3, 6], default options.
    //
    // Expect
    // ------
    // - Converged run with x̂ ≈ [1, 2] and value ≈ 2 − ln 2.
    fn minimize_reaches_log_barrier_minimizer() {
        // Arrange
        let f = WeightedLogBarrier { a: array![1.0, 0.5] };
        let opts = DescentOptions { tol: 1e-12, max_iter: 2_000, ..DescentOptions::default() };

        // Act
        let out = minimize(&f, array![1e-3, 6.0], &opts).unwrap();

        // Assert
        assert!(out.converged, "status: {}", out.status);
        assert!((out.x_hat[0] - 1.0).abs() < 1e-2, "x̂ = {:?}", out.x_hat);
        assert!((out.x_hat[1] - 2.0).abs() < 1e-2, "x̂ = {:?}", out.x_hat);
        let optimum = 1.0 + (1.0 - 2.0_f64.ln());
        assert!((out.value - optimum).abs() < 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // An exhausted iteration cap is a caveat, not an error.
    //
    // Given
    // -----
    // - max_iter = 1 from a poor start.
    //
    // Expect
    // ------
    // - `Ok` with `converged == false` and a value below the starting value.
    fn iteration_cap_returns_unconverged_outcome() {
        // Arrange
        let f = WeightedLogBarrier { a: array![1.0] };
        let opts = DescentOptions { max_iter: 1, ..DescentOptions::default() };
        let x0 = array![0.1];
        let start = f.value(&x0).unwrap();

        // Act
        let out = minimize(&f, x0, &opts).unwrap();

        // Assert
        assert!(!out.converged);
        assert!(out.value < start);
    }

    #[test]
    // Purpose
    // -------
    // Infeasible starts are rejected before the executor runs.
    //
    // Given
    // -----
    // - x0 = [−1].
    //
    // Expect
    // ------
    // - `InfeasiblePoint { attempts: 0 }`.
    fn infeasible_start_is_rejected() {
        let f = WeightedLogBarrier { a: array![1.0] };
        assert_eq!(
            minimize(&f, array![-1.0], &DescentOptions::default()),
            Err(OptError::InfeasiblePoint { attempts: 0 })
        );
    }

    #[test]
    // Purpose
    // -------
    // A feasibility budget too small for the first step surfaces
    // `InfeasiblePoint` from inside the solver.
    //
    // Given
    // -----
    // - a = [1e4], x0 = [1]: the gradient is ≈ 1e4, so the first two
    //   proposals (−9998, −4998.5) leave the domain. Feasibility budget 1.
    //
    // Expect
    // ------
    // - `InfeasiblePoint { attempts: 1 }`.
    fn tiny_feasibility_budget_is_reported() {
        // Arrange
        let f = WeightedLogBarrier { a: array![1e4] };
        let opts = DescentOptions { feasibility_budget: 1, ..DescentOptions::default() };

        // Act
        let result = minimize(&f, array![1.0], &opts);

        // Assert
        assert_eq!(result, Err(OptError::InfeasiblePoint { attempts: 1 }));
    }
}
