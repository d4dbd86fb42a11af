//! Adapter that exposes a [`SmoothObjective`] as an `argmin` problem.
//!
//! The objective is already a cost to minimize, so no sign flips happen
//! here. Objectives driven by the descent must supply an analytic gradient;
//! a value-only objective fails with `GradientNotImplemented`. Feasibility
//! is forwarded so the solver can query it through `Problem::problem` and
//! have the calls counted.
use crate::optimization::{
    barrier_descent::{
        traits::SmoothObjective,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
    errors::OptError,
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges a [`SmoothObjective`] to `argmin`'s `CostFunction` and `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: SmoothObjective> {
    pub f: &'a F,
}

impl<'a, F: SmoothObjective> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F) -> Self {
        Self { f }
    }

    /// Forwarded feasibility predicate.
    pub fn is_feasible(&self, x: &Theta) -> bool {
        self.f.is_feasible(x)
    }
}

impl<'a, F: SmoothObjective> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the objective and reject non-finite values with
    /// `NonFiniteCost`, which the solver treats as "worse than anything".
    fn cost(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(x)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(output)
    }
}

impl<'a, F: SmoothObjective> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Analytic gradient, validated for shape and finiteness.
    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, Error> {
        let g = self.f.gradient(x)?;
        validate_grad(&g, x.len())?;
        Ok(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        barrier_descent::traits::{EvalRequest, Evaluation},
        errors::OptResult,
    };
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Pass-through of analytic gradients and feasibility.
    // - `GradientNotImplemented` for value-only objectives.
    // - `NonFiniteCost` for objectives returning infinities.
    // -------------------------------------------------------------------------

    /// `Σ (x_k − log x_k)` on the positive orthant.
    struct LogBarrier {
        analytic: bool,
    }

    impl SmoothObjective for LogBarrier {
        fn evaluate(&self, x: &Theta, request: EvalRequest) -> OptResult<Evaluation> {
            let value = request.value.then(|| {
                x.iter().map(|&v| if v > 0.0 { v - v.ln() } else { f64::INFINITY }).sum()
            });
            let gradient =
                (request.gradient && self.analytic).then(|| x.mapv(|v| 1.0 - 1.0 / v));
            Ok(Evaluation { value, gradient })
        }
        fn is_feasible(&self, x: &Theta) -> bool {
            x.iter().all(|&v| v > 0.0)
        }
    }

    #[test]
    // Purpose
    // -------
    // Analytic gradients pass through; value-only objectives are rejected.
    //
    // Given
    // -----
    // - x = [0.5, 3.0], with and without an analytic gradient.
    //
    // Expect
    // ------
    // - The analytic path gives [−1, 2/3].
    // - The value-only path fails with `GradientNotImplemented`.
    fn gradient_requires_analytic_objective() {
        // Arrange
        let x = array![0.5, 3.0];
        let analytic = LogBarrier { analytic: true };
        let value_only = LogBarrier { analytic: false };

        // Act
        let g = ArgMinAdapter::new(&analytic).gradient(&x).unwrap();
        let err = ArgMinAdapter::new(&value_only).gradient(&x).unwrap_err();

        // Assert
        assert!((g[0] + 1.0).abs() < 1e-12);
        assert!((g[1] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(OptError::from(err), OptError::GradientNotImplemented);
    }

    #[test]
    // Purpose
    // -------
    // Infinite objective values are mapped to `NonFiniteCost`.
    //
    // Given
    // -----
    // - x = [−1, 1] outside the domain.
    //
    // Expect
    // ------
    // - `cost` fails with `NonFiniteCost` and `is_feasible` is false.
    fn cost_rejects_non_finite_values() {
        // Arrange
        let f = LogBarrier { analytic: true };
        let adapter = ArgMinAdapter::new(&f);
        let x = array![-1.0, 1.0];

        // Act
        let err = OptError::from(adapter.cost(&x).unwrap_err());

        // Assert
        assert!(matches!(err, OptError::NonFiniteCost { .. }));
        assert!(!adapter.is_feasible(&x));
    }
}
