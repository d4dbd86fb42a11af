//! Public API surface for feasible barrier descent.
//!
//! - [`SmoothObjective`]: trait objectives implement (value, gradient, and a
//!   feasibility predicate for the open domain the barrier protects).
//! - [`EvalRequest`] / [`Evaluation`]: flag-based evaluation request and its
//!   tagged result.
//! - [`DescentOptions`]: tolerances, iteration cap, and backtracking budgets.
//! - [`DescentOutcome`]: normalized result returned by `minimize`.
use crate::optimization::{
    barrier_descent::{
        types::{Cost, FnEvalMap, Grad, Theta},
        validation::{
            validate_value, validate_x_hat, verify_budget, verify_max_iter, verify_step,
            verify_tolerance,
        },
    },
    errors::{OptError, OptResult},
};
use argmin::core::{TerminationReason, TerminationStatus};

/// Which quantities an evaluation should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalRequest {
    pub value: bool,
    pub gradient: bool,
}

impl EvalRequest {
    pub const VALUE: Self = Self { value: true, gradient: false };
    pub const GRADIENT: Self = Self { value: false, gradient: true };
    pub const BOTH: Self = Self { value: true, gradient: true };
}

/// Result of one objective evaluation; fields are `Some` iff requested.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    pub value: Option<Cost>,
    pub gradient: Option<Grad>,
}

/// Objective minimized by [`minimize`](super::api::minimize).
///
/// Required:
/// - `evaluate(x, request)`: value and/or gradient at `x`. Must not be
///   called outside the feasible set; callers check [`is_feasible`] first.
/// - `is_feasible(x)`: `true` iff `x` lies in the open domain where the
///   barrier is finite.
///
/// Provided:
/// - `value` / `gradient`: single-quantity shorthands. An objective that
///   leaves `gradient` unset fails with `GradientNotImplemented`.
///
/// [`is_feasible`]: SmoothObjective::is_feasible
pub trait SmoothObjective {
    fn evaluate(&self, x: &Theta, request: EvalRequest) -> OptResult<Evaluation>;
    fn is_feasible(&self, x: &Theta) -> bool;

    fn value(&self, x: &Theta) -> OptResult<Cost> {
        self.evaluate(x, EvalRequest::VALUE)?.value.ok_or(OptError::MissingValue)
    }

    fn gradient(&self, x: &Theta) -> OptResult<Grad> {
        self.evaluate(x, EvalRequest::GRADIENT)?.gradient.ok_or(OptError::GradientNotImplemented)
    }
}

/// Configuration of the feasible-descent minimizer.
///
/// Fields:
/// - `tol` — stop once `|c_new − c_old| < tol·|c_old|`.
/// - `max_iter` — hard cap on outer iterations; reaching it is reported as
///   `converged = false` with the last accepted value kept.
/// - `initial_step` — first step length along the negative gradient.
/// - `feasibility_budget` — halvings allowed to re-enter the domain.
/// - `descent_budget` — halvings allowed to find a non-increasing value.
/// - `step_growth_period` — the step doubles every this many iterations.
/// - `verbose` — attach a terminal observer (behind `obs_slog`).
///
/// Default: `tol = 1e-6`, `max_iter = 200`, `initial_step = 1`, budgets 40,
/// period 4, quiet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescentOptions {
    pub tol: f64,
    pub max_iter: usize,
    pub initial_step: f64,
    pub feasibility_budget: usize,
    pub descent_budget: usize,
    pub step_growth_period: usize,
    pub verbose: bool,
}

impl DescentOptions {
    /// # Errors
    /// - `InvalidTolerance`, `InvalidMaxIter`, `InvalidStep`, or
    ///   `InvalidBudget` for the first offending field.
    pub fn new(
        tol: f64, max_iter: usize, initial_step: f64, feasibility_budget: usize,
        descent_budget: usize, step_growth_period: usize, verbose: bool,
    ) -> OptResult<Self> {
        verify_tolerance(tol)?;
        verify_max_iter(max_iter)?;
        verify_step(initial_step)?;
        verify_budget("feasibility", feasibility_budget)?;
        verify_budget("descent", descent_budget)?;
        verify_budget("step growth period", step_growth_period)?;
        Ok(Self {
            tol,
            max_iter,
            initial_step,
            feasibility_budget,
            descent_budget,
            step_growth_period,
            verbose,
        })
    }

    /// Same options with a different initial step.
    ///
    /// # Errors
    /// - [`OptError::InvalidStep`] for a non-positive or non-finite step.
    pub fn with_initial_step(self, initial_step: f64) -> OptResult<Self> {
        verify_step(initial_step)?;
        Ok(Self { initial_step, ..self })
    }
}

impl Default for DescentOptions {
    fn default() -> Self {
        Self {
            tol: 1e-6,
            max_iter: 200,
            initial_step: 1.0,
            feasibility_budget: 40,
            descent_budget: 40,
            step_growth_period: 4,
            verbose: false,
        }
    }
}

/// Canonical result returned by `minimize`.
///
/// - `x_hat`: best feasible point found.
/// - `value`: objective at `x_hat`.
/// - `converged`: `false` only when the iteration cap stopped the run.
/// - `status`: termination status rendered for diagnostics.
/// - `iterations`, `fn_evals`: argmin counters.
#[derive(Debug, Clone, PartialEq)]
pub struct DescentOutcome {
    pub x_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl DescentOutcome {
    /// Build a validated outcome from raw executor state.
    ///
    /// # Errors
    /// - `MissingMinimizer` / `InvalidMinimizer` from the point check.
    /// - `NonFiniteCost` if `value` is not finite.
    pub fn new(
        x_hat: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let x_hat = validate_x_hat(x_hat)?;
        validate_value(value)?;
        let converged = !matches!(
            termination,
            TerminationStatus::NotTerminated
                | TerminationStatus::Terminated(TerminationReason::MaxItersReached)
        );
        let status = match &termination {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            other => format!("{other:?}"),
        };
        Ok(Self { x_hat, value, converged, status, iterations: iterations as usize, fn_evals })
    }
}
