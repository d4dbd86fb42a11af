//! inference::objective — negative log selection probability at fixed `t`.
//!
//! Purpose
//! -------
//! For one target coordinate held at a hypothesized value `t`, evaluate
//!
//! ```text
//! F(o) = ‖B_E o + off_E(t)‖²/(2τ²)                (active randomization)
//!      + C(B_{−E} o + off_{−E}(t); λ_{−E})         (inactive box term)
//!      + Σ_k log(1 + 1/o_k)                        (sign barrier, o > 0)
//!      + S(t)                                      (stage-one term, if any)
//! ```
//!
//! over the active magnitudes `o ∈ (0, ∞)^E`, with its gradient. The
//! minimum of `F` approximates `−log P(selection | t)`.
//!
//! Key behaviors
//! -------------
//! - `C` is chosen by [`InactiveCubeTerm`]: the barrier conjugate solved per
//!   coordinate by `ConjugateCubeSolver`, or the closed-form Gaussian box
//!   probability with asymptotic tails.
//! - Implements [`SmoothObjective`], so the barrier-descent minimizer can be
//!   run on it directly.
//!
//! Invariants & assumptions
//! ------------------------
//! - `F` is only evaluated at feasible points (`o > 0`); the barrier's
//!   sentinel guards the boundary otherwise.
//! - The stage term is constant in `o`; it shifts the value, never the
//!   gradient.
use crate::{
    inference::selection_map::TargetCoordinate,
    optimization::{
        barrier_descent::{EvalRequest, Evaluation, SmoothObjective, Theta},
        conjugate_cube::{ConjugateCubeOptions, ConjugateCubeSolver},
        errors::{OptError, OptResult},
        numerical_stability::{
            DEFAULT_UNDERFLOW_THRESHOLD, NonnegativeBarrier, neg_log_cube_probability,
            verify_underflow_threshold,
        },
    },
    selection::outcome::SelectionOutcome,
};
use ndarray::{Array1, ArrayView2, s};

/// How the inactive coordinates' box constraint enters the objective.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InactiveCubeTerm {
    /// Laplace approximation through the cube barrier's conjugate.
    BarrierConjugate(ConjugateCubeOptions),
    /// Exact Gaussian box probability, with the asymptotic tail branch
    /// below `underflow_threshold`.
    GaussianProbability { underflow_threshold: f64 },
}

impl InactiveCubeTerm {
    /// # Errors
    /// - Option validation errors of the chosen strategy.
    pub fn validate(&self) -> OptResult<()> {
        match self {
            InactiveCubeTerm::BarrierConjugate(options) => {
                ConjugateCubeSolver::new(*options).map(|_| ())
            }
            InactiveCubeTerm::GaussianProbability { underflow_threshold } => {
                verify_underflow_threshold(*underflow_threshold)
            }
        }
    }

    /// Probability threshold used for Gaussian interval terms (including a
    /// stage-one term) under this strategy.
    pub fn underflow_threshold(&self) -> f64 {
        match self {
            InactiveCubeTerm::BarrierConjugate(_) => DEFAULT_UNDERFLOW_THRESHOLD,
            InactiveCubeTerm::GaussianProbability { underflow_threshold } => *underflow_threshold,
        }
    }

    /// `(value, gradient)` of the term at inactive argument `arg`.
    ///
    /// # Errors
    /// - Per-coordinate solver errors (`InfeasiblePoint`,
    ///   `NumericalDivergence`) and dimension mismatches.
    pub fn evaluate(
        &self, arg: &Array1<f64>, lagrange: &Array1<f64>, randomization_scale: f64,
    ) -> OptResult<(f64, Array1<f64>)> {
        match self {
            InactiveCubeTerm::BarrierConjugate(options) => ConjugateCubeSolver::new(*options)?
                .laplace_box_term(arg, lagrange, randomization_scale),
            InactiveCubeTerm::GaussianProbability { underflow_threshold } => {
                neg_log_cube_probability(arg, lagrange, randomization_scale, *underflow_threshold)
            }
        }
    }
}

impl Default for InactiveCubeTerm {
    fn default() -> Self {
        InactiveCubeTerm::BarrierConjugate(ConjugateCubeOptions::default())
    }
}

/// Selection-event objective for one coordinate at one grid value.
#[derive(Debug, Clone)]
pub struct SelectionEventObjective<'a> {
    linear_active: ArrayView2<'a, f64>,
    linear_inactive: ArrayView2<'a, f64>,
    inactive_lagrange: &'a Array1<f64>,
    randomization_scale: f64,
    cube_term: InactiveCubeTerm,
    barrier: NonnegativeBarrier,
    offset_active: Array1<f64>,
    offset_inactive: Array1<f64>,
    stage_value: f64,
}

impl<'a> SelectionEventObjective<'a> {
    /// Objective for `target` at hypothesized value `t`.
    ///
    /// # Errors
    /// - [`OptError::DimensionMismatch`] if `target` was built from a
    ///   different outcome.
    pub fn new(
        outcome: &'a SelectionOutcome, target: &TargetCoordinate, cube_term: InactiveCubeTerm,
        t: f64,
    ) -> OptResult<Self> {
        let e = outcome.n_active();
        let p = outcome.n_variables();
        if target.slope.len() != p || target.offset_active.len() != e {
            return Err(OptError::DimensionMismatch {
                what: "target coordinate",
                expected: p,
                found: target.slope.len(),
            });
        }
        let linear = outcome.transform().linear.view();
        let (offset_active, offset_inactive) = target.offsets_at(t);
        let stage_value =
            target.stage.map_or(0.0, |stage| stage.value(t, cube_term.underflow_threshold()));
        Ok(Self {
            linear_active: linear.slice_move(s![..e, ..]),
            linear_inactive: outcome.transform().linear.slice(s![e.., ..]),
            inactive_lagrange: outcome.inactive_lagrange(),
            randomization_scale: outcome.randomization_scale(),
            cube_term,
            barrier: NonnegativeBarrier::default(),
            offset_active,
            offset_inactive,
            stage_value,
        })
    }

    /// The β-free stage-one contribution at this `t`.
    pub fn stage_value(&self) -> f64 {
        self.stage_value
    }
}

impl SmoothObjective for SelectionEventObjective<'_> {
    fn evaluate(&self, x: &Theta, request: EvalRequest) -> OptResult<Evaluation> {
        let variance = self.randomization_scale * self.randomization_scale;
        let active_arg = self.linear_active.dot(x) + &self.offset_active;
        let inactive_arg = self.linear_inactive.dot(x) + &self.offset_inactive;
        let (cube_value, cube_grad) =
            self.cube_term.evaluate(&inactive_arg, self.inactive_lagrange, self.randomization_scale)?;

        let value = request.value.then(|| {
            active_arg.dot(&active_arg) / (2.0 * variance)
                + cube_value
                + self.barrier.value(x)
                + self.stage_value
        });
        let gradient = request.gradient.then(|| {
            self.linear_active.t().dot(&active_arg) / variance
                + self.linear_inactive.t().dot(&cube_grad)
                + self.barrier.gradient(x)
        });
        Ok(Evaluation { value, gradient })
    }

    fn is_feasible(&self, x: &Theta) -> bool {
        NonnegativeBarrier::is_feasible(x)
    }
}
