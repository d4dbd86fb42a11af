//! optimization::conjugate_cube — barrier conjugate on inactive coordinates.
//!
//! Purpose
//! -------
//! Compute, for each inactive coordinate, the convex conjugate
//!
//! ```text
//! h(u) = max_z [ z·u − b(z) − z²/(2σ²) ],   |z| < λ
//! ```
//!
//! where `b` is the [`CubeBarrier`] on `(−λ, λ)` and `σ²` the randomization
//! variance. Folding `h` into the selection-event objective replaces the
//! integral of the Gaussian randomization over the subgradient box by its
//! barrier-smoothed Laplace approximation.
//!
//! Key behaviors
//! -------------
//! - Per-coordinate damped Newton on `g(z) = b(z) + z²/(2σ²) − z·u` with two
//!   nested halvings: first until the proposal is strictly inside the box,
//!   then until `g` does not increase.
//! - The step doubles every fourth outer iteration so long runs do not get
//!   stuck in a small-step regime.
//! - Stops when the relative decrease of `g` falls below `tol`, when the
//!   descent backtracking budget is exhausted at an interior point, or at
//!   `max_iter`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every iterate, and hence every returned maximizer, lies strictly
//!   inside `(−λ, λ)`.
//! - Accepted iterates never increase `g`, so the recorded conjugate values
//!   `h = −g` are non-decreasing.
//! - `λ > 0` and `σ² > 0` are validated on entry.
//!
//! Conventions
//! -----------
//! - Errors follow the grid-point taxonomy: [`OptError::InfeasiblePoint`]
//!   when the feasibility budget runs out, [`OptError::NumericalDivergence`]
//!   when the objective is non-finite at an iterate.
//!
//! Downstream usage
//! ----------------
//! - `inference::objective` calls [`ConjugateCubeSolver::laplace_box_term`]
//!   with the inactive image of the active optimization variables.
use crate::optimization::{
    errors::{OptError, OptResult},
    numerical_stability::barriers::CubeBarrier,
};
use ndarray::Array1;

const STEP_GROWTH_PERIOD: usize = 4;

/// Tuning knobs for the per-coordinate Newton solve.
///
/// Fields
/// ------
/// - `tol`: relative decrease below which the solve stops (default 1e-10).
/// - `max_iter`: outer Newton iterations per coordinate (default 100).
/// - `feasibility_budget`: halvings allowed to re-enter the box (default 40).
/// - `descent_budget`: halvings allowed to find a non-increasing value
///   (default 20).
/// - `barrier_scale`: scale `s` of the cube barrier (default 1).
/// - `record_history`: keep the conjugate value after every accepted step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConjugateCubeOptions {
    pub tol: f64,
    pub max_iter: usize,
    pub feasibility_budget: usize,
    pub descent_budget: usize,
    pub barrier_scale: f64,
    pub record_history: bool,
}

impl ConjugateCubeOptions {
    /// Validated constructor.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolerance`] for a non-positive or non-finite `tol`.
    /// - [`OptError::InvalidMaxIter`] for `max_iter == 0`.
    /// - [`OptError::InvalidBudget`] for a zero backtracking budget.
    /// - [`OptError::InvalidBarrierScale`] for a non-positive scale.
    pub fn new(
        tol: f64, max_iter: usize, feasibility_budget: usize, descent_budget: usize,
        barrier_scale: f64, record_history: bool,
    ) -> OptResult<Self> {
        if !tol.is_finite() || tol <= 0.0 {
            return Err(OptError::InvalidTolerance { tol, reason: "must be finite and > 0" });
        }
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter { max_iter, reason: "must be greater than zero" });
        }
        if feasibility_budget == 0 {
            return Err(OptError::InvalidBudget { name: "feasibility", value: feasibility_budget });
        }
        if descent_budget == 0 {
            return Err(OptError::InvalidBudget { name: "descent", value: descent_budget });
        }
        CubeBarrier::new(barrier_scale)?;
        Ok(Self { tol, max_iter, feasibility_budget, descent_budget, barrier_scale, record_history })
    }
}

impl Default for ConjugateCubeOptions {
    fn default() -> Self {
        Self {
            tol: 1e-10,
            max_iter: 100,
            feasibility_budget: 40,
            descent_budget: 20,
            barrier_scale: 1.0,
            record_history: false,
        }
    }
}

/// Solution of one coordinate's conjugate problem.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeConjugate {
    /// Maximizer `z*`, strictly inside the box.
    pub maximizer: f64,
    /// Conjugate value `h(u)`.
    pub value: f64,
    pub iterations: usize,
    /// Conjugate value at the start and after every accepted step, when
    /// requested.
    pub history: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConjugateCubeSolver {
    barrier: CubeBarrier,
    options: ConjugateCubeOptions,
}

impl ConjugateCubeSolver {
    /// # Errors
    /// - [`OptError::InvalidBarrierScale`] if the options carry a bad scale.
    pub fn new(options: ConjugateCubeOptions) -> OptResult<Self> {
        let barrier = CubeBarrier::new(options.barrier_scale)?;
        Ok(Self { barrier, options })
    }

    pub fn options(&self) -> &ConjugateCubeOptions {
        &self.options
    }

    /// Solve `max_z [z·u − b(z) − z²/(2σ²)]` on one coordinate.
    ///
    /// Parameters
    /// ----------
    /// - `u`: `f64`
    ///   Linear conjugate argument.
    /// - `lagrange`: `f64`
    ///   Box half-width `λ > 0`.
    /// - `variance`: `f64`
    ///   Randomization variance `σ² > 0`.
    /// - `initial`: `Option<f64>`
    ///   Warm start; ignored unless strictly inside the box.
    ///
    /// Returns
    /// -------
    /// `OptResult<CubeConjugate>`
    ///
    /// Errors
    /// ------
    /// - `InvalidLagrange` / `InvalidRandomizationScale` for bad geometry.
    /// - `InfeasiblePoint` if no interior proposal is found within
    ///   `feasibility_budget` halvings.
    /// - `NumericalDivergence` if the objective turns non-finite.
    pub fn solve_coordinate(
        &self, u: f64, lagrange: f64, variance: f64, initial: Option<f64>,
    ) -> OptResult<CubeConjugate> {
        if !lagrange.is_finite() || lagrange <= 0.0 {
            return Err(OptError::InvalidLagrange { index: 0, value: lagrange });
        }
        if !variance.is_finite() || variance <= 0.0 {
            return Err(OptError::InvalidRandomizationScale { value: variance });
        }
        if !u.is_finite() {
            return Err(OptError::NumericalDivergence { value: u });
        }

        let opts = &self.options;
        let objective = |z: f64| self.barrier.value(z, lagrange) + z * z / (2.0 * variance) - z * u;

        let mut z = initial.filter(|&z0| CubeBarrier::is_interior(z0, lagrange)).unwrap_or(0.0);
        let mut current = objective(z);
        let mut step = 1.0;
        let mut history = Vec::new();
        if opts.record_history {
            history.push(-current);
        }

        let mut iterations = 0;
        while iterations < opts.max_iter {
            iterations += 1;
            let slope = self.barrier.gradient(z, lagrange) + z / variance - u;
            let curvature = self.barrier.hessian(z, lagrange) + 1.0 / variance;
            let direction = slope / curvature;

            let mut proposal = z - step * direction;
            let mut halvings = 0;
            while !CubeBarrier::is_interior(proposal, lagrange) {
                if halvings == opts.feasibility_budget {
                    return Err(OptError::InfeasiblePoint { attempts: halvings });
                }
                step *= 0.5;
                halvings += 1;
                proposal = z - step * direction;
            }

            let mut proposed = objective(proposal);
            let mut halvings = 0;
            let mut improved = true;
            while !(proposed <= current) {
                if halvings == opts.descent_budget {
                    improved = false;
                    break;
                }
                step *= 0.5;
                halvings += 1;
                proposal = z - step * direction;
                proposed = objective(proposal);
            }
            if !improved {
                if !current.is_finite() {
                    return Err(OptError::NumericalDivergence { value: current });
                }
                break;
            }

            let decrease = current - proposed;
            z = proposal;
            current = proposed;
            if opts.record_history {
                history.push(-current);
            }
            if decrease <= opts.tol * current.abs() {
                break;
            }
            if iterations % STEP_GROWTH_PERIOD == 0 {
                step *= 2.0;
            }
        }

        if !current.is_finite() {
            return Err(OptError::NumericalDivergence { value: current });
        }
        Ok(CubeConjugate { maximizer: z, value: -current, iterations, history })
    }

    /// Negative log box mass of the inactive randomization, barrier form.
    ///
    /// For each coordinate `k` with argument `a_k` this is
    /// `min_z [(a_k + z)²/(2τ²) + b(z)] = a_k²/(2τ²) − h(−a_k/τ²)`, summed
    /// over coordinates. By the envelope theorem the gradient is
    /// `(a_k + z_k*)/τ²`.
    ///
    /// Returns `(value, gradient)`.
    ///
    /// # Errors
    /// - [`OptError::DimensionMismatch`] if `arg` and `lagrange` differ.
    /// - [`OptError::InvalidRandomizationScale`] for a non-positive `τ`.
    /// - Any per-coordinate error from [`Self::solve_coordinate`], with the
    ///   offending index recorded on `InvalidLagrange`.
    pub fn laplace_box_term(
        &self, arg: &Array1<f64>, lagrange: &Array1<f64>, randomization_scale: f64,
    ) -> OptResult<(f64, Array1<f64>)> {
        if arg.len() != lagrange.len() {
            return Err(OptError::DimensionMismatch {
                what: "inactive conjugate argument",
                expected: lagrange.len(),
                found: arg.len(),
            });
        }
        if !randomization_scale.is_finite() || randomization_scale <= 0.0 {
            return Err(OptError::InvalidRandomizationScale { value: randomization_scale });
        }
        let variance = randomization_scale * randomization_scale;
        let mut total = 0.0;
        let mut grad = Array1::<f64>::zeros(arg.len());
        for (k, (&a, &l)) in arg.iter().zip(lagrange.iter()).enumerate() {
            let solved = self.solve_coordinate(-a / variance, l, variance, None).map_err(|e| match e {
                OptError::InvalidLagrange { value, .. } => OptError::InvalidLagrange { index: k, value },
                other => other,
            })?;
            total += a * a / (2.0 * variance) - solved.value;
            grad[k] = (a + solved.maximizer) / variance;
        }
        Ok((total, grad))
    }
}

impl Default for ConjugateCubeSolver {
    fn default() -> Self {
        Self { barrier: CubeBarrier::default(), options: ConjugateCubeOptions::default() }
    }
}
