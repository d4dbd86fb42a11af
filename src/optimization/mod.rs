//! optimization — barrier numerics, conjugate solver, and feasible descent.
//!
//! Purpose
//! -------
//! Provide the numerical layer the selective-inference engine runs on:
//! barrier penalties and stable Gaussian tail terms, the per-coordinate
//! barrier conjugate for inactive coordinates, and an argmin-backed
//! minimizer that stays inside an open feasible domain.
//!
//! Key behaviors
//! -------------
//! - [`numerical_stability`]: `CubeBarrier`, `NonnegativeBarrier`, and
//!   `−log P(interval)` with asymptotic tail branches.
//! - [`conjugate_cube`]: damped Newton for `max_z [z·u − b(z) − z²/(2σ²)]`
//!   per coordinate, with feasibility and descent halvings.
//! - [`barrier_descent`]: `SmoothObjective` + `minimize`, used for the
//!   active-block minimization at every grid point and for the selective MLE.
//! - [`errors`]: one error enum, [`errors::OptError`], carrying both option
//!   validation failures and the grid-point failure taxonomy
//!   (`InfeasiblePoint`, `NumericalDivergence`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Iterates never leave the open domain of the barrier they are
//!   minimizing; out-of-domain evaluations produce a finite sentinel rather
//!   than `NaN`/`∞`.
//! - Invalid configurations are rejected at construction as `OptError`.
//!
//! Conventions
//! -----------
//! - Vectors are `ndarray::Array1<f64>`; fallible entrypoints return
//!   [`errors::OptResult<T>`] and never expose raw argmin errors.
//! - Besides trace-level logging in the descent runner, this layer performs
//!   no I/O; the optional `obs_slog` observer is opt-in per run.
//!
//! Downstream usage
//! ----------------
//! - `inference::objective` composes the barriers and the conjugate solver
//!   into the selection-event objective; `inference::density_grid` calls
//!   [`barrier_descent::minimize`] once per grid point.
//!
//! Testing notes
//! -------------
//! - Submodules carry finite-difference derivative checks, monotonicity
//!   checks for the Newton iterations, and failure-path tests; integration
//!   tests exercise the whole stack through calibrated pivots.

pub mod barrier_descent;
pub mod conjugate_cube;
pub mod errors;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_selectinf::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::barrier_descent::prelude::*;
    pub use super::conjugate_cube::{ConjugateCubeOptions, ConjugateCubeSolver, CubeConjugate};
    pub use super::errors::{OptError, OptResult};
    pub use super::numerical_stability::prelude::*;
}
