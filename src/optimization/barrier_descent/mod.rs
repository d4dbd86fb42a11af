//! barrier_descent — argmin-powered minimizer for barrier-smoothed objectives.
//!
//! Purpose
//! -------
//! Minimize smooth objectives that are finite only on an open domain (here,
//! the positive orthant of selected-coefficient magnitudes) and diverge at
//! its boundary. Callers implement one trait, [`SmoothObjective`], and call
//! [`minimize`] to run a gradient descent that never leaves the domain.
//!
//! Key behaviors
//! -------------
//! - Bridge objectives into argmin via [`adapter::ArgMinAdapter`];
//!   [`finite_diff`] supplies the numerical Hessian used for standard errors.
//! - Run [`solver::FeasibleDescent`]: step halvings first for feasibility,
//!   then for descent, with periodic step doubling.
//! - Normalize executor state into a [`DescentOutcome`] whose `converged`
//!   flag is `false` only when the iteration cap ended the run.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every accepted iterate satisfies [`SmoothObjective::is_feasible`], and
//!   accepted costs never increase.
//! - Objectives report failures as [`OptError`](crate::optimization::errors::OptError)
//!   values, never panics.
//!
//! Conventions
//! -----------
//! - The objective is a cost; no sign flips happen anywhere in this module.
//! - Evaluation requests are flag structs ([`EvalRequest`]) and results are
//!   tagged with optional fields ([`Evaluation`]).
//!
//! Downstream usage
//! ----------------
//! - `inference::density_grid` minimizes the selection-event objective at
//!   every grid point; `inference::intervals` minimizes the one-dimensional
//!   selective-MLE objective.
//!
//! Testing notes
//! -------------
//! - Unit tests cover option validation, gradient pass-through, convergence on
//!   log-barrier toys, and the failure taxonomy. The selection-event
//!   objective is exercised end to end in `tests/`.

pub mod adapter;
pub mod api;
pub mod finite_diff;
pub mod run;
pub mod solver;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::traits::{DescentOptions, DescentOutcome, EvalRequest, Evaluation, SmoothObjective};
pub use self::types::{Cost, FnEvalMap, Grad, Hessian, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_selectinf::optimization::barrier_descent::prelude::*;
//
// to import the main minimizer surface in a single line.

pub mod prelude {
    pub use super::api::minimize;
    pub use super::traits::{
        DescentOptions, DescentOutcome, EvalRequest, Evaluation, SmoothObjective,
    };
    pub use super::types::{Cost, Grad, Theta};
}
