//! numerical_stability — barrier penalties and stable Gaussian tail terms.
//!
//! Purpose
//! -------
//! Collect the scalar numerical primitives the selection-event objectives are
//! built from: log-barriers that keep optimization variables inside their
//! feasible regions, and a tail-stable evaluation of Gaussian interval
//! log-probabilities. Centralizing them here lets the solvers assume
//! well-conditioned `f64` arithmetic away from the boundaries.
//!
//! Key behaviors
//! -------------
//! - [`barriers::CubeBarrier`]: `b(z) = log(1 + s/(λ - z)) + log(1 + s/(λ + z))`
//!   on the open box `(-λ, λ)` with analytic first and second derivatives.
//! - [`barriers::NonnegativeBarrier`]: `Σ log(1 + s/β_k)` on the open
//!   positive orthant, used for the active sign constraints.
//! - [`gaussian_interval::neg_log_interval_probability`]: `-log P` of a
//!   Gaussian interval with a Mills-ratio branch for underflowing tails.
//! - Shared tolerances ([`EIGEN_EPS`], [`BARRIER_SENTINEL`]) so downstream
//!   modules agree on truncation and infeasibility markers.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs outside a barrier's domain never panic; they produce the finite
//!   [`BARRIER_SENTINEL`] so line searches can detect and back off.
//! - Scale parameters are validated once at construction; evaluation paths
//!   are branch-light and allocation-free where possible.
//!
//! Conventions
//! -----------
//! - No logging or I/O; these helpers run inside the innermost loops of the
//!   density grid.
//!
//! Testing notes
//! -------------
//! - Each submodule checks analytic derivatives against central finite
//!   differences on interior grids and exercises the out-of-domain paths.

pub mod barriers;
pub mod gaussian_interval;

/// Eigenvalues at or below this magnitude are treated as zero when forming
/// pseudo-inverses.
pub const EIGEN_EPS: f64 = 1e-10;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::barriers::{BARRIER_SENTINEL, CubeBarrier, NonnegativeBarrier};
pub use self::gaussian_interval::{
    DEFAULT_UNDERFLOW_THRESHOLD, IntervalLogProbability, neg_log_cube_probability,
    neg_log_interval_probability, verify_underflow_threshold,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_selectinf::optimization::numerical_stability::prelude::*;
//
// to import the barrier and tail-probability surface in a single line.

pub mod prelude {
    pub use super::barriers::{BARRIER_SENTINEL, CubeBarrier, NonnegativeBarrier};
    pub use super::gaussian_interval::{
        DEFAULT_UNDERFLOW_THRESHOLD, neg_log_cube_probability, neg_log_interval_probability,
    };
}
