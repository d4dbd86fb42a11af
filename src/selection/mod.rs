//! selection — randomized selection procedures and their event geometry.
//!
//! Purpose
//! -------
//! Produce the [`SelectionOutcome`](outcome::SelectionOutcome) that the
//! inference engine conditions on: which variables a randomized procedure
//! selected, with which signs, and the affine geometry relating data,
//! randomization, and optimization variables.
//!
//! Key behaviors
//! -------------
//! - [`lasso::RandomizedLasso`]: Gaussian-loss LASSO with ridge term and
//!   Gaussian randomization, solved by coordinate descent.
//! - [`simes::SimesScreening`]: randomized Simes screen used as stage one of
//!   two-step selection.
//! - [`penalty::PenaltyWeights`]: ordered, immutable per-coordinate weights.
//! - [`linalg`]: Gram-block inverses through `nalgebra`.
//!
//! Conventions
//! -----------
//! - Randomization is always drawn from a caller-supplied `rand::Rng`; every
//!   procedure also has a `*_with_randomization` form taking the draw
//!   explicitly.
//! - Errors are [`errors::SelectionError`]; the engine converts them into
//!   its own error type.

pub mod errors;
pub mod lasso;
pub mod linalg;
pub mod outcome;
pub mod penalty;
pub mod simes;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_selectinf::selection::prelude::*;
//
// to import the selection surface in a single line.

pub mod prelude {
    pub use super::errors::{SelectionError, SelectionResult};
    pub use super::lasso::{LassoFit, LassoOptions, RandomizedLasso, theoretical_lambda};
    pub use super::outcome::{OptimizationTransform, ScoreGeometry, SelectionOutcome};
    pub use super::penalty::PenaltyWeights;
    pub use super::simes::{SimesOutcome, SimesScreening};
}
