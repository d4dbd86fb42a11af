//! inference — selection-adjusted intervals, p-values, and estimates.
//!
//! Purpose
//! -------
//! Condition on a randomized selection event and report, for every selected
//! coordinate, quantities that remain valid after selection: a confidence
//! interval, a two-sided p-value, a pivot, and an approximate selective MLE.
//!
//! Key behaviors
//! -------------
//! - [`selection_map`]: affine coefficients of one target coordinate, for
//!   the exact LASSO event or a two-stage (screen, then LASSO) event.
//! - [`objective`]: the barrier-smoothed selection-event objective whose
//!   minimum approximates `−log P(selection | target = t)`.
//! - [`density_grid`]: the objective minimized at every grid point, with
//!   flat-extension recovery of failed points.
//! - [`intervals`], [`naive`], [`discovery`]: test inversion, the selective
//!   MLE, unadjusted Wald quantities, and Benjamini–Hochberg.
//! - [`engine`]: the parallel per-coordinate driver.
//!
//! Invariants & assumptions
//! ------------------------
//! - Per-coordinate work shares only read-only inputs.
//! - A coordinate that fails is reported as an error in its slot and is
//!   excluded from discovery, never treated as p = 0 or p = 1.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule and use a hand-built toy
//!   outcome with one selected variable.
//! - Calibration, coverage, and two-stage pipelines are exercised in
//!   `tests/integration_selective_pipeline.rs`.

pub mod density_grid;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod hessian;
pub mod intervals;
pub mod naive;
pub mod objective;
pub mod options;
pub mod selection_map;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::engine::{SelectiveInference, TargetInference, discoveries};
pub use self::errors::{InferenceError, InferenceResult};
pub use self::options::{GridOptions, InferenceOptions, IntervalOptions};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_selectinf::inference::prelude::*;
//
// to import the inference surface in a single line.

pub mod prelude {
    pub use super::density_grid::{ConditionalDensityGrid, DensityProfile, Grid};
    pub use super::discovery::benjamini_hochberg;
    pub use super::engine::{SelectiveInference, TargetInference, discoveries};
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::intervals::{IntervalEstimate, SelectiveMle};
    pub use super::naive::{naive_interval, naive_p_value};
    pub use super::objective::{InactiveCubeTerm, SelectionEventObjective};
    pub use super::options::{GridOptions, InferenceOptions, IntervalOptions};
    pub use super::selection_map::{
        ExactSelection, SelectionMap, SelectionVariant, TargetCoordinate, TwoStageSelection,
    };
}
