//! statistical_tests — calibration checks for selective pivots.
//!
//! Purpose
//! -------
//! Collect goodness-of-fit routines used to validate the inference engine:
//! valid pivots are Uniform(0, 1) under the hypothesized mean, so their
//! empirical distribution over replicates is tested against the uniform.
//!
//! Key behaviors
//! -------------
//! - [`KSOutcome::uniform`](kolmogorov_smirnov::KSOutcome::uniform): the
//!   one-sample Kolmogorov–Smirnov test with an asymptotic p-value.
//! - [`validate_unit_sample`]: shared guards (non-empty, finite, within
//!   `[0, 1]`).
//! - [`KSError`] / [`KSResult`]: error surface, mapped to Python
//!   `ValueError` when the `python-bindings` feature is enabled.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use rust_selectinf::statistical_tests::{KSOutcome, KSResult};
//!
//! # fn main() -> KSResult<()> {
//! let pivots = [0.12, 0.55, 0.91, 0.33, 0.70];
//! let outcome = KSOutcome::uniform(&pivots)?;
//! assert!((0.0..=1.0).contains(&outcome.p_value()));
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod kolmogorov_smirnov;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{KSError, KSResult};
pub use self::kolmogorov_smirnov::KSOutcome;
pub use self::validation::validate_unit_sample;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_selectinf::statistical_tests::prelude::*;
//
// to import the main statistical-testing surface in a single line.

pub mod prelude {
    pub use super::errors::{KSError, KSResult};
    pub use super::kolmogorov_smirnov::KSOutcome;
}
