//! numerical_stability::barriers — smooth barriers for box and sign constraints.
//!
//! Purpose
//! -------
//! Provide closed-form barrier functions that replace hard indicator
//! constraints inside the selection-probability objectives:
//! - [`CubeBarrier`] for the open box `(-λ, λ)` that constrains inactive
//!   subgradients, and
//! - [`NonnegativeBarrier`] for the open half-line `(0, ∞)` that constrains
//!   the magnitudes of the selected coefficients.
//!
//! Key behaviors
//! -------------
//! - With barrier scale `s > 0`, the cube barrier is
//!   `b(z) = log(1 + s/(λ - z)) + log(1 + s/(λ + z))`, and the sign barrier is
//!   `c(β) = log(1 + s/β)`.
//! - Values, gradients, and (diagonal) Hessians are analytic and finite for
//!   strictly interior arguments and diverge as the argument approaches the
//!   boundary.
//! - Outside the domain the functions return the finite
//!   [`BARRIER_SENTINEL`] (gradient signed so that a Newton step points back
//!   inside) instead of `NaN`/`Inf`, so callers can detect infeasibility and
//!   backtrack.
//!
//! Invariants & assumptions
//! ------------------------
//! - Box half-widths `λ` are validated as finite and strictly positive by the
//!   callers that own them (`ConjugateCubeSolver`, selection outcomes).
//! - All functions are pure; no allocation happens in the scalar paths.
//!
//! Testing notes
//! -------------
//! - Gradients and Hessians are checked against central finite differences
//!   at interior points for several `(λ, s)` pairs.
//! - Sentinel behavior is checked at and beyond the boundary.
use crate::optimization::errors::{OptError, OptResult};
use ndarray::Array1;

/// Large finite value reported for arguments outside a barrier's domain.
pub const BARRIER_SENTINEL: f64 = 1e10;

/// CubeBarrier — smooth barrier for the open box `(-λ, λ)`.
///
/// Purpose
/// -------
/// Approximate the indicator of `|z| < λ` by a convex function that is
/// finite inside the box and diverges at `±λ`.
///
/// Fields
/// ------
/// - `scale`: `f64`
///   Barrier scale `s` in `log(1 + s/(λ ∓ z))`. Larger values flatten the
///   barrier's interior and steepen the approach to the boundary.
///
/// Notes
/// -----
/// - `b` is even in `z`, minimized at `z = 0`, and `b''(z) > 0` everywhere
///   inside the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeBarrier {
    scale: f64,
}

impl CubeBarrier {
    /// Construct a cube barrier with the given scale.
    ///
    /// # Errors
    /// - [`OptError::InvalidBarrierScale`] if `scale` is non-finite or `<= 0`.
    pub fn new(scale: f64) -> OptResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(OptError::InvalidBarrierScale { value: scale });
        }
        Ok(Self { scale })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// `true` if `z` lies strictly inside `(-lagrange, lagrange)`.
    #[inline]
    pub fn is_interior(z: f64, lagrange: f64) -> bool {
        z.abs() < lagrange
    }

    /// Barrier value `b(z)`; [`BARRIER_SENTINEL`] outside the box.
    #[inline]
    pub fn value(&self, z: f64, lagrange: f64) -> f64 {
        if !Self::is_interior(z, lagrange) {
            return BARRIER_SENTINEL;
        }
        let lower_gap = lagrange - z;
        let upper_gap = lagrange + z;
        (self.scale / lower_gap).ln_1p() + (self.scale / upper_gap).ln_1p()
    }

    /// Barrier derivative `b'(z)`.
    ///
    /// Outside the box the sentinel is returned with the sign of `z`, so
    /// that `z - b'(z)/b''(z)` moves toward the origin.
    #[inline]
    pub fn gradient(&self, z: f64, lagrange: f64) -> f64 {
        if !Self::is_interior(z, lagrange) {
            return BARRIER_SENTINEL * z.signum();
        }
        let lower_gap = lagrange - z;
        let upper_gap = lagrange + z;
        1.0 / lower_gap - 1.0 / (lower_gap + self.scale) + 1.0 / (upper_gap + self.scale)
            - 1.0 / upper_gap
    }

    /// Barrier second derivative `b''(z)`; strictly positive inside the box.
    #[inline]
    pub fn hessian(&self, z: f64, lagrange: f64) -> f64 {
        if !Self::is_interior(z, lagrange) {
            return BARRIER_SENTINEL;
        }
        let lower_gap = lagrange - z;
        let upper_gap = lagrange + z;
        1.0 / lower_gap.powi(2) - 1.0 / (lower_gap + self.scale).powi(2)
            + 1.0 / upper_gap.powi(2)
            - 1.0 / (upper_gap + self.scale).powi(2)
    }

    /// Sum of coordinate-wise barrier values over conformable vectors.
    ///
    /// # Errors
    /// - [`OptError::DimensionMismatch`] if `z` and `lagrange` differ in length.
    pub fn total_value(&self, z: &Array1<f64>, lagrange: &Array1<f64>) -> OptResult<f64> {
        if z.len() != lagrange.len() {
            return Err(OptError::DimensionMismatch {
                what: "cube barrier argument",
                expected: lagrange.len(),
                found: z.len(),
            });
        }
        Ok(z.iter().zip(lagrange.iter()).map(|(&zi, &li)| self.value(zi, li)).sum())
    }
}

impl Default for CubeBarrier {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// NonnegativeBarrier — smooth barrier for strictly positive coordinates.
///
/// Enforces the observed sign pattern on the selected coefficients, which
/// are parametrized by their magnitudes `β_E > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonnegativeBarrier {
    scale: f64,
}

impl NonnegativeBarrier {
    /// # Errors
    /// - [`OptError::InvalidBarrierScale`] if `scale` is non-finite or `<= 0`.
    pub fn new(scale: f64) -> OptResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(OptError::InvalidBarrierScale { value: scale });
        }
        Ok(Self { scale })
    }

    #[inline]
    pub fn is_feasible(beta: &Array1<f64>) -> bool {
        beta.iter().all(|&b| b > 0.0)
    }

    /// `Σ log(1 + s/β_k)`, with one sentinel per non-positive coordinate.
    pub fn value(&self, beta: &Array1<f64>) -> f64 {
        beta.iter()
            .map(|&b| if b > 0.0 { (self.scale / b).ln_1p() } else { BARRIER_SENTINEL })
            .sum()
    }

    /// `1/(β + s) - 1/β` coordinate-wise; `-sentinel` at non-positive entries.
    pub fn gradient(&self, beta: &Array1<f64>) -> Array1<f64> {
        beta.mapv(|b| if b > 0.0 { 1.0 / (b + self.scale) - 1.0 / b } else { -BARRIER_SENTINEL })
    }
}

impl Default for NonnegativeBarrier {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}
