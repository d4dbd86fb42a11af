//! Unified error handling for selective inference.
//!
//! This module defines `InferenceError`, the error type surfaced by the
//! per-coordinate engine: option validation, the coordinate-level failure
//! taxonomy (`GridApproximationFailed`, `NoIntervalFound`), and wrappers for
//! errors raised by the optimization and selection layers. Grid-point
//! failures (`InfeasiblePoint`, `NumericalDivergence`) are recovered inside
//! the density grid and only reach this type when they are structural.
use crate::{optimization::errors::OptError, selection::errors::SelectionError};

/// Unified error type for selective inference.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Options ----
    /// Grids need at least two points.
    InvalidGridLength { value: usize },

    /// Half-widths must be finite and non-negative, with a positive span.
    InvalidHalfWidth { name: &'static str, value: f64 },

    /// Levels must lie in (0, 1).
    InvalidLevel { value: f64 },

    /// Null values must be finite.
    InvalidNullValue { value: f64 },

    // ---- Inputs ----
    /// Dispersion must be finite and > 0.
    InvalidDispersion { value: f64 },

    /// Target coordinate outside the active set.
    InvalidCoordinate { coordinate: usize, n_active: usize },

    /// p-values must lie in [0, 1].
    InvalidPValue { index: usize, value: f64 },

    // ---- Coordinate-level failures ----
    /// Too many grid points failed for one coordinate.
    GridApproximationFailed { coordinate: usize, failures: usize, grid_length: usize },

    /// No candidate mean put the observed statistic inside the coverage band.
    NoIntervalFound { coordinate: usize },

    // ---- Wrapped ----
    Optimization(OptError),
    Selection(SelectionError),
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl From<OptError> for InferenceError {
    fn from(err: OptError) -> Self {
        InferenceError::Optimization(err)
    }
}

impl From<SelectionError> for InferenceError {
    fn from(err: SelectionError) -> Self {
        InferenceError::Selection(err)
    }
}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Options ----
            InferenceError::InvalidGridLength { value } => {
                write!(f, "Inference Error: Grid length must be at least 2, got {value}")
            }
            InferenceError::InvalidHalfWidth { name, value } => write!(
                f,
                "Inference Error: Invalid {name} half-width {value}, must be finite and >= 0 with a positive span"
            ),
            InferenceError::InvalidLevel { value } => {
                write!(f, "Inference Error: Level must lie in (0, 1), got {value}")
            }
            InferenceError::InvalidNullValue { value } => {
                write!(f, "Inference Error: Null value must be finite, got {value}")
            }

            // ---- Inputs ----
            InferenceError::InvalidDispersion { value } => {
                write!(f, "Inference Error: Dispersion must be finite and > 0, got {value}")
            }
            InferenceError::InvalidCoordinate { coordinate, n_active } => write!(
                f,
                "Inference Error: Coordinate {coordinate} out of range for {n_active} selected variables"
            ),
            InferenceError::InvalidPValue { index, value } => {
                write!(f, "Inference Error: p-value {value} at index {index} outside [0, 1]")
            }

            // ---- Coordinate-level failures ----
            InferenceError::GridApproximationFailed { coordinate, failures, grid_length } => write!(
                f,
                "Inference Error: Grid approximation failed for coordinate {coordinate} ({failures} of {grid_length} points failed)"
            ),
            InferenceError::NoIntervalFound { coordinate } => {
                write!(f, "Inference Error: No confidence interval found for coordinate {coordinate}")
            }

            // ---- Wrapped ----
            InferenceError::Optimization(err) => write!(f, "Inference Error: {err}"),
            InferenceError::Selection(err) => write!(f, "Inference Error: {err}"),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<InferenceError> for pyo3::PyErr {
    fn from(err: InferenceError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(format!("InferenceError: {err}"))
    }
}
