//! optimization::errors — failures of the barrier numerics and descent.
//!
//! [`OptError`] separates two kinds of failure. Option and shape errors are
//! caller mistakes and end the run. `InfeasiblePoint` and
//! `NumericalDivergence` belong to a single grid point; the density grid
//! recovers from them by flat extension.
//!
//! Errors raised inside the argmin executor come back as
//! `argmin::core::Error`; [`From`] first recovers an `OptError` that
//! travelled through it and otherwise keeps the backend message.

use argmin::core::Error;

/// Result alias for the optimization layer.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// The objective does not supply an analytic gradient.
    GradientNotImplemented,
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- Solver options ----
    InvalidTolerance {
        tol: f64,
        reason: &'static str,
    },
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    InvalidStep {
        step: f64,
        reason: &'static str,
    },
    /// Backtracking budgets must be positive.
    InvalidBudget {
        name: &'static str,
        value: usize,
    },

    // ---- Barrier geometry ----
    /// Box half-width `λ_k` of inactive coordinate `index`.
    InvalidLagrange {
        index: usize,
        value: f64,
    },
    InvalidBarrierScale {
        value: f64,
    },
    InvalidRandomizationScale {
        value: f64,
    },
    /// Must lie in (0, 1).
    InvalidUnderflowThreshold {
        value: f64,
    },
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    // ---- Cost function ----
    NonFiniteCost {
        value: f64,
    },
    /// Evaluation did not produce the requested value.
    MissingValue,

    // ---- Grid-point failures ----
    /// Backtracking could not find a feasible proposal within its budget.
    InfeasiblePoint {
        attempts: usize,
    },
    /// Objective is non-finite after the inner solve completed.
    NumericalDivergence {
        value: f64,
    },

    // ---- Descent outcome ----
    /// Non-finite entry in the returned minimizer.
    InvalidMinimizer {
        index: usize,
        value: f64,
        reason: &'static str,
    },
    MissingMinimizer,

    // ---- Curvature ----
    HessianDimMismatch {
        expected: usize,
        found: (usize, usize),
    },
    InvalidHessian {
        row: usize,
        col: usize,
        value: f64,
    },

    // ---- Executor ----
    /// Any other error raised inside the argmin executor.
    Backend {
        text: String,
    },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Objective does not provide an analytic gradient")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- Solver options ----
            OptError::InvalidTolerance { tol, reason } => {
                write!(f, "Invalid relative tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::InvalidStep { step, reason } => {
                write!(f, "Invalid initial step {step}: {reason}")
            }
            OptError::InvalidBudget { name, value } => {
                write!(f, "Invalid {name} budget {value}: must be greater than zero")
            }

            // ---- Barrier geometry ----
            OptError::InvalidLagrange { index, value } => {
                write!(f, "Invalid box half-width at index {index}: {value}, must be finite and > 0")
            }
            OptError::InvalidBarrierScale { value } => {
                write!(f, "Invalid barrier scale: {value}, must be finite and > 0")
            }
            OptError::InvalidRandomizationScale { value } => {
                write!(f, "Invalid randomization scale: {value}, must be finite and > 0")
            }
            OptError::InvalidUnderflowThreshold { value } => {
                write!(f, "Invalid underflow threshold: {value}, must lie in (0, 1)")
            }
            OptError::DimensionMismatch { what, expected, found } => {
                write!(f, "Dimension mismatch for {what}: expected {expected}, found {found}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::MissingValue => {
                write!(f, "Objective evaluation did not return a value")
            }

            // ---- Grid-point failures ----
            OptError::InfeasiblePoint { attempts } => {
                write!(f, "No feasible proposal found after {attempts} step halvings")
            }
            OptError::NumericalDivergence { value } => {
                write!(f, "Objective diverged to {value} after the inner solve")
            }

            // ---- Descent outcome ----
            OptError::InvalidMinimizer { index, value, reason } => {
                write!(f, "Invalid minimizer at index {index}: {value}: {reason}")
            }
            OptError::MissingMinimizer => {
                write!(f, "Descent finished without a minimizer")
            }

            // ---- Curvature ----
            OptError::HessianDimMismatch { expected, found } => {
                write!(
                    f,
                    "Hessian dimension mismatch: expected ({expected}, {expected}), found {found:?}"
                )
            }
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Invalid Hessian at ({row}, {col}): {value}, must be finite")
            }

            // ---- Executor ----
            OptError::Backend { text } => {
                write!(f, "Descent backend error: {text}")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        match err.downcast::<OptError>() {
            Ok(opt_err) => opt_err,
            Err(other) => OptError::Backend { text: other.to_string() },
        }
    }
}
