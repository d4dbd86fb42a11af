//! selection::errors — error surface for the selection collaborators.
//!
//! Purpose
//! -------
//! Collect validation and fitting failures raised while producing a
//! [`SelectionOutcome`](crate::selection::outcome::SelectionOutcome): bad
//! designs or responses, malformed penalty weights, invalid randomization
//! settings, empty selections, and singular Gram blocks.
//!
//! Conventions
//! -----------
//! - Variants carry the offending index/value so `Display` output stands on
//!   its own.
//! - An empty selection is an error here (there is nothing to infer on) but
//!   callers typically treat it as "no inference to run", not as a crash.

pub type SelectionResult<T> = Result<T, SelectionError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionError {
    // ---- Data ----
    /// Design has no rows or no columns.
    EmptyDesign { rows: usize, cols: usize },
    /// Two inputs that must be conformable are not.
    DimensionMismatch { what: &'static str, expected: usize, found: usize },
    /// A data entry is NaN or infinite.
    NonFiniteData { what: &'static str, index: usize, value: f64 },

    // ---- Penalty weights ----
    /// Penalty weights must be finite and non-negative.
    InvalidPenaltyWeight { index: usize, value: f64 },
    /// Each coordinate may appear once.
    DuplicatePenaltyIndex { index: usize },
    /// Penalty weights must cover exactly the design's columns.
    PenaltyCoverage { expected: usize, found: usize },

    // ---- Randomization / tuning ----
    /// Randomization scale must be finite and > 0.
    InvalidRandomizationScale { value: f64 },
    /// Ridge term must be finite and ≥ 0.
    InvalidRidgeTerm { value: f64 },
    /// Noise level must be finite and > 0.
    InvalidNoiseLevel { value: f64 },
    /// Level must lie in (0, 1).
    InvalidLevel { value: f64 },
    /// Iteration counts and Monte Carlo draws must be positive.
    InvalidCount { name: &'static str, value: usize },

    // ---- Fit ----
    /// The randomized fit selected no variables.
    NoVariablesSelected,
    /// Stage-one screening did not reject its global null.
    ScreeningNotSignificant { p_value: f64, level: f64 },
    /// A Gram block had no usable eigen-directions.
    SingularMatrix { what: &'static str },

    // ---- Outcome ----
    /// Signs must be ±1.
    InvalidSign { index: usize, value: f64 },
    /// Active coordinates must be distinct and in range.
    InvalidActiveSet { index: usize, len: usize },
    /// Dispersion must be finite and > 0.
    InvalidDispersion { value: f64 },
}

impl std::error::Error for SelectionError {}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Data ----
            SelectionError::EmptyDesign { rows, cols } => {
                write!(f, "Design matrix must be non-empty, got {rows}×{cols}")
            }
            SelectionError::DimensionMismatch { what, expected, found } => {
                write!(f, "Dimension mismatch for {what}: expected {expected}, found {found}")
            }
            SelectionError::NonFiniteData { what, index, value } => {
                write!(f, "Non-finite {what} entry at index {index}: {value}")
            }

            // ---- Penalty weights ----
            SelectionError::InvalidPenaltyWeight { index, value } => {
                write!(f, "Invalid penalty weight for coordinate {index}: {value}, must be finite and >= 0")
            }
            SelectionError::DuplicatePenaltyIndex { index } => {
                write!(f, "Penalty weight given twice for coordinate {index}")
            }
            SelectionError::PenaltyCoverage { expected, found } => {
                write!(f, "Penalty weights must cover coordinates 0..{expected}, found {found} entries")
            }

            // ---- Randomization / tuning ----
            SelectionError::InvalidRandomizationScale { value } => {
                write!(f, "Invalid randomization scale: {value}, must be finite and > 0")
            }
            SelectionError::InvalidRidgeTerm { value } => {
                write!(f, "Invalid ridge term: {value}, must be finite and >= 0")
            }
            SelectionError::InvalidNoiseLevel { value } => {
                write!(f, "Invalid noise level: {value}, must be finite and > 0")
            }
            SelectionError::InvalidLevel { value } => {
                write!(f, "Invalid level: {value}, must lie in (0, 1)")
            }
            SelectionError::InvalidCount { name, value } => {
                write!(f, "Invalid {name}: {value}, must be greater than zero")
            }

            // ---- Fit ----
            SelectionError::NoVariablesSelected => {
                write!(f, "Randomized fit selected no variables")
            }
            SelectionError::ScreeningNotSignificant { p_value, level } => {
                write!(f, "Screening p-value {p_value} exceeds level {level}; nothing selected")
            }
            SelectionError::SingularMatrix { what } => {
                write!(f, "Matrix {what} is numerically zero")
            }

            // ---- Outcome ----
            SelectionError::InvalidSign { index, value } => {
                write!(f, "Invalid sign at active position {index}: {value}, must be ±1")
            }
            SelectionError::InvalidActiveSet { index, len } => {
                write!(f, "Invalid active coordinate {index} for {len} variables")
            }
            SelectionError::InvalidDispersion { value } => {
                write!(f, "Invalid dispersion: {value}, must be finite and > 0")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<SelectionError> for pyo3::PyErr {
    fn from(err: SelectionError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(format!("SelectionError: {err}"))
    }
}
