//! statistical_tests::errors — error type for calibration tests.
//!
//! [`KSError`] covers malformed samples handed to the Kolmogorov–Smirnov
//! test: too few observations, non-finite values, and values outside the
//! unit interval. With the `python-bindings` feature it converts into a
//! Python `ValueError` carrying the `Display` message.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type KSResult<T> = Result<T, KSError>;

/// Validation failures for one-sample tests against Uniform(0, 1).
#[derive(Debug, Clone, PartialEq)]
pub enum KSError {
    //------ Input validation errors ------
    InsufficientData,
    InvalidData(f64),
    OutsideUnitInterval(f64),
}

impl std::error::Error for KSError {}

impl std::fmt::Display for KSError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KSError::InsufficientData => {
                write!(f, "Need at least 1 observation to compute the KS statistic.")
            }
            KSError::InvalidData(value) => {
                write!(f, "Invalid data value: {value}. Must be a finite number.")
            }
            KSError::OutsideUnitInterval(value) => {
                write!(f, "Data value {value} lies outside [0, 1].")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<KSError> for PyErr {
    fn from(err: KSError) -> PyErr {
        PyValueError::new_err(format!("KSError: {err}"))
    }
}
