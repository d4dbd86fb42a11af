//! statistical_tests::validation — input guards for calibration tests.
//!
//! A sample handed to a test against Uniform(0, 1) must be non-empty,
//! finite, and contained in `[0, 1]`. Checks run in that order and report
//! the first offending value.

use crate::statistical_tests::errors::{KSError, KSResult};

/// Validate a sample of pivots or p-values.
///
/// # Errors
/// - `KSError::InsufficientData` for an empty sample.
/// - `KSError::InvalidData(value)` for a NaN or infinite entry.
/// - `KSError::OutsideUnitInterval(value)` for an entry outside `[0, 1]`.
pub fn validate_unit_sample(data: &[f64]) -> KSResult<()> {
    if data.is_empty() {
        return Err(KSError::InsufficientData);
    }

    for &value in data {
        if !value.is_finite() {
            return Err(KSError::InvalidData(value));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(KSError::OutsideUnitInterval(value));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The success path, including the closed endpoints 0 and 1.
    // - Each error branch of `validate_unit_sample`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Endpoints are valid pivot values.
    //
    // Given
    // -----
    // - [0.0, 0.5, 1.0].
    //
    // Expect
    // ------
    // - `Ok(())`.
    fn validate_unit_sample_accepts_endpoints() {
        // Arrange
        let data = [0.0, 0.5, 1.0];

        // Act
        let result = validate_unit_sample(&data);

        // Assert
        assert!(result.is_ok(), "Expected Ok(()), got {result:?}");
    }

    #[test]
    // Purpose
    // -------
    // Each malformed sample maps to its error variant.
    //
    // Given
    // -----
    // - An empty sample, a sample with NaN, a sample with −0.1.
    //
    // Expect
    // ------
    // - `InsufficientData`, `InvalidData(NaN)`, `OutsideUnitInterval(−0.1)`.
    fn validate_unit_sample_error_branches() {
        // Act & Assert
        assert_eq!(validate_unit_sample(&[]), Err(KSError::InsufficientData));
        match validate_unit_sample(&[0.2, f64::NAN]) {
            Err(KSError::InvalidData(v)) => assert!(v.is_nan()),
            other => panic!("expected InvalidData error, got {other:?}"),
        }
        assert_eq!(validate_unit_sample(&[0.2, -0.1]), Err(KSError::OutsideUnitInterval(-0.1)));
    }
}
