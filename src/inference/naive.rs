//! inference::naive — unadjusted Wald intervals and p-values.
//!
//! These ignore the selection event and are reported next to the selective
//! quantities for comparison: `obs ± z_{1−α/2}·sd` and
//! `2·(1 − Φ(|obs − null|/sd))`.
use crate::inference::{
    errors::{InferenceError, InferenceResult},
    intervals::IntervalEstimate,
    options::verify_level,
};
use statrs::distribution::{ContinuousCDF, Normal};

/// Wald interval at coverage `level`.
///
/// # Errors
/// - `InvalidLevel` for `level` outside (0, 1).
/// - `InvalidDispersion` for a non-positive or non-finite `sd`.
pub fn naive_interval(observed: f64, sd: f64, level: f64) -> InferenceResult<IntervalEstimate> {
    verify_level(level)?;
    verify_sd(sd)?;
    let z = Normal::standard().inverse_cdf(1.0 - (1.0 - level) / 2.0);
    Ok(IntervalEstimate { lower: observed - z * sd, upper: observed + z * sd, found: true })
}

/// Two-sided Wald p-value for `H0: μ = null`.
///
/// # Errors
/// - `InvalidDispersion` for a non-positive or non-finite `sd`.
/// - `InvalidNullValue` for a non-finite `null`.
pub fn naive_p_value(observed: f64, sd: f64, null: f64) -> InferenceResult<f64> {
    verify_sd(sd)?;
    if !null.is_finite() {
        return Err(InferenceError::InvalidNullValue { value: null });
    }
    let z = (observed - null).abs() / sd;
    Ok((2.0 * Normal::standard().sf(z)).clamp(0.0, 1.0))
}

// ---- Helper methods ----

fn verify_sd(sd: f64) -> InferenceResult<()> {
    if !sd.is_finite() || sd <= 0.0 {
        return Err(InferenceError::InvalidDispersion { value: sd });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Textbook Wald values.
    // - Input validation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Match standard normal quantiles.
    //
    // Given
    // -----
    // - obs = 1, sd = 2, level 0.95; null 0.
    //
    // Expect
    // ------
    // - Interval 1 ± 3.919928; p-value 2(1 − Φ(0.5)) = 0.617075.
    fn wald_values() {
        // Act
        let ci = naive_interval(1.0, 2.0, 0.95).unwrap();
        let p = naive_p_value(1.0, 2.0, 0.0).unwrap();

        // Assert
        assert_abs_diff_eq!(ci.lower, 1.0 - 3.919_928, epsilon = 1e-5);
        assert_abs_diff_eq!(ci.upper, 1.0 + 3.919_928, epsilon = 1e-5);
        assert_abs_diff_eq!(p, 0.617_075, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Reject invalid inputs.
    //
    // Given
    // -----
    // - sd = 0, level = 1, a NaN null.
    //
    // Expect
    // ------
    // - `InvalidDispersion`, `InvalidLevel`, `InvalidNullValue`.
    fn invalid_inputs_are_rejected() {
        assert_eq!(
            naive_interval(0.0, 0.0, 0.9),
            Err(InferenceError::InvalidDispersion { value: 0.0 })
        );
        assert_eq!(naive_interval(0.0, 1.0, 1.0), Err(InferenceError::InvalidLevel { value: 1.0 }));
        assert!(matches!(
            naive_p_value(0.0, 1.0, f64::NAN),
            Err(InferenceError::InvalidNullValue { .. })
        ));
    }
}
