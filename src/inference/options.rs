//! inference::options — configuration of the selective-inference engine.
//!
//! - [`GridOptions`]: the grid of hypothesized target values and the
//!   grid-point failure budget.
//! - [`IntervalOptions`]: coverage level and the candidate-mean grid used for
//!   interval inversion, plus the null value for p-values.
//! - [`InferenceOptions`]: everything above plus the inner and MLE descent
//!   options, the inactive-term strategy, and the BH level.
//!
//! Half-widths are expressed in target standard deviations.
use crate::{
    inference::{
        errors::{InferenceError, InferenceResult},
        objective::InactiveCubeTerm,
    },
    optimization::barrier_descent::DescentOptions,
};

/// Grid of hypothesized target values around the observed statistic.
///
/// Default: 301 points on `[obs − 15 sd, obs + 15 sd]`, failure budget 150,
/// warm starts on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptions {
    pub grid_length: usize,
    pub lower_half_width: f64,
    pub upper_half_width: f64,
    pub failure_budget: usize,
    pub warm_start: bool,
}

impl GridOptions {
    /// # Errors
    /// - `InvalidGridLength` for fewer than two points.
    /// - `InvalidHalfWidth` for a negative or non-finite half-width, or a
    ///   zero total span.
    pub fn new(
        grid_length: usize, lower_half_width: f64, upper_half_width: f64, failure_budget: usize,
        warm_start: bool,
    ) -> InferenceResult<Self> {
        if grid_length < 2 {
            return Err(InferenceError::InvalidGridLength { value: grid_length });
        }
        verify_half_width("lower", lower_half_width)?;
        verify_half_width("upper", upper_half_width)?;
        if lower_half_width + upper_half_width <= 0.0 {
            return Err(InferenceError::InvalidHalfWidth { name: "total", value: 0.0 });
        }
        Ok(Self { grid_length, lower_half_width, upper_half_width, failure_budget, warm_start })
    }
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            grid_length: 301,
            lower_half_width: 15.0,
            upper_half_width: 15.0,
            failure_budget: 150,
            warm_start: true,
        }
    }
}

/// Interval inversion and p-value settings.
///
/// Default: level 0.90, 301 candidate means on `obs ± 10 sd`, null 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalOptions {
    pub level: f64,
    pub param_grid_length: usize,
    pub param_half_width: f64,
    pub null_value: f64,
}

impl IntervalOptions {
    /// # Errors
    /// - `InvalidLevel`, `InvalidGridLength`, `InvalidHalfWidth`, or
    ///   `InvalidNullValue`.
    pub fn new(
        level: f64, param_grid_length: usize, param_half_width: f64, null_value: f64,
    ) -> InferenceResult<Self> {
        verify_level(level)?;
        if param_grid_length < 2 {
            return Err(InferenceError::InvalidGridLength { value: param_grid_length });
        }
        verify_half_width("parameter", param_half_width)?;
        if param_half_width == 0.0 {
            return Err(InferenceError::InvalidHalfWidth { name: "parameter", value: 0.0 });
        }
        if !null_value.is_finite() {
            return Err(InferenceError::InvalidNullValue { value: null_value });
        }
        Ok(Self { level, param_grid_length, param_half_width, null_value })
    }

    /// Lower and upper edges of the coverage band, `α/2` and `1 − α/2`.
    pub fn band(&self) -> (f64, f64) {
        let alpha = 1.0 - self.level;
        (alpha / 2.0, 1.0 - alpha / 2.0)
    }
}

impl Default for IntervalOptions {
    fn default() -> Self {
        Self { level: 0.90, param_grid_length: 301, param_half_width: 10.0, null_value: 0.0 }
    }
}

/// Full engine configuration.
///
/// Fields
/// ------
/// - `grid`: density grid settings.
/// - `descent`: inner minimization at each grid point.
/// - `mle`: descent for the selective MLE (default `tol = 1e-5`,
///   `max_iter = 150`); its initial step is replaced by the target variance
///   at run time.
/// - `intervals`: interval and p-value settings.
/// - `cube_term`: inactive-coordinate strategy.
/// - `bh_level`: Benjamini–Hochberg level (default 0.10).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceOptions {
    pub grid: GridOptions,
    pub descent: DescentOptions,
    pub mle: DescentOptions,
    pub intervals: IntervalOptions,
    pub cube_term: InactiveCubeTerm,
    pub bh_level: f64,
}

impl InferenceOptions {
    /// # Errors
    /// - `InvalidLevel` for a bad `bh_level`.
    /// - Wrapped `OptError` for an invalid `cube_term`.
    pub fn new(
        grid: GridOptions, descent: DescentOptions, mle: DescentOptions,
        intervals: IntervalOptions, cube_term: InactiveCubeTerm, bh_level: f64,
    ) -> InferenceResult<Self> {
        verify_level(bh_level)?;
        cube_term.validate()?;
        Ok(Self { grid, descent, mle, intervals, cube_term, bh_level })
    }

    /// Default MLE descent settings.
    pub fn default_mle() -> DescentOptions {
        DescentOptions { tol: 1e-5, max_iter: 150, ..DescentOptions::default() }
    }
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            grid: GridOptions::default(),
            descent: DescentOptions::default(),
            mle: Self::default_mle(),
            intervals: IntervalOptions::default(),
            cube_term: InactiveCubeTerm::default(),
            bh_level: 0.10,
        }
    }
}

// ---- Helper methods ----

pub(crate) fn verify_level(level: f64) -> InferenceResult<()> {
    if !(level > 0.0 && level < 1.0) {
        return Err(InferenceError::InvalidLevel { value: level });
    }
    Ok(())
}

fn verify_half_width(name: &'static str, value: f64) -> InferenceResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(InferenceError::InvalidHalfWidth { name, value });
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
    // - Documented defaults.
    // - Validation of grid, interval, and top-level options.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Defaults match the documented values.
    //
    // Given
    // -----
    // - `InferenceOptions::default()`.
    //
    // Expect
    // ------
    // - 301 grid points at ±15, budget 150, level 0.9 with band
    //   [0.05, 0.95], MLE tol 1e-5 and 150 iterations, BH level 0.1.
    fn defaults_are_documented_values() {
        let opts = InferenceOptions::default();
        assert_eq!(opts.grid.grid_length, 301);
        assert_eq!((opts.grid.lower_half_width, opts.grid.upper_half_width), (15.0, 15.0));
        assert_eq!(opts.grid.failure_budget, 150);
        let (lo, hi) = opts.intervals.band();
        assert!((lo - 0.05).abs() < 1e-12 && (hi - 0.95).abs() < 1e-12);
        assert_eq!((opts.mle.tol, opts.mle.max_iter), (1e-5, 150));
        assert_eq!(opts.bh_level, 0.10);
    }

    #[test]
    // Purpose
    // -------
    // Invalid settings are rejected at construction.
    //
    // Given
    // -----
    // - One-point grid, negative and zero-span half-widths, level 1, a
    //   non-finite null, BH level 0, and a bad underflow threshold.
    //
    // Expect
    // ------
    // - The matching error variants.
    fn invalid_options_are_rejected() {
        assert_eq!(
            GridOptions::new(1, 1.0, 1.0, 0, true),
            Err(InferenceError::InvalidGridLength { value: 1 })
        );
        assert!(matches!(
            GridOptions::new(10, -1.0, 1.0, 0, true),
            Err(InferenceError::InvalidHalfWidth { name: "lower", .. })
        ));
        assert!(GridOptions::new(10, 0.0, 0.0, 0, true).is_err());
        assert!(GridOptions::new(10, 0.0, 4.0, 3, false).is_ok());
        assert_eq!(
            IntervalOptions::new(1.0, 100, 5.0, 0.0),
            Err(InferenceError::InvalidLevel { value: 1.0 })
        );
        assert!(IntervalOptions::new(0.9, 100, 5.0, f64::NAN).is_err());

        let base = InferenceOptions::default();
        assert!(
            InferenceOptions::new(
                base.grid, base.descent, base.mle, base.intervals, base.cube_term, 0.0
            )
            .is_err()
        );
        assert!(matches!(
            InferenceOptions::new(
                base.grid,
                base.descent,
                base.mle,
                base.intervals,
                InactiveCubeTerm::GaussianProbability { underflow_threshold: 2.0 },
                0.1
            ),
            Err(InferenceError::Optimization(_))
        ));
    }
}
