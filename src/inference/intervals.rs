//! inference::intervals — inverting a density profile.
//!
//! Purpose
//! -------
//! Turn a [`DensityProfile`] into the per-coordinate summaries reported to
//! users: a confidence interval by test inversion over candidate means, a
//! two-sided p-value at the null, and an approximate selective MLE with its
//! curvature-based standard error.
//!
//! Key behaviors
//! -------------
//! - [`confidence_interval`]: candidate means `obs ± sd·param_half_width`;
//!   a mean is kept when the area at the observed index lies in the band
//!   `[α/2, 1 − α/2]`. The interval spans the kept means. No kept mean gives
//!   a degenerate `(0, 0)` estimate with `found = false`.
//! - [`selective_p_value`]: `2·min(area, 1 − area)` at the null value.
//! - [`selective_mle`]: minimizes
//!   `f(μ) = μ²/(2v) − obs·μ/v + log Z(μ)` by barrier descent from `obs`,
//!   with the target variance as the initial step, then reports
//!   `SE = 1/sqrt(f''(μ̂))`.
//!
//! Invariants & assumptions
//! ------------------------
//! - A flagged interval (`found = false`) is never a zero-width interval;
//!   [`IntervalEstimate::require`] turns it into `NoIntervalFound`.
//! - `f'(μ) = (E_μ[g] − obs)/v`, so the MLE matches the observed statistic
//!   to the tilted mean of the grid.
use crate::{
    inference::{
        density_grid::DensityProfile,
        errors::{InferenceError, InferenceResult},
        hessian::calc_standard_errors,
        options::IntervalOptions,
    },
    optimization::{
        barrier_descent::{
            DescentOptions, EvalRequest, Evaluation, SmoothObjective, Theta, minimize,
        },
        errors::OptResult,
    },
};
use ndarray::{Array1, array};

/// Confidence interval from test inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalEstimate {
    pub lower: f64,
    pub upper: f64,
    /// `false` when no candidate mean met the coverage band.
    pub found: bool,
}

impl IntervalEstimate {
    /// Degenerate `(0, 0)` estimate flagged as not found.
    pub fn not_found() -> Self {
        Self { lower: 0.0, upper: 0.0, found: false }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.found && self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// The bounds, or `NoIntervalFound` for a flagged estimate.
    ///
    /// # Errors
    /// - [`InferenceError::NoIntervalFound`] when `found` is false.
    pub fn require(&self, coordinate: usize) -> InferenceResult<(f64, f64)> {
        if !self.found {
            return Err(InferenceError::NoIntervalFound { coordinate });
        }
        Ok((self.lower, self.upper))
    }
}

/// Interval by inverting the area at the observed index over candidate
/// means.
pub fn confidence_interval(profile: &DensityProfile, opts: &IntervalOptions) -> IntervalEstimate {
    let sd = profile.variance().sqrt();
    let observed = profile.observed();
    let (band_lo, band_hi) = opts.band();
    let candidates = Array1::linspace(
        observed - opts.param_half_width * sd,
        observed + opts.param_half_width * sd,
        opts.param_grid_length,
    );

    let mut bounds: Option<(f64, f64)> = None;
    for &mean in candidates.iter() {
        let area = profile.area_at_observed(mean);
        if band_lo <= area && area <= band_hi {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(mean), hi.max(mean)),
                None => (mean, mean),
            });
        }
    }
    match bounds {
        Some((lower, upper)) => IntervalEstimate { lower, upper, found: true },
        None => IntervalEstimate::not_found(),
    }
}

/// Two-sided selective p-value at `opts.null_value`.
pub fn selective_p_value(profile: &DensityProfile, opts: &IntervalOptions) -> f64 {
    profile.p_value(opts.null_value)
}

/// Approximate selective MLE.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectiveMle {
    pub estimate: f64,
    /// `1/sqrt(f''(μ̂))`; NaN when the curvature is not positive.
    pub std_error: f64,
    pub converged: bool,
    pub iterations: usize,
}

/// Approximate selective MLE of the target mean.
///
/// # Errors
/// - `Optimization(InvalidStep)` if the target variance is not a valid step.
/// - Any minimizer or finite-difference error.
pub fn selective_mle(profile: &DensityProfile, opts: &DescentOptions) -> InferenceResult<SelectiveMle> {
    let objective = MleObjective { profile };
    let opts = opts.with_initial_step(profile.variance())?;
    let out = minimize(&objective, array![profile.observed()], &opts)?;
    if !out.converged {
        log::debug!("selective MLE stopped after {} iterations: {}", out.iterations, out.status);
    }

    let gradient = |mu: &Theta| objective.slope(mu[0]);
    let se = calc_standard_errors(&gradient, &out.x_hat)?[0];
    let std_error = if se.is_finite() && se > 0.0 { se } else { f64::NAN };
    Ok(SelectiveMle {
        estimate: out.x_hat[0],
        std_error,
        converged: out.converged,
        iterations: out.iterations,
    })
}

// ---- Helper methods ----

/// `f(μ) = μ²/(2v) − obs·μ/v + log Z(μ)` over a length-1 parameter.
struct MleObjective<'a> {
    profile: &'a DensityProfile,
}

impl MleObjective<'_> {
    fn slope(&self, mean: f64) -> Array1<f64> {
        let (_, dlog_z) = self.profile.log_normalizer_with_gradient(mean);
        let v = self.profile.variance();
        array![(mean - self.profile.observed()) / v + dlog_z]
    }
}

impl SmoothObjective for MleObjective<'_> {
    fn evaluate(&self, x: &Theta, request: EvalRequest) -> OptResult<Evaluation> {
        let mean = x[0];
        let v = self.profile.variance();
        let value = request.value.then(|| {
            mean * mean / (2.0 * v) - self.profile.observed() * mean / v
                + self.profile.log_normalizer(mean)
        });
        let gradient = request.gradient.then(|| self.slope(mean));
        Ok(Evaluation { value, gradient })
    }

    fn is_feasible(&self, x: &Theta) -> bool {
        x.iter().all(|v| v.is_finite())
    }
}
