//! inference::density_grid — conditional density of a target on a 1-D grid.
//!
//! Purpose
//! -------
//! For one target coordinate, evaluate the approximate log selection
//! probability `h(t) = −min_o F(o; t)` at every point of a grid of
//! hypothesized values `t`, and expose the Gaussian-tilted, normalized
//! density that the interval, pivot, and MLE routines invert.
//!
//! Key behaviors
//! -------------
//! - [`Grid::centered`]: evenly spaced points on
//!   `[obs − lower·sd, obs + upper·sd]`; the observed index is the grid
//!   point closest to `obs`.
//! - [`ConditionalDensityGrid::profile`]: one barrier-descent minimization
//!   per grid point, warm-started from the previous solution.
//! - Failure policy: a failed point (`InfeasiblePoint` /
//!   `NumericalDivergence`) takes the previous point's value, or
//!   [`FIRST_POINT_SENTINEL`] if it is the first point, and restarts the
//!   next minimization from the outcome's feasible point. More failures
//!   than the budget, or no successful point at all, raise
//!   `GridApproximationFailed`.
//! - [`DensityProfile`]: for a mean `μ`, weights
//!   `w_i = −(g_i − μ)²/(2v) + h_i`, normalized with log-sum-exp; CDF,
//!   area at the observed index, pivot, p-value, and `log Z(μ)` with its
//!   derivative.
//!
//! Invariants & assumptions
//! ------------------------
//! - Profiles are finite everywhere; failed points are filled, never left
//!   undefined.
//! - Normalized CDFs are non-decreasing in grid order and end at 1.
//!
//! Conventions
//! -----------
//! - `pivot(μ) = 1 − area(μ)` is the upper-tail probability of the
//!   observed statistic; `p_value(μ₀) = 2·min(area, 1 − area)`.
use crate::{
    inference::{
        errors::{InferenceError, InferenceResult},
        objective::{InactiveCubeTerm, SelectionEventObjective},
        options::{GridOptions, InferenceOptions},
        selection_map::{SelectionMap, TargetCoordinate},
    },
    optimization::{
        barrier_descent::{DescentOptions, minimize},
        errors::OptError,
    },
};
use ndarray::Array1;

/// Log-density assigned to a failed first grid point.
pub const FIRST_POINT_SENTINEL: f64 = -500.0;

/// Ordered grid of hypothesized target values.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    points: Array1<f64>,
    observed_index: usize,
}

impl Grid {
    /// `length` evenly spaced points on `[obs − lower·sd, obs + upper·sd]`.
    ///
    /// # Errors
    /// - `InvalidGridLength`, `InvalidHalfWidth` via [`GridOptions::new`].
    /// - `InvalidDispersion` for a non-positive or non-finite `sd`.
    pub fn centered(
        observed: f64, sd: f64, lower_half_width: f64, upper_half_width: f64, length: usize,
    ) -> InferenceResult<Self> {
        GridOptions::new(length, lower_half_width, upper_half_width, 0, false)?;
        if !sd.is_finite() || sd <= 0.0 {
            return Err(InferenceError::InvalidDispersion { value: sd });
        }
        let points = Array1::linspace(
            observed - lower_half_width * sd,
            observed + upper_half_width * sd,
            length,
        );
        let observed_index = closest_index(&points, observed);
        Ok(Self { points, observed_index })
    }

    pub fn points(&self) -> &Array1<f64> {
        &self.points
    }

    pub fn observed_index(&self) -> usize {
        self.observed_index
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Unnormalized log-density of one target on its grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityProfile {
    grid: Grid,
    log_density: Array1<f64>,
    failures: usize,
    observed: f64,
    variance: f64,
}

impl DensityProfile {
    /// Assemble a profile from precomputed log-densities.
    ///
    /// # Errors
    /// - `Selection(DimensionMismatch)` if lengths differ.
    /// - `Optimization(NumericalDivergence)` for a non-finite entry.
    /// - `InvalidDispersion` for a bad `variance`.
    pub fn new(
        grid: Grid, log_density: Array1<f64>, failures: usize, observed: f64, variance: f64,
    ) -> InferenceResult<Self> {
        if log_density.len() != grid.len() {
            return Err(crate::selection::errors::SelectionError::DimensionMismatch {
                what: "log-density profile",
                expected: grid.len(),
                found: log_density.len(),
            }
            .into());
        }
        if let Some(&value) = log_density.iter().find(|v| !v.is_finite()) {
            return Err(OptError::NumericalDivergence { value }.into());
        }
        if !variance.is_finite() || variance <= 0.0 {
            return Err(InferenceError::InvalidDispersion { value: variance });
        }
        Ok(Self { grid, log_density, failures, observed, variance })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn log_density(&self) -> &Array1<f64> {
        &self.log_density
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn observed(&self) -> f64 {
        self.observed
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Normalized grid probabilities under mean `mean`, and `log Z(mean)`.
    pub fn normalized(&self, mean: f64) -> (Array1<f64>, f64) {
        let weights = self
            .grid
            .points
            .iter()
            .zip(self.log_density.iter())
            .map(|(&g, &h)| -(g - mean).powi(2) / (2.0 * self.variance) + h)
            .collect::<Array1<f64>>();
        let max = weights.fold(f64::NEG_INFINITY, |m, &w| m.max(w));
        let shifted = weights.mapv(|w| (w - max).exp());
        let total = shifted.sum();
        (shifted / total, max + total.ln())
    }

    pub fn log_normalizer(&self, mean: f64) -> f64 {
        self.normalized(mean).1
    }

    /// `(log Z(μ), d log Z/dμ)` with `d log Z/dμ = Σ p_i (g_i − μ)/v`.
    pub fn log_normalizer_with_gradient(&self, mean: f64) -> (f64, f64) {
        let (probs, log_z) = self.normalized(mean);
        let slope = probs
            .iter()
            .zip(self.grid.points.iter())
            .map(|(&p, &g)| p * (g - mean))
            .sum::<f64>()
            / self.variance;
        (log_z, slope)
    }

    /// Normalized cumulative distribution over the grid under `mean`.
    pub fn cdf(&self, mean: f64) -> Array1<f64> {
        let (probs, _) = self.normalized(mean);
        let mut running = 0.0;
        probs.mapv(|p| {
            running += p;
            running
        })
    }

    /// Probability mass at or below the observed grid index under `mean`.
    pub fn area_at_observed(&self, mean: f64) -> f64 {
        let (probs, _) = self.normalized(mean);
        probs.iter().take(self.grid.observed_index + 1).sum::<f64>().clamp(0.0, 1.0)
    }

    /// Upper-tail pivot `1 − area(μ)`.
    pub fn pivot(&self, mean: f64) -> f64 {
        1.0 - self.area_at_observed(mean)
    }

    /// Two-sided selective p-value at `null`.
    pub fn p_value(&self, null: f64) -> f64 {
        let area = self.area_at_observed(null);
        (2.0 * area.min(1.0 - area)).clamp(0.0, 1.0)
    }
}

/// Grid evaluator for the targets of one selection map.
#[derive(Debug, Clone, Copy)]
pub struct ConditionalDensityGrid<'a> {
    map: SelectionMap<'a>,
    grid: GridOptions,
    descent: DescentOptions,
    cube_term: InactiveCubeTerm,
}

impl<'a> ConditionalDensityGrid<'a> {
    pub fn new(map: SelectionMap<'a>, options: &InferenceOptions) -> Self {
        Self { map, grid: options.grid, descent: options.descent, cube_term: options.cube_term }
    }

    pub fn map(&self) -> &SelectionMap<'a> {
        &self.map
    }

    /// Grid for `target` under the configured half-widths.
    ///
    /// # Errors
    /// See [`Grid::centered`].
    pub fn grid_for(&self, target: &TargetCoordinate) -> InferenceResult<Grid> {
        Grid::centered(
            target.observed,
            target.std_dev(),
            self.grid.lower_half_width,
            self.grid.upper_half_width,
            self.grid.grid_length,
        )
    }

    /// Log-density profile of `target`.
    ///
    /// # Errors
    /// - [`InferenceError::GridApproximationFailed`] when failures exceed the
    ///   budget or every point failed.
    /// - Structural errors (dimension mismatches, invalid options) from the
    ///   objective or minimizer.
    pub fn profile(&self, target: &TargetCoordinate) -> InferenceResult<DensityProfile> {
        let grid = self.grid_for(target)?;
        let outcome = self.map.outcome();
        let feasible = &outcome.transform().feasible_point;

        let mut log_density = Vec::with_capacity(grid.len());
        let mut failures = 0;
        let mut start = feasible.clone();
        for &t in grid.points().iter() {
            let objective = SelectionEventObjective::new(outcome, target, self.cube_term, t)?;
            match minimize(&objective, start.clone(), &self.descent) {
                Ok(out) => {
                    if !out.converged {
                        log::debug!(
                            "coordinate {}: grid point {t:.4} hit max_iter ({})",
                            target.coordinate,
                            out.status
                        );
                    }
                    log_density.push(-out.value);
                    start = if self.grid.warm_start { out.x_hat } else { feasible.clone() };
                }
                Err(
                    err @ (OptError::InfeasiblePoint { .. } | OptError::NumericalDivergence { .. }),
                ) => {
                    failures += 1;
                    log::debug!("coordinate {}: grid point {t:.4} failed: {err}", target.coordinate);
                    let filled = log_density.last().copied().unwrap_or(FIRST_POINT_SENTINEL);
                    log_density.push(filled);
                    start = feasible.clone();
                }
                Err(other) => return Err(other.into()),
            }
        }

        if failures > self.grid.failure_budget || failures == grid.len() {
            log::warn!(
                "coordinate {}: {failures} of {} grid points failed",
                target.coordinate,
                grid.len()
            );
            return Err(InferenceError::GridApproximationFailed {
                coordinate: target.coordinate,
                failures,
                grid_length: grid.len(),
            });
        }
        DensityProfile::new(
            grid,
            Array1::from(log_density),
            failures,
            target.observed,
            target.variance,
        )
    }
}

// ---- Helper methods ----

fn closest_index(points: &Array1<f64>, value: f64) -> usize {
    let mut best = 0;
    for (i, &g) in points.iter().enumerate() {
        if (g - value).abs() < (points[best] - value).abs() {
            best = i;
        }
    }
    best
}
