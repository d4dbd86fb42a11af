//! inference::engine — per-coordinate selective inference.
//!
//! Purpose
//! -------
//! Drive the whole pipeline for a fitted selection: build the selection map,
//! profile each selected coordinate on its grid, and invert the profile into
//! an interval, p-value, pivot, and selective MLE, with the naive Wald
//! quantities alongside.
//!
//! Key behaviors
//! -------------
//! - [`SelectiveInference::run`] processes coordinates in parallel with
//!   `rayon`. Coordinates share only read-only inputs.
//! - One coordinate failing (for example `GridApproximationFailed`) leaves
//!   the others untouched; its entry in the result vector is the error.
//! - [`discoveries`] runs Benjamini–Hochberg over the coordinates that
//!   succeeded. Failed coordinates are excluded from the family.
//!   [`SelectiveInference::discoveries`] does the same at
//!   `options.bh_level`.
//! - `estimate_in_interval` records whether the selective MLE lies inside
//!   the selective interval; a miss is logged at `warn`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Results are ordered by active position.
//! - Dispersion defaults to the value stored on the outcome.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use rust_selectinf::inference::prelude::*;
//! # fn demo(outcome: &rust_selectinf::selection::outcome::SelectionOutcome) -> InferenceResult<()> {
//! let engine = SelectiveInference::default();
//! let results = engine.run(outcome, &ExactSelection, None)?;
//! let selected = engine.discoveries(&results)?;
//! # let _ = selected;
//! # Ok(())
//! # }
//! ```
use crate::{
    inference::{
        density_grid::{ConditionalDensityGrid, DensityProfile},
        discovery::benjamini_hochberg,
        errors::InferenceResult,
        intervals::{IntervalEstimate, confidence_interval, selective_mle, selective_p_value},
        naive::{naive_interval, naive_p_value},
        options::InferenceOptions,
        selection_map::{SelectionMap, SelectionVariant},
    },
    selection::outcome::SelectionOutcome,
};
use rayon::prelude::*;

/// Inference summary for one selected coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetInference {
    /// Position in the active set.
    pub coordinate: usize,
    /// Original variable index.
    pub variable: usize,
    pub observed: f64,
    /// Selective MLE.
    pub estimate: f64,
    pub std_error: f64,
    pub mle_converged: bool,
    pub interval: IntervalEstimate,
    /// `false` also when no interval was found.
    pub estimate_in_interval: bool,
    pub p_value: f64,
    pub naive_interval: IntervalEstimate,
    pub naive_p_value: f64,
    /// Grid points filled by flat extension.
    pub grid_failures: usize,
    profile: DensityProfile,
}

impl TargetInference {
    /// Upper-tail pivot at hypothesized mean `mean`.
    pub fn pivot_at(&self, mean: f64) -> f64 {
        self.profile.pivot(mean)
    }

    pub fn interval_found(&self) -> bool {
        self.interval.found
    }

    pub fn profile(&self) -> &DensityProfile {
        &self.profile
    }
}

/// Selective-inference engine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectiveInference {
    pub options: InferenceOptions,
}

impl SelectiveInference {
    pub fn new(options: InferenceOptions) -> Self {
        Self { options }
    }

    /// Infer every selected coordinate.
    ///
    /// Parameters
    /// ----------
    /// - `outcome`: fitted selection.
    /// - `variant`: exact or two-stage selection event.
    /// - `dispersion`: noise variance override; `None` uses
    ///   `outcome.dispersion()`.
    ///
    /// Returns
    /// -------
    /// One entry per active position. The outer result fails only when the
    /// map itself cannot be built (invalid dispersion).
    ///
    /// # Errors
    /// - `InvalidDispersion`.
    pub fn run(
        &self, outcome: &SelectionOutcome, variant: &dyn SelectionVariant,
        dispersion: Option<f64>,
    ) -> InferenceResult<Vec<InferenceResult<TargetInference>>> {
        let map =
            SelectionMap::new(outcome, variant, dispersion.unwrap_or_else(|| outcome.dispersion()))?;
        log::debug!(
            "selective inference ({}) on {} selected of {} variables",
            variant.name(),
            map.n_targets(),
            outcome.n_variables()
        );

        let results: Vec<InferenceResult<TargetInference>> = (0..map.n_targets())
            .into_par_iter()
            .map(|coordinate| self.infer_coordinate(&map, coordinate))
            .collect();

        for (coordinate, result) in results.iter().enumerate() {
            if let Err(err) = result {
                log::warn!("coordinate {coordinate} excluded: {err}");
            }
        }
        Ok(results)
    }

    /// Infer one active position of `map`.
    ///
    /// # Errors
    /// - `InvalidCoordinate`, `GridApproximationFailed`, or any structural
    ///   error from the objective or the MLE solve.
    pub fn infer_coordinate(
        &self, map: &SelectionMap<'_>, coordinate: usize,
    ) -> InferenceResult<TargetInference> {
        let target = map.target(coordinate)?;
        let profile = ConditionalDensityGrid::new(*map, &self.options).profile(&target)?;

        let intervals = &self.options.intervals;
        let interval = confidence_interval(&profile, intervals);
        if !interval.found {
            log::warn!("coordinate {coordinate}: no candidate mean met the coverage band");
        }
        let mle = selective_mle(&profile, &self.options.mle)?;
        let estimate_in_interval = interval.contains(mle.estimate);
        if interval.found && !estimate_in_interval {
            log::warn!(
                "coordinate {coordinate}: selective MLE {:.4} outside [{:.4}, {:.4}]",
                mle.estimate,
                interval.lower,
                interval.upper
            );
        }
        let sd = target.std_dev();

        Ok(TargetInference {
            coordinate,
            variable: target.variable,
            observed: target.observed,
            estimate: mle.estimate,
            std_error: mle.std_error,
            mle_converged: mle.converged,
            interval,
            estimate_in_interval,
            p_value: selective_p_value(&profile, intervals),
            naive_interval: naive_interval(target.observed, sd, intervals.level)?,
            naive_p_value: naive_p_value(target.observed, sd, intervals.null_value)?,
            grid_failures: profile.failures(),
            profile,
        })
    }

    /// [`discoveries`] at `options.bh_level`.
    ///
    /// # Errors
    /// - `InvalidLevel` when `bh_level` was set outside (0, 1) by hand.
    pub fn discoveries(
        &self, results: &[InferenceResult<TargetInference>],
    ) -> InferenceResult<Vec<usize>> {
        discoveries(results, self.options.bh_level)
    }
}

/// Active positions rejected by BH at `level`, among coordinates that
/// succeeded.
///
/// # Errors
/// - `InvalidLevel` for `level` outside (0, 1).
pub fn discoveries(
    results: &[InferenceResult<TargetInference>], level: f64,
) -> InferenceResult<Vec<usize>> {
    let (coordinates, p_values): (Vec<usize>, Vec<f64>) = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|t| (t.coordinate, t.p_value))
        .unzip();
    let rejected = benjamini_hochberg(&p_values, level)?;
    Ok(rejected.into_iter().map(|i| coordinates[i]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        inference::{
            errors::InferenceError,
            objective::InactiveCubeTerm,
            options::{GridOptions, IntervalOptions},
            selection_map::ExactSelection,
        },
        selection::outcome::tests::toy_outcome,
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - A full coordinate on the toy outcome.
    // - Dispersion override validation and out-of-range coordinates.
    // - BH aggregation that skips failed coordinates, at an explicit level
    //   and at the configured `bh_level`.
    // - The MLE-in-interval flag when no interval can be found.
    // -------------------------------------------------------------------------

    fn small_engine() -> SelectiveInference {
        SelectiveInference::new(InferenceOptions {
            grid: GridOptions::new(81, 6.0, 6.0, 40, true).unwrap(),
            cube_term: InactiveCubeTerm::GaussianProbability { underflow_threshold: 1e-10 },
            ..InferenceOptions::default()
        })
    }

    #[test]
    // Purpose
    // -------
    // The toy outcome yields a complete, self-consistent summary.
    //
    // Given
    // -----
    // - Toy outcome (one selected variable, index 1, observed 0.8).
    //
    // Expect
    // ------
    // - One result; variable 1; p-values in [0, 1]; a found interval with
    //   lower < upper; naive interval centred on 0.8; pivot in [0, 1].
    fn toy_outcome_full_summary() {
        // Arrange
        let outcome = toy_outcome();
        let engine = small_engine();

        // Act
        let results = engine.run(&outcome, &ExactSelection, None).unwrap();

        // Assert
        assert_eq!(results.len(), 1);
        let t = results[0].as_ref().unwrap();
        assert_eq!((t.coordinate, t.variable), (0, 1));
        assert!((0.0..=1.0).contains(&t.p_value));
        assert!((0.0..=1.0).contains(&t.naive_p_value));
        assert!(t.interval_found() && t.interval.lower < t.interval.upper);
        let centre = 0.5 * (t.naive_interval.lower + t.naive_interval.upper);
        assert!((centre - 0.8).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&t.pivot_at(0.0)));
        assert!(t.estimate.is_finite());
        assert_eq!(t.estimate_in_interval, t.interval.contains(t.estimate));
    }

    #[test]
    // Purpose
    // -------
    // With no candidate mean meeting the band, the MLE cannot lie inside
    // the interval and the flag says so.
    //
    // Given
    // -----
    // - Toy outcome; a three-point parameter grid of half-width 1e-6 at
    //   level 1e-6, so every candidate lies far outside the band.
    //
    // Expect
    // ------
    // - `interval_found()` is false and `estimate_in_interval` is false,
    //   while the MLE itself is still reported.
    fn estimate_outside_missing_interval_is_flagged() {
        // Arrange
        let outcome = toy_outcome();
        let mut engine = small_engine();
        engine.options.intervals = IntervalOptions::new(1e-6, 3, 1e-6, 0.0).unwrap();
        let map = SelectionMap::new(&outcome, &ExactSelection, 1.0).unwrap();

        // Act
        let t = engine.infer_coordinate(&map, 0).unwrap();

        // Assert
        assert!(!t.interval_found());
        assert!(!t.estimate_in_interval);
        assert!(t.estimate.is_finite());
    }

    #[test]
    // Purpose
    // -------
    // Invalid dispersion fails the run; an out-of-range coordinate fails
    // only that coordinate.
    //
    // Given
    // -----
    // - Dispersion override −1; coordinate 5 on a one-variable selection.
    //
    // Expect
    // ------
    // - `InvalidDispersion`, `InvalidCoordinate { coordinate: 5, n_active: 1 }`.
    fn invalid_inputs() {
        let outcome = toy_outcome();
        let engine = small_engine();

        assert!(matches!(
            engine.run(&outcome, &ExactSelection, Some(-1.0)),
            Err(InferenceError::InvalidDispersion { .. })
        ));
        let map = SelectionMap::new(&outcome, &ExactSelection, 1.0).unwrap();
        assert_eq!(
            engine.infer_coordinate(&map, 5),
            Err(InferenceError::InvalidCoordinate { coordinate: 5, n_active: 1 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Failed coordinates are excluded from the BH family.
    //
    // Given
    // -----
    // - The toy result twice (re-labelled as coordinates 0 and 2) with
    //   p-values 0.001 and 0.8, plus a failed coordinate 1.
    //
    // Expect
    // ------
    // - Discoveries at level 0.1 are exactly [0]; m = 2, not 3.
    fn discoveries_skip_failed_coordinates() {
        // Arrange
        let outcome = toy_outcome();
        let engine = small_engine();
        let base = engine.run(&outcome, &ExactSelection, None).unwrap().remove(0).unwrap();
        let first = TargetInference { coordinate: 0, p_value: 0.001, ..base.clone() };
        let last = TargetInference { coordinate: 2, p_value: 0.8, ..base };
        let results = vec![
            Ok(first),
            Err(InferenceError::GridApproximationFailed {
                coordinate: 1,
                failures: 81,
                grid_length: 81,
            }),
            Ok(last),
        ];

        // Act
        let found = discoveries(&results, 0.1).unwrap();

        // Assert
        assert_eq!(found, vec![0]);
    }

    #[test]
    // Purpose
    // -------
    // The engine's BH level drives `SelectiveInference::discoveries`.
    //
    // Given
    // -----
    // - Coordinates with p-values 0.001 and 0.8; `bh_level` 0.1, then 0.0005.
    //
    // Expect
    // ------
    // - [0] at 0.1; nothing at 0.0005 since 0.001 > 0.0005 · 1/2.
    fn configured_bh_level_sets_discoveries() {
        // Arrange
        let outcome = toy_outcome();
        let mut engine = small_engine();
        let base = engine.run(&outcome, &ExactSelection, None).unwrap().remove(0).unwrap();
        let results = vec![
            Ok(TargetInference { coordinate: 0, p_value: 0.001, ..base.clone() }),
            Ok(TargetInference { coordinate: 1, p_value: 0.8, ..base }),
        ];

        // Act
        engine.options.bh_level = 0.1;
        let loose = engine.discoveries(&results).unwrap();
        engine.options.bh_level = 0.0005;
        let strict = engine.discoveries(&results).unwrap();

        // Assert
        assert_eq!(loose, vec![0]);
        assert!(strict.is_empty());
    }
}
