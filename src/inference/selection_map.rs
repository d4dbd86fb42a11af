//! inference::selection_map — per-coordinate affine maps of a selection event.
//!
//! Purpose
//! -------
//! Translate a [`SelectionOutcome`] and one target coordinate `j` into the
//! affine coefficients the selection-event objective needs to be evaluated
//! at an arbitrary hypothesized value `t` of that coordinate:
//!
//! ```text
//! A       = L · Σ_{score,target}[:, j] / Σ_target[j, j]
//! null    = L · score_obs − A · target_obs[j]
//! offset  = null + affine          (split active / inactive)
//! ω(t, o) = B · o + offset + t · A
//! ```
//!
//! Key behaviors
//! -------------
//! - [`SelectionMap::target`] computes a [`TargetCoordinate`] in
//!   `O(p · E)`; nothing is cached across coordinates.
//! - Selection variants are strategies ([`SelectionVariant`]):
//!   [`ExactSelection`] adds nothing, [`TwoStageSelection`] adds the
//!   β-free stage-one term of a randomized Simes screen.
//!
//! Invariants & assumptions
//! ------------------------
//! - Covariances in the outcome are per unit dispersion, so `A` and `null`
//!   do not depend on the dispersion; only the target variance does.
//! - Shared inputs are borrowed immutably; every `TargetCoordinate` is an
//!   owned, independent value.
use crate::{
    inference::errors::{InferenceError, InferenceResult},
    optimization::numerical_stability::neg_log_interval_probability,
    selection::{errors::SelectionError, outcome::SelectionOutcome, simes::SimesOutcome},
};
use ndarray::{Array1, s};

/// Stage-one event contribution `−log P(lower ≤ τZ − arg(t) ≤ upper)`,
/// with `arg(t) = intercept + slope·t`. Constant in the optimization
/// variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTerm {
    pub slope: f64,
    pub intercept: f64,
    pub lower: f64,
    pub upper: f64,
    pub scale: f64,
}

impl StageTerm {
    /// Value of the term at hypothesized target value `t`.
    pub fn value(&self, t: f64, underflow_threshold: f64) -> f64 {
        let arg = self.intercept + self.slope * t;
        neg_log_interval_probability(arg, self.lower, self.upper, self.scale, underflow_threshold)
            .value
    }
}

/// Variant-specific part of the per-coordinate setup.
pub trait SelectionVariant: Send + Sync {
    fn name(&self) -> &str;

    /// Extra β-free term for coordinate `coordinate`, if the variant has one.
    ///
    /// # Errors
    /// Variant-specific validation failures.
    fn stage_term(
        &self, outcome: &SelectionOutcome, coordinate: usize,
    ) -> InferenceResult<Option<StageTerm>>;
}

/// Conditioning on the randomized selection event alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExactSelection;

impl SelectionVariant for ExactSelection {
    fn name(&self) -> &str {
        "exact"
    }

    fn stage_term(
        &self, _outcome: &SelectionOutcome, _coordinate: usize,
    ) -> InferenceResult<Option<StageTerm>> {
        Ok(None)
    }
}

/// Conditioning on a randomized Simes screen followed by the selection event.
///
/// `direction` is [`SimesOutcome::target_direction`]:
/// `(X_EᵀX_E)⁻¹X_Eᵀx_{t₀}/‖x_{t₀}‖`. The regression of the stage-one
/// statistic on target `j` has slope `direction_j / (σ·Σ_target[j, j])`.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoStageSelection {
    screen: SimesOutcome,
    direction: Array1<f64>,
}

impl TwoStageSelection {
    pub fn new(screen: SimesOutcome, direction: Array1<f64>) -> Self {
        Self { screen, direction }
    }

    pub fn screen(&self) -> &SimesOutcome {
        &self.screen
    }
}

impl SelectionVariant for TwoStageSelection {
    fn name(&self) -> &str {
        "two-stage"
    }

    fn stage_term(
        &self, outcome: &SelectionOutcome, coordinate: usize,
    ) -> InferenceResult<Option<StageTerm>> {
        if self.direction.len() != outcome.n_active() {
            return Err(SelectionError::DimensionMismatch {
                what: "stage-one direction",
                expected: outcome.n_active(),
                found: self.direction.len(),
            }
            .into());
        }
        let screen = &self.screen;
        let target_var = outcome.score().target_cov[[coordinate, coordinate]];
        let ratio = self.direction[coordinate] / (screen.noise_level * target_var);
        let slope = -screen.sign * ratio;
        let observed = outcome.score().observed_target[coordinate];
        Ok(Some(StageTerm {
            slope,
            intercept: -screen.sign * screen.statistic - slope * observed,
            lower: screen.lower_threshold,
            upper: screen.upper_threshold,
            scale: screen.randomization_scale,
        }))
    }
}

/// Affine data of one target coordinate, reused at every grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetCoordinate {
    /// Position in the active set.
    pub coordinate: usize,
    /// Original variable index.
    pub variable: usize,
    pub observed: f64,
    /// `dispersion · Σ_target[j, j]`.
    pub variance: f64,
    /// `A`, length `p`, active rows first.
    pub slope: Array1<f64>,
    pub null_statistic: Array1<f64>,
    pub offset_active: Array1<f64>,
    pub offset_inactive: Array1<f64>,
    pub stage: Option<StageTerm>,
}

impl TargetCoordinate {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// `(offset_active + t·A_E, offset_inactive + t·A_{−E})`.
    pub fn offsets_at(&self, t: f64) -> (Array1<f64>, Array1<f64>) {
        let e = self.offset_active.len();
        let active = &self.offset_active + &self.slope.slice(s![..e]).mapv(|a| a * t);
        let inactive = &self.offset_inactive + &self.slope.slice(s![e..]).mapv(|a| a * t);
        (active, inactive)
    }
}

/// Selection outcome + variant + dispersion, ready to produce targets.
#[derive(Clone, Copy)]
pub struct SelectionMap<'a> {
    outcome: &'a SelectionOutcome,
    variant: &'a dyn SelectionVariant,
    dispersion: f64,
}

impl<'a> SelectionMap<'a> {
    /// # Errors
    /// - [`InferenceError::InvalidDispersion`] unless `dispersion` is finite
    ///   and `> 0`.
    pub fn new(
        outcome: &'a SelectionOutcome, variant: &'a dyn SelectionVariant, dispersion: f64,
    ) -> InferenceResult<Self> {
        if !dispersion.is_finite() || dispersion <= 0.0 {
            return Err(InferenceError::InvalidDispersion { value: dispersion });
        }
        Ok(Self { outcome, variant, dispersion })
    }

    pub fn outcome(&self) -> &'a SelectionOutcome {
        self.outcome
    }

    pub fn variant(&self) -> &'a dyn SelectionVariant {
        self.variant
    }

    pub fn dispersion(&self) -> f64 {
        self.dispersion
    }

    pub fn n_targets(&self) -> usize {
        self.outcome.n_active()
    }

    /// Affine coefficients for active position `coordinate`.
    ///
    /// # Errors
    /// - [`InferenceError::InvalidCoordinate`] if `coordinate >= E`.
    /// - Any error from the variant's stage term.
    pub fn target(&self, coordinate: usize) -> InferenceResult<TargetCoordinate> {
        let e = self.outcome.n_active();
        let variable = self
            .outcome
            .variable(coordinate)
            .ok_or(InferenceError::InvalidCoordinate { coordinate, n_active: e })?;
        let score = self.outcome.score();
        let transform = self.outcome.transform();

        let target_var = score.target_cov[[coordinate, coordinate]];
        let observed = score.observed_target[coordinate];
        let slope = score.linear_term.dot(&score.score_target_cov.column(coordinate)) / target_var;
        let null_statistic = score.linear_term.dot(&score.observed_score) - &slope * observed;
        let offset = &null_statistic + &transform.affine;

        Ok(TargetCoordinate {
            coordinate,
            variable,
            observed,
            variance: self.dispersion * target_var,
            offset_active: offset.slice(s![..e]).to_owned(),
            offset_inactive: offset.slice(s![e..]).to_owned(),
            slope,
            null_statistic,
            stage: self.variant.stage_term(self.outcome, coordinate)?,
        })
    }
}

impl std::fmt::Debug for SelectionMap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionMap")
            .field("variant", &self.variant.name())
            .field("n_targets", &self.n_targets())
            .field("dispersion", &self.dispersion)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::outcome::tests::toy_outcome;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Hand-computed affine coefficients on the toy outcome.
    // - The identity `offset(t_obs) = L·score_obs + affine`.
    // - Two-stage stage terms and their vanishing when thresholds are
    //   unbounded.
    // - Coordinate and dispersion validation.
    // -------------------------------------------------------------------------

    fn screen(lower: f64, upper: f64) -> SimesOutcome {
        SimesOutcome {
            p_value: 0.01,
            rank: 0,
            variable: 1,
            sign: 1.0,
            statistic: 2.5,
            randomized_statistic: 2.7,
            lower_threshold: lower,
            upper_threshold: upper,
            randomization_scale: 0.7,
            noise_level: 1.0,
        }
    }

    #[test]
    // Purpose
    // -------
    // Check A, null statistic, and offsets against hand computation.
    //
    // Given
    // -----
    // - Toy outcome: L = −I₃, score = [0.8, 0.1, −0.2], Σ_{s,t} = e₁,
    //   Σ_t = 1, target 0.8, affine [1, 0, 0], dispersion 2.
    //
    // Expect
    // ------
    // - A = [−1, 0, 0]; null = [0, −0.1, 0.2]; offsets [1] and [−0.1, 0.2];
    //   variance 2.
    fn exact_target_matches_hand_computation() {
        // Arrange
        let outcome = toy_outcome();
        let map = SelectionMap::new(&outcome, &ExactSelection, 2.0).unwrap();

        // Act
        let target = map.target(0).unwrap();

        // Assert
        assert_eq!(target.variable, 1);
        assert_eq!(target.slope.to_vec(), vec![-1.0, 0.0, 0.0]);
        let null = target.null_statistic.to_vec();
        assert!((null[0]).abs() < 1e-15 && (null[1] + 0.1).abs() < 1e-15);
        assert!((null[2] - 0.2).abs() < 1e-15);
        assert!((target.offset_active[0] - 1.0).abs() < 1e-15);
        assert_eq!(target.offset_inactive.len(), 2);
        assert_eq!(target.variance, 2.0);
        assert!(target.stage.is_none());
    }

    #[test]
    // Purpose
    // -------
    // At t = observed target the offsets reproduce L·score + affine.
    //
    // Given
    // -----
    // - Toy outcome and its observed target 0.8.
    //
    // Expect
    // ------
    // - offsets_at(0.8) = L·score_obs + affine, blockwise.
    fn offsets_at_observed_recover_observed_score() {
        let outcome = toy_outcome();
        let map = SelectionMap::new(&outcome, &ExactSelection, 1.0).unwrap();
        let target = map.target(0).unwrap();
        let (active, inactive) = target.offsets_at(target.observed);
        let score = outcome.score();
        let full = score.linear_term.dot(&score.observed_score) + &outcome.transform().affine;
        assert!((active[0] - full[0]).abs() < 1e-15);
        assert!((inactive[0] - full[1]).abs() < 1e-15);
        assert!((inactive[1] - full[2]).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // The two-stage variant places the observed stage-one statistic at
    // t = observed and vanishes for unbounded thresholds.
    //
    // Given
    // -----
    // - Direction [0.5], σ = 1, sign +1, T = 2.5; thresholds (2, 4) and
    //   (−∞, ∞).
    //
    // Expect
    // ------
    // - slope = −0.5; arg(0.8) = −2.5; value at thresholds (−∞, ∞) is 0.
    fn two_stage_term_is_anchored_at_observed_statistic() {
        let outcome = toy_outcome();
        let variant = TwoStageSelection::new(screen(2.0, 4.0), Array1::from(vec![0.5]));
        let map = SelectionMap::new(&outcome, &variant, 1.0).unwrap();
        let stage = map.target(0).unwrap().stage.unwrap();
        assert!((stage.slope + 0.5).abs() < 1e-15);
        assert!((stage.intercept + stage.slope * 0.8 + 2.5).abs() < 1e-15);

        let open = TwoStageSelection::new(
            screen(f64::NEG_INFINITY, f64::INFINITY),
            Array1::from(vec![0.5]),
        );
        let open_map = SelectionMap::new(&outcome, &open, 1.0).unwrap();
        let open_stage = open_map.target(0).unwrap().stage.unwrap();
        assert_eq!(open_stage.value(0.3, 1e-10), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Reject bad coordinates, dispersions, and direction lengths.
    //
    // Given
    // -----
    // - Coordinate 1 for one active variable; dispersion 0; direction of
    //   length 2.
    //
    // Expect
    // ------
    // - `InvalidCoordinate`, `InvalidDispersion`, wrapped `DimensionMismatch`.
    fn invalid_requests_are_rejected() {
        let outcome = toy_outcome();
        let map = SelectionMap::new(&outcome, &ExactSelection, 1.0).unwrap();
        assert_eq!(
            map.target(1),
            Err(InferenceError::InvalidCoordinate { coordinate: 1, n_active: 1 })
        );
        assert!(matches!(
            SelectionMap::new(&outcome, &ExactSelection, 0.0),
            Err(InferenceError::InvalidDispersion { .. })
        ));
        let variant = TwoStageSelection::new(screen(2.0, 4.0), Array1::from(vec![0.5, 0.5]));
        let bad = SelectionMap::new(&outcome, &variant, 1.0).unwrap();
        assert!(matches!(
            bad.target(0),
            Err(InferenceError::Selection(SelectionError::DimensionMismatch { .. }))
        ));
    }
}
