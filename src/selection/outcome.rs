//! selection::outcome — immutable record of one randomized selection event.
//!
//! Purpose
//! -------
//! Carry everything the inference engine needs to know about a selection
//! event: which coordinates were selected and with which signs, the score
//! geometry linking the data to the targets, the affine map from the
//! optimization variables to the randomization, and the inactive box
//! half-widths.
//!
//! Key behaviors
//! -------------
//! - [`SelectionOutcome::new`] validates shapes and domains once; afterwards
//!   the outcome is read-only and can be shared across threads.
//! - Rows of every `p`-row object are ordered **active first**:
//!   `active[0], …, active[E−1], inactive[0], …`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `active` is non-empty, distinct, and in `0..p`; `inactive` is its
//!   ascending complement.
//! - `signs ∈ {−1, +1}^E`, `inactive_lagrange > 0`, `feasible_point > 0`.
//! - Score covariances are stored **per unit dispersion**; the engine
//!   multiplies by the dispersion in use.
//! - The randomization satisfies
//!   `ω = score_linear_term·score + opt_linear·o + opt_affine` on the active
//!   rows, with `o = |β_E|` the optimization variables and the inactive rows
//!   shifted by the subgradient `z ∈ (−λ, λ)`.
//!
//! Downstream usage
//! ----------------
//! - `inference::selection_map` reads [`ScoreGeometry`] and
//!   [`OptimizationTransform`] to build per-coordinate affine maps.
use crate::selection::errors::{SelectionError, SelectionResult};
use ndarray::{Array1, Array2};

/// Score-side geometry of a selection event.
///
/// Fields
/// ------
/// - `linear_term`: `p × p`, maps the observed score into the randomization.
/// - `observed_score`: length `p`.
/// - `score_target_cov`: `p × E`, `Cov(score, target)` per unit dispersion.
/// - `target_cov`: `E × E`, `Cov(target)` per unit dispersion.
/// - `observed_target`: length `E`, the observed statistics (e.g. `β̄_E`).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreGeometry {
    pub linear_term: Array2<f64>,
    pub observed_score: Array1<f64>,
    pub score_target_cov: Array2<f64>,
    pub target_cov: Array2<f64>,
    pub observed_target: Array1<f64>,
}

/// Affine map from optimization variables to the randomization.
///
/// Fields
/// ------
/// - `linear`: `p × E`.
/// - `affine`: length `p`.
/// - `feasible_point`: length `E`, strictly positive; the observed `|β̂_E|`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationTransform {
    pub linear: Array2<f64>,
    pub affine: Array1<f64>,
    pub feasible_point: Array1<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutcome {
    n_variables: usize,
    active: Vec<usize>,
    inactive: Vec<usize>,
    signs: Array1<f64>,
    score: ScoreGeometry,
    transform: OptimizationTransform,
    inactive_lagrange: Array1<f64>,
    randomization_scale: f64,
    dispersion: f64,
}

impl SelectionOutcome {
    /// Validated constructor.
    ///
    /// Parameters
    /// ----------
    /// - `n_variables`: `usize`
    ///   Total number of coordinates `p`.
    /// - `active`: `Vec<usize>`
    ///   Selected coordinates in the order used for every active block.
    /// - `signs`: `Array1<f64>`
    ///   Observed sign per active coordinate.
    /// - `score`, `transform`: see [`ScoreGeometry`], [`OptimizationTransform`].
    /// - `inactive_lagrange`: `Array1<f64>`
    ///   Box half-widths for the inactive coordinates, ascending index order.
    /// - `randomization_scale`: `f64`
    ///   Standard deviation τ of the isotropic Gaussian randomization.
    /// - `dispersion`: `f64`
    ///   Residual noise-variance estimate used when a run supplies none.
    ///
    /// Errors
    /// ------
    /// - `InvalidActiveSet`, `InvalidSign`, `DimensionMismatch`,
    ///   `InvalidPenaltyWeight` (non-positive inactive half-width),
    ///   `NonFiniteData` (non-positive feasible point),
    ///   `InvalidRandomizationScale`, `InvalidDispersion`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n_variables: usize, active: Vec<usize>, signs: Array1<f64>, score: ScoreGeometry,
        transform: OptimizationTransform, inactive_lagrange: Array1<f64>,
        randomization_scale: f64, dispersion: f64,
    ) -> SelectionResult<Self> {
        if active.is_empty() {
            return Err(SelectionError::NoVariablesSelected);
        }
        let mut seen = vec![false; n_variables];
        for &j in &active {
            if j >= n_variables || seen[j] {
                return Err(SelectionError::InvalidActiveSet { index: j, len: n_variables });
            }
            seen[j] = true;
        }
        let inactive: Vec<usize> = (0..n_variables).filter(|&j| !seen[j]).collect();
        let (p, e) = (n_variables, active.len());

        check_len("signs", e, signs.len())?;
        for (index, &s) in signs.iter().enumerate() {
            if s != 1.0 && s != -1.0 {
                return Err(SelectionError::InvalidSign { index, value: s });
            }
        }

        check_shape("score linear term", (p, p), score.linear_term.dim())?;
        check_len("observed score", p, score.observed_score.len())?;
        check_shape("score/target covariance", (p, e), score.score_target_cov.dim())?;
        check_shape("target covariance", (e, e), score.target_cov.dim())?;
        check_len("observed target", e, score.observed_target.len())?;
        for j in 0..e {
            let v = score.target_cov[[j, j]];
            if !v.is_finite() || v <= 0.0 {
                return Err(SelectionError::NonFiniteData { what: "target variance", index: j, value: v });
            }
        }

        check_shape("optimization linear map", (p, e), transform.linear.dim())?;
        check_len("optimization affine term", p, transform.affine.len())?;
        check_len("feasible point", e, transform.feasible_point.len())?;
        for (index, &o) in transform.feasible_point.iter().enumerate() {
            if !o.is_finite() || o <= 0.0 {
                return Err(SelectionError::NonFiniteData { what: "feasible point", index, value: o });
            }
        }

        check_len("inactive half-widths", p - e, inactive_lagrange.len())?;
        for (k, &l) in inactive_lagrange.iter().enumerate() {
            if !l.is_finite() || l <= 0.0 {
                return Err(SelectionError::InvalidPenaltyWeight { index: inactive[k], value: l });
            }
        }
        if !randomization_scale.is_finite() || randomization_scale <= 0.0 {
            return Err(SelectionError::InvalidRandomizationScale { value: randomization_scale });
        }
        if !dispersion.is_finite() || dispersion <= 0.0 {
            return Err(SelectionError::InvalidDispersion { value: dispersion });
        }

        Ok(Self {
            n_variables,
            active,
            inactive,
            signs,
            score,
            transform,
            inactive_lagrange,
            randomization_scale,
            dispersion,
        })
    }

    pub fn n_variables(&self) -> usize {
        self.n_variables
    }

    pub fn n_active(&self) -> usize {
        self.active.len()
    }

    pub fn active(&self) -> &[usize] {
        &self.active
    }

    pub fn inactive(&self) -> &[usize] {
        &self.inactive
    }

    pub fn signs(&self) -> &Array1<f64> {
        &self.signs
    }

    pub fn score(&self) -> &ScoreGeometry {
        &self.score
    }

    pub fn transform(&self) -> &OptimizationTransform {
        &self.transform
    }

    pub fn inactive_lagrange(&self) -> &Array1<f64> {
        &self.inactive_lagrange
    }

    pub fn randomization_scale(&self) -> f64 {
        self.randomization_scale
    }

    /// Residual-based dispersion estimate from the fit.
    pub fn dispersion(&self) -> f64 {
        self.dispersion
    }

    /// Original variable index of active position `j`.
    pub fn variable(&self, j: usize) -> Option<usize> {
        self.active.get(j).copied()
    }
}

// ---- Helper methods ----

fn check_len(what: &'static str, expected: usize, found: usize) -> SelectionResult<()> {
    if expected != found {
        return Err(SelectionError::DimensionMismatch { what, expected, found });
    }
    Ok(())
}

fn check_shape(
    what: &'static str, expected: (usize, usize), found: (usize, usize),
) -> SelectionResult<()> {
    check_len(what, expected.0, found.0)?;
    check_len(what, expected.1, found.1)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction of a small, consistent outcome and its accessors.
    // - Rejection of duplicate active coordinates, bad signs, and shape
    //   mismatches.
    // -------------------------------------------------------------------------

    /// One active coordinate (index 1) out of three, unit geometry.
    pub(crate) fn toy_outcome() -> SelectionOutcome {
        let score = ScoreGeometry {
            linear_term: -Array2::<f64>::eye(3),
            observed_score: array![0.8, 0.1, -0.2],
            score_target_cov: array![[1.0], [0.0], [0.0]],
            target_cov: array![[1.0]],
            observed_target: array![0.8],
        };
        let transform = OptimizationTransform {
            linear: array![[1.0], [0.0], [0.0]],
            affine: array![1.0, 0.0, 0.0],
            feasible_point: array![0.5],
        };
        SelectionOutcome::new(3, vec![1], array![1.0], score, transform, array![1.0, 1.0], 1.0, 1.0)
            .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Build a consistent outcome and read it back.
    //
    // Given
    // -----
    // - `toy_outcome()`.
    //
    // Expect
    // ------
    // - Inactive set [0, 2]; variable(0) = 1; variable(1) = None.
    fn consistent_outcome_round_trips_accessors() {
        let outcome = toy_outcome();
        assert_eq!(outcome.inactive(), &[0, 2]);
        assert_eq!(outcome.n_active(), 1);
        assert_eq!(outcome.variable(0), Some(1));
        assert_eq!(outcome.variable(1), None);
    }

    #[test]
    // Purpose
    // -------
    // Reject malformed inputs.
    //
    // Given
    // -----
    // - Duplicate active coordinates; a zero sign; a short affine term.
    //
    // Expect
    // ------
    // - `InvalidActiveSet`, `InvalidSign`, `DimensionMismatch`.
    fn malformed_outcomes_are_rejected() {
        let base = toy_outcome();
        let score = base.score().clone();
        let transform = base.transform().clone();

        assert!(matches!(
            SelectionOutcome::new(
                3, vec![1, 1], array![1.0, 1.0], score.clone(), transform.clone(),
                array![1.0], 1.0, 1.0
            ),
            Err(SelectionError::InvalidActiveSet { index: 1, .. })
        ));
        assert!(matches!(
            SelectionOutcome::new(
                3, vec![1], array![0.0], score.clone(), transform.clone(),
                array![1.0, 1.0], 1.0, 1.0
            ),
            Err(SelectionError::InvalidSign { .. })
        ));
        let short = OptimizationTransform { affine: array![1.0, 0.0], ..transform };
        assert!(matches!(
            SelectionOutcome::new(3, vec![1], array![1.0], score, short, array![1.0, 1.0], 1.0, 1.0),
            Err(SelectionError::DimensionMismatch { what: "optimization affine term", .. })
        ));
    }
}
