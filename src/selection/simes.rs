//! selection::simes — randomized Simes screening (stage one of two-step selection).
//!
//! Purpose
//! -------
//! Screen a family of marginal hypotheses with a randomized Simes test
//! before fitting the randomized LASSO. When the global null is rejected,
//! record the winning statistic and the thresholds that characterize the
//! stage-one event, so the second-stage inference can condition on it.
//!
//! Key behaviors
//! -------------
//! - Marginal statistics `T_j = x_jᵀy / (σ‖x_j‖)` are standard normal under
//!   the null; randomized versions `T̃ = T + τ_s·ω` give p-values
//!   `2(1 − Φ(|T̃|/√(1 + τ_s²)))`.
//! - Simes p-value `min_i p·p_(i)/(i + 1)` over the sorted p-values, with
//!   `i₀` the first minimizing rank and `t₀` the corresponding variable.
//! - Thresholds on `sign·T̃_{t₀}`:
//!   `lower = √(1+τ_s²)·Φ⁻¹(1 − min(u₁, u₂, level·(i₀+1)/p)/2)`, where
//!   `u₁ = (i₀+1)/p · min_{i≠i₀} p·p_(i)/(i+1)` and `u₂ = p_(i₀+1)` when
//!   they exist; `upper = √(1+τ_s²)·Φ⁻¹(1 − p_(i₀−1)/2)`, or `+∞` when
//!   `i₀ = 0`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Ties in the p-value sort keep ascending variable order.
//! - `lower ≤ |T̃_{t₀}| ≤ upper` whenever the screen rejects.
//! - Design columns must be nonzero.
use crate::selection::{
    errors::{SelectionError, SelectionResult},
    lasso::validate_regression_data,
    linalg::select_columns,
    outcome::SelectionOutcome,
};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::Rng;
use rand_distr::StandardNormal;
use statrs::distribution::{ContinuousCDF, Normal};

/// Randomized Simes screening rule.
///
/// Fields
/// ------
/// - `noise_level`: σ, known noise standard deviation.
/// - `randomization_scale`: τ_s (default 0.7).
/// - `level`: rejection level of the global test (default 0.10).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimesScreening {
    noise_level: f64,
    randomization_scale: f64,
    level: f64,
}

impl SimesScreening {
    /// # Errors
    /// - `InvalidNoiseLevel`, `InvalidRandomizationScale`, `InvalidLevel`.
    pub fn new(noise_level: f64, randomization_scale: f64, level: f64) -> SelectionResult<Self> {
        if !noise_level.is_finite() || noise_level <= 0.0 {
            return Err(SelectionError::InvalidNoiseLevel { value: noise_level });
        }
        if !randomization_scale.is_finite() || randomization_scale <= 0.0 {
            return Err(SelectionError::InvalidRandomizationScale { value: randomization_scale });
        }
        if !(level > 0.0 && level < 1.0) {
            return Err(SelectionError::InvalidLevel { value: level });
        }
        Ok(Self { noise_level, randomization_scale, level })
    }

    /// Unit noise, `τ_s = 0.7`, level 0.10.
    pub fn with_noise_level(noise_level: f64) -> SelectionResult<Self> {
        Self::new(noise_level, 0.7, 0.10)
    }

    pub fn noise_level(&self) -> f64 {
        self.noise_level
    }

    pub fn randomization_scale(&self) -> f64 {
        self.randomization_scale
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Draw `ω ~ N(0, I_p)` from `rng` and screen.
    ///
    /// # Errors
    /// See [`SimesScreening::screen_with_randomization`].
    pub fn screen<R: Rng + ?Sized>(
        &self, x: &ArrayView2<'_, f64>, y: &ArrayView1<'_, f64>, rng: &mut R,
    ) -> SelectionResult<SimesOutcome> {
        let omega: Array1<f64> =
            (0..x.ncols()).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();
        self.screen_with_randomization(x, y, &omega.view())
    }

    /// Screen with a given standard-normal perturbation `omega`.
    ///
    /// Errors
    /// ------
    /// - Data validation errors; `NonFiniteData` for a zero column.
    /// - `ScreeningNotSignificant` when the Simes p-value exceeds `level`.
    pub fn screen_with_randomization(
        &self, x: &ArrayView2<'_, f64>, y: &ArrayView1<'_, f64>, omega: &ArrayView1<'_, f64>,
    ) -> SelectionResult<SimesOutcome> {
        validate_regression_data(x, y)?;
        let p = x.ncols();
        if omega.len() != p {
            return Err(SelectionError::DimensionMismatch {
                what: "randomization",
                expected: p,
                found: omega.len(),
            });
        }

        let tau = self.randomization_scale;
        let inflation = (1.0 + tau * tau).sqrt();
        let normal = Normal::standard();

        let mut statistics = Array1::<f64>::zeros(p);
        for j in 0..p {
            let norm = x.column(j).dot(&x.column(j)).sqrt();
            if norm <= 0.0 {
                return Err(SelectionError::NonFiniteData { what: "column norm", index: j, value: norm });
            }
            statistics[j] = x.column(j).dot(y) / (self.noise_level * norm);
        }
        let randomized = &statistics + &omega.mapv(|w| tau * w);
        let p_values: Array1<f64> = randomized.mapv(|t| 2.0 * normal.sf(t.abs() / inflation));

        let mut order: Vec<usize> = (0..p).collect();
        order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));
        let sorted: Vec<f64> = order.iter().map(|&j| p_values[j]).collect();
        let adjusted: Vec<f64> =
            sorted.iter().enumerate().map(|(i, &pv)| p as f64 * pv / (i + 1) as f64).collect();

        let mut rank = 0;
        for (i, &a) in adjusted.iter().enumerate() {
            if a < adjusted[rank] {
                rank = i;
            }
        }
        let simes_p_value = adjusted[rank];
        if simes_p_value > self.level {
            return Err(SelectionError::ScreeningNotSignificant {
                p_value: simes_p_value,
                level: self.level,
            });
        }

        let variable = order[rank];
        let sign = if randomized[variable] >= 0.0 { 1.0 } else { -1.0 };

        let mut cutoff = self.level * (rank + 1) as f64 / p as f64;
        let others = adjusted
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != rank)
            .map(|(_, &a)| a)
            .fold(f64::INFINITY, f64::min);
        if others.is_finite() {
            cutoff = cutoff.min((rank + 1) as f64 / p as f64 * others);
        }
        if let Some(&next) = sorted.get(rank + 1) {
            cutoff = cutoff.min(next);
        }
        let lower_threshold = inflation * two_sided_quantile(&normal, cutoff);
        let upper_threshold = match rank.checked_sub(1) {
            Some(prev) => inflation * two_sided_quantile(&normal, sorted[prev]),
            None => f64::INFINITY,
        };

        log::debug!(
            "simes screen rejected at p = {simes_p_value:.3e}; variable {variable}, rank {rank}"
        );
        Ok(SimesOutcome {
            p_value: simes_p_value,
            rank,
            variable,
            sign,
            statistic: statistics[variable],
            randomized_statistic: randomized[variable],
            lower_threshold,
            upper_threshold,
            randomization_scale: tau,
            noise_level: self.noise_level,
        })
    }
}

/// Stage-one event of a rejected randomized Simes screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimesOutcome {
    /// Simes p-value of the global null.
    pub p_value: f64,
    /// Zero-based rank `i₀` of the winning p-value.
    pub rank: usize,
    /// Winning variable `t₀`.
    pub variable: usize,
    /// Sign of `T̃_{t₀}`.
    pub sign: f64,
    /// Unrandomized `T_{t₀}`.
    pub statistic: f64,
    pub randomized_statistic: f64,
    pub lower_threshold: f64,
    pub upper_threshold: f64,
    pub randomization_scale: f64,
    pub noise_level: f64,
}

impl SimesOutcome {
    /// Direction `(X_EᵀX_E)⁻¹X_Eᵀx_{t₀} / ‖x_{t₀}‖` linking `T_{t₀}` to the
    /// second-stage targets.
    ///
    /// Up to the factor `dispersion/σ`, this is `Cov(β̄_E, T_{t₀})`.
    ///
    /// # Errors
    /// - Data validation errors, or `DimensionMismatch` when `x` does not
    ///   have `outcome.n_variables()` columns.
    pub fn target_direction(
        &self, x: &ArrayView2<'_, f64>, outcome: &SelectionOutcome,
    ) -> SelectionResult<Array1<f64>> {
        if x.ncols() != outcome.n_variables() {
            return Err(SelectionError::DimensionMismatch {
                what: "design columns",
                expected: outcome.n_variables(),
                found: x.ncols(),
            });
        }
        let column = x.column(self.variable);
        let norm = column.dot(&column).sqrt();
        if norm <= 0.0 {
            return Err(SelectionError::NonFiniteData {
                what: "column norm",
                index: self.variable,
                value: norm,
            });
        }
        let x_active = select_columns(x, outcome.active());
        let cross = x_active.t().dot(&column) / norm;
        Ok(outcome.score().target_cov.dot(&cross))
    }
}

// ---- Helper methods ----

/// `Φ⁻¹(1 − q/2)`, with `+∞` at `q = 0` and `0` at `q ≥ 1`.
fn two_sided_quantile(normal: &Normal, q: f64) -> f64 {
    if q <= 0.0 {
        f64::INFINITY
    } else if q >= 1.0 {
        0.0
    } else {
        normal.inverse_cdf(1.0 - q / 2.0)
    }
}
