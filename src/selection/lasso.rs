//! selection::lasso — randomized LASSO producing a `SelectionOutcome`.
//!
//! Purpose
//! -------
//! Fit the randomized, ridge-stabilized LASSO
//!
//! ```text
//! minimize_β  ½‖y − Xβ‖² + (ε/2)‖β‖² − ωᵀβ + Σ_j λ_j |β_j|
//! ```
//!
//! with `ω ~ N(0, τ²I)`, and translate its KKT conditions into the affine
//! selection geometry consumed by the inference engine.
//!
//! Key behaviors
//! -------------
//! - [`RandomizedLasso::fit`] draws `ω` from a caller-supplied RNG;
//!   [`RandomizedLasso::fit_with_randomization`] takes `ω` explicitly and is
//!   fully deterministic.
//! - Cyclic coordinate descent with soft-thresholding; the active set is the
//!   ascending list of nonzero coefficients.
//! - The returned [`SelectionOutcome`] is ordered active-first and satisfies
//!   `ω = L·score + B·|β̂_E| + a + [0; u]` with `|u| < λ_{−E}`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Targets are the least-squares coefficients `β̄_E = (X_EᵀX_E)⁻¹X_Eᵀy`.
//! - The score covariance is block diagonal per unit dispersion,
//!   `blockdiag((X_EᵀX_E)⁻¹, X_{−E}ᵀ(I − P_E)X_{−E})`, so its target
//!   columns are `[(X_EᵀX_E)⁻¹; 0]` and the inactive block is never formed.
//! - Inactive coordinates must carry a strictly positive penalty; a
//!   zero-penalty coordinate that ends up at zero is rejected by
//!   [`SelectionOutcome::new`].
//!
//! Conventions
//! -----------
//! - `ε` defaults to `1/√n` when `ridge_term` is `None`.
//! - The dispersion estimate is `RSS/(n − |E|)`, or the sample variance of
//!   `y` when `n ≤ |E|`.
use crate::selection::{
    errors::{SelectionError, SelectionResult},
    linalg::{select_columns, symmetric_inverse},
    outcome::{OptimizationTransform, ScoreGeometry, SelectionOutcome},
    penalty::PenaltyWeights,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use rand_distr::StandardNormal;

/// Tuning of the randomized LASSO fit.
///
/// Fields
/// ------
/// - `randomization_scale`: τ, standard deviation of each `ω_j`.
/// - `ridge_term`: ε; `None` means `1/√n`.
/// - `max_iter`: coordinate-descent sweeps.
/// - `tol`: stop when the largest coefficient change in a sweep is below it.
///
/// Default: `τ = 1`, `ε = 1/√n`, `max_iter = 5000`, `tol = 1e-12`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LassoOptions {
    pub randomization_scale: f64,
    pub ridge_term: Option<f64>,
    pub max_iter: usize,
    pub tol: f64,
}

impl LassoOptions {
    /// # Errors
    /// - `InvalidRandomizationScale`, `InvalidRidgeTerm`, `InvalidCount`,
    ///   or `InvalidLevel` (tolerance) for the first offending field.
    pub fn new(
        randomization_scale: f64, ridge_term: Option<f64>, max_iter: usize, tol: f64,
    ) -> SelectionResult<Self> {
        if !randomization_scale.is_finite() || randomization_scale <= 0.0 {
            return Err(SelectionError::InvalidRandomizationScale { value: randomization_scale });
        }
        if let Some(eps) = ridge_term {
            if !eps.is_finite() || eps < 0.0 {
                return Err(SelectionError::InvalidRidgeTerm { value: eps });
            }
        }
        if max_iter == 0 {
            return Err(SelectionError::InvalidCount { name: "max_iter", value: max_iter });
        }
        if !tol.is_finite() || tol <= 0.0 {
            return Err(SelectionError::InvalidLevel { value: tol });
        }
        Ok(Self { randomization_scale, ridge_term, max_iter, tol })
    }
}

impl Default for LassoOptions {
    fn default() -> Self {
        Self { randomization_scale: 1.0, ridge_term: None, max_iter: 5000, tol: 1e-12 }
    }
}

/// Fitted randomized LASSO.
///
/// - `coefficients`: `β̂`, length `p`, original column order.
/// - `randomization`: the `ω` used.
/// - `ridge_term`: the `ε` actually used.
/// - `outcome`: the selection event in active-first geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct LassoFit {
    pub coefficients: Array1<f64>,
    pub randomization: Array1<f64>,
    pub ridge_term: f64,
    pub outcome: SelectionOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomizedLasso {
    penalty: PenaltyWeights,
    options: LassoOptions,
}

impl RandomizedLasso {
    pub fn new(penalty: PenaltyWeights, options: LassoOptions) -> Self {
        Self { penalty, options }
    }

    pub fn penalty(&self) -> &PenaltyWeights {
        &self.penalty
    }

    pub fn options(&self) -> &LassoOptions {
        &self.options
    }

    /// Draw `ω ~ N(0, τ²I)` from `rng` and fit.
    ///
    /// # Errors
    /// See [`RandomizedLasso::fit_with_randomization`].
    pub fn fit<R: Rng + ?Sized>(
        &self, x: &ArrayView2<'_, f64>, y: &ArrayView1<'_, f64>, rng: &mut R,
    ) -> SelectionResult<LassoFit> {
        let tau = self.options.randomization_scale;
        let omega: Array1<f64> =
            (0..x.ncols()).map(|_| tau * rng.sample::<f64, _>(StandardNormal)).collect();
        self.fit_with_randomization(x, y, &omega.view())
    }

    /// Fit with a given randomization vector.
    ///
    /// Parameters
    /// ----------
    /// - `x`: `n × p` design.
    /// - `y`: length-`n` response.
    /// - `omega`: length-`p` randomization.
    ///
    /// Returns
    /// -------
    /// `SelectionResult<LassoFit>`
    ///
    /// Errors
    /// ------
    /// - Data validation errors (`EmptyDesign`, `DimensionMismatch`,
    ///   `NonFiniteData`, `PenaltyCoverage`).
    /// - `NoVariablesSelected` when every coefficient is zero.
    /// - `SingularMatrix` when `X_EᵀX_E` has no usable eigen-directions.
    /// - Outcome validation errors from [`SelectionOutcome::new`].
    pub fn fit_with_randomization(
        &self, x: &ArrayView2<'_, f64>, y: &ArrayView1<'_, f64>, omega: &ArrayView1<'_, f64>,
    ) -> SelectionResult<LassoFit> {
        validate_regression_data(x, y)?;
        let (n, p) = x.dim();
        self.penalty.check_covers(p)?;
        if omega.len() != p {
            return Err(SelectionError::DimensionMismatch {
                what: "randomization",
                expected: p,
                found: omega.len(),
            });
        }
        let ridge = self.options.ridge_term.unwrap_or(1.0 / (n as f64).sqrt());

        let beta = self.coordinate_descent(x, y, omega, ridge);
        let active: Vec<usize> = (0..p).filter(|&j| beta[j] != 0.0).collect();
        if active.is_empty() {
            return Err(SelectionError::NoVariablesSelected);
        }
        log::debug!("randomized lasso selected {} of {} variables", active.len(), p);

        let outcome = self.build_outcome(x, y, &beta, &active, ridge)?;
        Ok(LassoFit {
            coefficients: beta,
            randomization: omega.to_owned(),
            ridge_term: ridge,
            outcome,
        })
    }

    // ---- Helper Methods ----

    fn coordinate_descent(
        &self, x: &ArrayView2<'_, f64>, y: &ArrayView1<'_, f64>, omega: &ArrayView1<'_, f64>,
        ridge: f64,
    ) -> Array1<f64> {
        let p = x.ncols();
        let col_sq: Vec<f64> = (0..p).map(|j| x.column(j).dot(&x.column(j))).collect();
        let mut beta = Array1::<f64>::zeros(p);
        let mut residual = y.to_owned();

        for sweep in 0..self.options.max_iter {
            let mut max_change = 0.0_f64;
            for (j, lambda) in self.penalty.iter() {
                let denom = col_sq[j] + ridge;
                let old = beta[j];
                let new = if denom > 0.0 {
                    let rho = x.column(j).dot(&residual) + col_sq[j] * old + omega[j];
                    soft_threshold(rho, lambda) / denom
                } else {
                    0.0
                };
                if new != old {
                    residual.scaled_add(old - new, &x.column(j));
                    beta[j] = new;
                    max_change = max_change.max((new - old).abs());
                }
            }
            if max_change < self.options.tol {
                log::trace!("coordinate descent converged after {} sweeps", sweep + 1);
                return beta;
            }
        }
        log::warn!(
            "coordinate descent stopped at max_iter = {} before reaching tol = {}",
            self.options.max_iter,
            self.options.tol
        );
        beta
    }

    fn build_outcome(
        &self, x: &ArrayView2<'_, f64>, y: &ArrayView1<'_, f64>, beta: &Array1<f64>,
        active: &[usize], ridge: f64,
    ) -> SelectionResult<SelectionOutcome> {
        let (n, p) = x.dim();
        let e = active.len();
        let inactive: Vec<usize> = (0..p).filter(|j| !active.contains(j)).collect();
        let perm: Vec<usize> = active.iter().chain(inactive.iter()).copied().collect();

        let x_active = select_columns(x, active);
        let gram = x_active.t().dot(&x_active);
        let gram_inv = symmetric_inverse(&gram.view(), "active Gram block")?;
        let beta_bar = gram_inv.dot(&x_active.t().dot(y));
        let fitted = x_active.dot(&beta_bar);
        let residual = y - &fitted;

        let signs: Array1<f64> =
            active.iter().map(|&j| if beta[j] > 0.0 { 1.0 } else { -1.0 }).collect();
        let feasible_point: Array1<f64> = active.iter().map(|&j| beta[j].abs()).collect();

        // Cross-products x_{perm[r]}ᵀ x_{active[c]}.
        let x_perm = select_columns(x, &perm);
        let cross = x_perm.t().dot(&x_active);

        let mut linear_term = Array2::<f64>::zeros((p, p));
        let mut opt_linear = Array2::<f64>::zeros((p, e));
        for r in 0..p {
            for c in 0..e {
                linear_term[[r, c]] = -cross[[r, c]];
                let ridge_part = if r == c { ridge } else { 0.0 };
                opt_linear[[r, c]] = (cross[[r, c]] + ridge_part) * signs[c];
            }
            if r >= e {
                linear_term[[r, r]] = -1.0;
            }
        }

        let mut observed_score = Array1::<f64>::zeros(p);
        for c in 0..e {
            observed_score[c] = beta_bar[c];
        }
        for (k, &j) in inactive.iter().enumerate() {
            observed_score[e + k] = x.column(j).dot(&residual);
        }

        let lambda_active = self.penalty.gather(active)?;
        let mut opt_affine = Array1::<f64>::zeros(p);
        for c in 0..e {
            opt_affine[c] = lambda_active[c] * signs[c];
        }

        let mut score_target_cov = Array2::<f64>::zeros((p, e));
        score_target_cov.slice_mut(ndarray::s![..e, ..]).assign(&gram_inv);

        let dispersion = if n > e {
            residual.dot(&residual) / (n - e) as f64
        } else {
            let mean = y.mean().unwrap_or(0.0);
            y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n.max(2) - 1) as f64
        };

        let score = ScoreGeometry {
            linear_term,
            observed_score,
            score_target_cov,
            target_cov: gram_inv,
            observed_target: beta_bar,
        };
        let transform =
            OptimizationTransform { linear: opt_linear, affine: opt_affine, feasible_point };
        let inactive_lagrange = self.penalty.gather(&inactive)?;

        SelectionOutcome::new(
            p,
            active.to_vec(),
            signs,
            score,
            transform,
            inactive_lagrange,
            self.options.randomization_scale,
            dispersion,
        )
    }
}

/// Monte Carlo estimate of `σ·E max_j |X_jᵀZ|`, `Z ~ N(0, I_n)`.
///
/// The usual theoretical choice of a uniform penalty level for the
/// Gaussian LASSO.
///
/// # Errors
/// - `EmptyDesign`, `NonFiniteData`, `InvalidNoiseLevel`, or
///   `InvalidCount` when `draws == 0`.
pub fn theoretical_lambda<R: Rng + ?Sized>(
    x: &ArrayView2<'_, f64>, sigma: f64, rng: &mut R, draws: usize,
) -> SelectionResult<f64> {
    validate_design(x)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(SelectionError::InvalidNoiseLevel { value: sigma });
    }
    if draws == 0 {
        return Err(SelectionError::InvalidCount { name: "draws", value: draws });
    }
    let n = x.nrows();
    let mut total = 0.0;
    for _ in 0..draws {
        let z: Array1<f64> = (0..n).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();
        let scores = x.t().dot(&z);
        total += scores.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    }
    Ok(sigma * total / draws as f64)
}

pub(crate) fn soft_threshold(value: f64, lambda: f64) -> f64 {
    if value > lambda {
        value - lambda
    } else if value < -lambda {
        value + lambda
    } else {
        0.0
    }
}

pub(crate) fn validate_design(x: &ArrayView2<'_, f64>) -> SelectionResult<()> {
    let (rows, cols) = x.dim();
    if rows == 0 || cols == 0 {
        return Err(SelectionError::EmptyDesign { rows, cols });
    }
    if let Some((index, &value)) = x.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(SelectionError::NonFiniteData { what: "design", index, value });
    }
    Ok(())
}

pub(crate) fn validate_regression_data(
    x: &ArrayView2<'_, f64>, y: &ArrayView1<'_, f64>,
) -> SelectionResult<()> {
    validate_design(x)?;
    if y.len() != x.nrows() {
        return Err(SelectionError::DimensionMismatch {
            what: "response",
            expected: x.nrows(),
            found: y.len(),
        });
    }
    if let Some((index, &value)) = y.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(SelectionError::NonFiniteData { what: "response", index, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The closed-form solution on an orthonormal design.
    // - Reconstruction of ω from the outcome geometry (KKT identity) on a
    //   correlated random design.
    // - Empty selections and input validation.
    // - The Monte Carlo theoretical λ on a single unit column.
    // -------------------------------------------------------------------------

    fn unit_design() -> Array2<f64> {
        array![[1.0, 0.0], [0.0, 1.0], [0.0, 0.0], [0.0, 0.0]]
    }

    #[test]
    // Purpose
    // -------
    // On orthonormal columns with ε = 0 the LASSO is a soft threshold.
    //
    // Given
    // -----
    // - X = [e₁, e₂] in ℝ⁴, y = [3, 0.2, 0, 0], ω = 0, λ = 1.
    //
    // Expect
    // ------
    // - β̂ = [2, 0]; active [0]; β̄_E = 3; observed inactive score 0.2;
    //   dispersion 0.04/3.
    fn orthonormal_design_matches_soft_threshold() {
        // Arrange
        let x = unit_design();
        let y = array![3.0, 0.2, 0.0, 0.0];
        let omega = array![0.0, 0.0];
        let options = LassoOptions::new(1.0, Some(0.0), 100, 1e-12).unwrap();
        let lasso = RandomizedLasso::new(PenaltyWeights::uniform(2, 1.0).unwrap(), options);

        // Act
        let fit = lasso.fit_with_randomization(&x.view(), &y.view(), &omega.view()).unwrap();

        // Assert
        assert!((fit.coefficients[0] - 2.0).abs() < 1e-12);
        assert_eq!(fit.coefficients[1], 0.0);
        let outcome = &fit.outcome;
        assert_eq!(outcome.active(), &[0]);
        assert!((outcome.score().observed_target[0] - 3.0).abs() < 1e-12);
        assert!((outcome.score().observed_score[1] - 0.2).abs() < 1e-12);
        assert!((outcome.dispersion() - 0.04 / 3.0).abs() < 1e-12);
        assert!((outcome.transform().feasible_point[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The outcome geometry must reproduce the randomization through the
    // KKT conditions.
    //
    // Given
    // -----
    // - A seeded 40 × 5 Gaussian design with two signal columns, λ = 4,
    //   τ = 1, default ε.
    //
    // Expect
    // ------
    // - Active rows: ω_perm = L·score + B·o + a to 1e-6.
    // - Inactive rows: |ω_perm − (L·score + B·o + a)| ≤ λ_j.
    fn outcome_geometry_reproduces_randomization() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(7);
        let (n, p) = (40, 5);
        let x = Array2::from_shape_fn((n, p), |_| rng.sample::<f64, _>(StandardNormal));
        let mut y = Array1::from_shape_fn(n, |_| rng.sample::<f64, _>(StandardNormal));
        y.scaled_add(3.0, &x.column(0));
        y.scaled_add(-2.0, &x.column(3));
        let lasso =
            RandomizedLasso::new(PenaltyWeights::uniform(p, 4.0).unwrap(), LassoOptions::default());

        // Act
        let fit = lasso.fit(&x.view(), &y.view(), &mut rng).unwrap();

        // Assert
        let outcome = &fit.outcome;
        let e = outcome.n_active();
        let perm: Vec<usize> =
            outcome.active().iter().chain(outcome.inactive().iter()).copied().collect();
        let score = outcome.score();
        let transform = outcome.transform();
        let implied = score.linear_term.dot(&score.observed_score)
            + transform.linear.dot(&transform.feasible_point)
            + &transform.affine;
        for (r, &j) in perm.iter().enumerate() {
            let gap = fit.randomization[j] - implied[r];
            if r < e {
                assert!(gap.abs() < 1e-6, "active row {r}: gap {gap}");
            } else {
                assert!(gap.abs() <= outcome.inactive_lagrange()[r - e] + 1e-9);
            }
        }
        assert!(outcome.active().contains(&0) && outcome.active().contains(&3));
    }

    #[test]
    // Purpose
    // -------
    // A penalty that dominates every score selects nothing.
    //
    // Given
    // -----
    // - The orthonormal design with λ = 100 and ω = 0.
    //
    // Expect
    // ------
    // - `NoVariablesSelected`.
    fn huge_penalty_selects_nothing() {
        let x = unit_design();
        let y = array![3.0, 0.2, 0.0, 0.0];
        let lasso =
            RandomizedLasso::new(PenaltyWeights::uniform(2, 100.0).unwrap(), LassoOptions::default());
        let result = lasso.fit_with_randomization(&x.view(), &y.view(), &array![0.0, 0.0].view());
        assert_eq!(result, Err(SelectionError::NoVariablesSelected));
    }

    #[test]
    // Purpose
    // -------
    // Validate inputs before fitting.
    //
    // Given
    // -----
    // - A short response, a NaN response entry, a short ω, and bad options.
    //
    // Expect
    // ------
    // - The matching error variants.
    fn invalid_inputs_are_rejected() {
        let x = unit_design();
        let lasso =
            RandomizedLasso::new(PenaltyWeights::uniform(2, 1.0).unwrap(), LassoOptions::default());
        let omega = array![0.0, 0.0];

        let short = array![1.0, 2.0];
        assert!(matches!(
            lasso.fit_with_randomization(&x.view(), &short.view(), &omega.view()),
            Err(SelectionError::DimensionMismatch { what: "response", .. })
        ));
        let nan = array![1.0, f64::NAN, 0.0, 0.0];
        assert!(matches!(
            lasso.fit_with_randomization(&x.view(), &nan.view(), &omega.view()),
            Err(SelectionError::NonFiniteData { what: "response", index: 1, .. })
        ));
        let y = array![1.0, 0.0, 0.0, 0.0];
        assert!(matches!(
            lasso.fit_with_randomization(&x.view(), &y.view(), &array![0.0].view()),
            Err(SelectionError::DimensionMismatch { what: "randomization", .. })
        ));
        assert!(LassoOptions::new(0.0, None, 10, 1e-8).is_err());
        assert!(LassoOptions::new(1.0, Some(-1.0), 10, 1e-8).is_err());
        assert!(LassoOptions::new(1.0, None, 0, 1e-8).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Check the Monte Carlo λ against E|Z| = √(2/π) for one unit column.
    //
    // Given
    // -----
    // - X = e₁ ∈ ℝ³, σ = 2, 20 000 seeded draws.
    //
    // Expect
    // ------
    // - λ ≈ 2·√(2/π) within 0.05.
    fn theoretical_lambda_matches_half_normal_mean() {
        let x = array![[1.0], [0.0], [0.0]];
        let mut rng = StdRng::seed_from_u64(11);
        let lambda = theoretical_lambda(&x.view(), 2.0, &mut rng, 20_000).unwrap();
        let expected = 2.0 * (2.0 / std::f64::consts::PI).sqrt();
        assert!((lambda - expected).abs() < 0.05, "lambda = {lambda}");
        assert!(theoretical_lambda(&x.view(), 0.0, &mut rng, 10).is_err());
    }
}
