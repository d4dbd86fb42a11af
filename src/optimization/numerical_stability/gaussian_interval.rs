//! numerical_stability::gaussian_interval — stable `-log P(interval)` for
//! Gaussian randomization.
//!
//! Purpose
//! -------
//! Evaluate `-log P(lower ≤ τZ - arg ≤ upper)` for `Z ~ N(0, 1)` and its
//! derivative with respect to `arg`, i.e.
//!
//! ```text
//! p(arg) = Φ((arg + upper)/τ) - Φ((arg + lower)/τ)
//! ```
//!
//! This is the exact integral of an isotropic Gaussian randomization over a
//! box (the inactive-coordinate cube `[-λ, λ]`, or the stage-one threshold
//! band of a two-step selection).
//!
//! Key behaviors
//! -------------
//! - Regular branch: difference of upper-tail survival functions when both
//!   standardized endpoints are positive, plain CDF difference otherwise.
//! - Asymptotic branch: when `p(arg)` falls below a tunable underflow
//!   threshold and both endpoints lie in the same tail, the Mills-ratio
//!   expansion `Q(x) ≈ φ(x)/x` is used, giving a quadratic-in-argument value
//!   plus a bounded log correction. The `½ log 2π` constant keeps the value
//!   continuous with the regular branch.
//! - In both branches `gradient` is the derivative of the returned `value`,
//!   so a descent that follows it decreases the function it evaluates.
//!
//! Invariants & assumptions
//! ------------------------
//! - `lower < upper`; `upper` may be `+∞` and `lower` may be `-∞`.
//! - `scale > 0` and `0 < underflow_threshold < 1` are validated by the
//!   owners of these parameters.
//!
//! Testing notes
//! -------------
//! - Derivatives are checked against finite differences in both branches.
//! - Near the switch point the two branches agree to within the accuracy
//!   of the first-order Mills expansion.
use crate::optimization::errors::{OptError, OptResult};
use ndarray::Array1;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Default probability below which the asymptotic tail branch is used.
pub const DEFAULT_UNDERFLOW_THRESHOLD: f64 = 1e-10;

const HALF_LN_TWO_PI: f64 = 0.918_938_533_204_672_8;

/// Value and derivative of `-log P(interval)` at one argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalLogProbability {
    pub value: f64,
    pub gradient: f64,
}

/// Validate an underflow threshold.
///
/// # Errors
/// - [`OptError::InvalidUnderflowThreshold`] unless `0 < threshold < 1`.
pub fn verify_underflow_threshold(threshold: f64) -> OptResult<()> {
    if !threshold.is_finite() || threshold <= 0.0 || threshold >= 1.0 {
        return Err(OptError::InvalidUnderflowThreshold { value: threshold });
    }
    Ok(())
}

/// Negative log-probability of a Gaussian interval event and its derivative.
///
/// Parameters
/// ----------
/// - `arg`: `f64`
///   Location of the event in randomization units.
/// - `lower`, `upper`: `f64`
///   Interval endpoints, `lower < upper`, infinite endpoints allowed.
/// - `scale`: `f64`
///   Randomization standard deviation τ > 0.
/// - `underflow_threshold`: `f64`
///   Probability below which the asymptotic branch is used.
///
/// Returns
/// -------
/// `IntervalLogProbability`
///   `value = -log p(arg)` and `gradient = d value / d arg`.
///
/// Notes
/// -----
/// - Upper tail (`lo > 0`): `p ≈ φ(lo)·m` with `m = 1/lo - r/hi` and
///   `r = exp(-(hi² - lo²)/2)`; the gradient is `(lo - m'/m)/τ`, `m'` taken
///   with both endpoints shifted together.
/// - Lower tail (`hi < 0`): the mirror image with `m = 1/|hi| - r/|lo|`,
///   `r = exp(-(lo² - hi²)/2)` and gradient `(hi - m'/m)/τ`.
/// - If the interval straddles zero the regular branch is always used;
///   the probability there is bounded below unless the interval is
///   degenerate, in which case it is floored at `f64::MIN_POSITIVE`.
pub fn neg_log_interval_probability(
    arg: f64, lower: f64, upper: f64, scale: f64, underflow_threshold: f64,
) -> IntervalLogProbability {
    let normal = Normal::standard();
    let lo = (arg + lower) / scale;
    let hi = (arg + upper) / scale;

    let prob = if lo > 0.0 { normal.sf(lo) - normal.sf(hi) } else { normal.cdf(hi) - normal.cdf(lo) };

    if prob > underflow_threshold || (lo <= 0.0 && hi >= 0.0) {
        let prob = prob.max(f64::MIN_POSITIVE);
        let density_gap = normal.pdf(lo) - normal.pdf(hi);
        return IntervalLogProbability { value: -prob.ln(), gradient: density_gap / (scale * prob) };
    }

    if lo > 0.0 {
        let ratio = (-(hi - lo) * (hi + lo) / 2.0).exp();
        let mills = 1.0 / lo - ratio / hi;
        let far = if hi.is_finite() { ratio * ((hi - lo) / hi + 1.0 / (hi * hi)) } else { 0.0 };
        let mills_slope = -1.0 / (lo * lo) + far;
        IntervalLogProbability {
            value: lo * lo / 2.0 + HALF_LN_TWO_PI - mills.ln(),
            gradient: (lo - mills_slope / mills) / scale,
        }
    } else {
        let (near, far_end) = (-hi, -lo);
        let ratio = (-(far_end - near) * (far_end + near) / 2.0).exp();
        let mills = 1.0 / near - ratio / far_end;
        let far = if lo.is_finite() {
            ratio * ((far_end - near) / far_end + 1.0 / (far_end * far_end))
        } else {
            0.0
        };
        let mills_slope = 1.0 / (near * near) - far;
        IntervalLogProbability {
            value: near * near / 2.0 + HALF_LN_TWO_PI - mills.ln(),
            gradient: (hi - mills_slope / mills) / scale,
        }
    }
}

/// Sum of `-log P(|τZ - arg_k| ≤ λ_k)` over the coordinates of a cube.
///
/// Returns the total value and the coordinate-wise gradient.
///
/// # Errors
/// - [`OptError::DimensionMismatch`] if `arg` and `lagrange` differ in length.
pub fn neg_log_cube_probability(
    arg: &Array1<f64>, lagrange: &Array1<f64>, scale: f64, underflow_threshold: f64,
) -> OptResult<(f64, Array1<f64>)> {
    if arg.len() != lagrange.len() {
        return Err(OptError::DimensionMismatch {
            what: "cube probability argument",
            expected: lagrange.len(),
            found: arg.len(),
        });
    }
    let mut total = 0.0;
    let mut grad = Array1::<f64>::zeros(arg.len());
    for (k, (&a, &l)) in arg.iter().zip(lagrange.iter()).enumerate() {
        let term = neg_log_interval_probability(a, -l, l, scale, underflow_threshold);
        total += term.value;
        grad[k] = term.gradient;
    }
    Ok((total, grad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement with a direct `-log(Φ - Φ)` on well-conditioned inputs.
    // - Derivative correctness in the regular and both asymptotic branches.
    // - Continuity across the branch switch and the infinite-endpoint case.
    // - Vector cube helper and its dimension check.
    // -------------------------------------------------------------------------

    fn fd_gradient(arg: f64, lower: f64, upper: f64, scale: f64, threshold: f64) -> f64 {
        let h = 1e-6;
        (neg_log_interval_probability(arg + h, lower, upper, scale, threshold).value
            - neg_log_interval_probability(arg - h, lower, upper, scale, threshold).value)
            / (2.0 * h)
    }

    #[test]
    // Purpose
    // -------
    // Match the textbook formula where no cancellation occurs.
    //
    // Given
    // -----
    // - arg = 0.4, box [-1, 1], τ = 0.8.
    //
    // Expect
    // ------
    // - `value == -ln(Φ(1.75) - Φ(-0.75))` to 1e-12.
    fn regular_branch_matches_direct_formula() {
        // Arrange
        let normal = Normal::standard();
        let expected = -(normal.cdf((0.4 + 1.0) / 0.8) - normal.cdf((0.4 - 1.0) / 0.8)).ln();

        // Act
        let out = neg_log_interval_probability(0.4, -1.0, 1.0, 0.8, DEFAULT_UNDERFLOW_THRESHOLD);

        // Assert
        assert!((out.value - expected).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Check analytic gradients against finite differences of the returned
    // value in every branch.
    //
    // Given
    // -----
    // - Box [-1, 1], τ = 1, arguments in the interior (0.3), the regular
    //   tail (2.5), the upper asymptotic tail (9.0), and the lower asymptotic
    //   tail (-9.5).
    // - One-sided bands at τ = 0.7: [1.5, ∞) at arg = 12 and (-∞, -1.5] at
    //   arg = -12, both deep in the asymptotic branch.
    //
    // Expect
    // ------
    // - Relative agreement within 1e-4.
    fn gradient_matches_finite_differences_in_all_branches() {
        let cases = [
            (0.3, -1.0, 1.0, 1.0),
            (2.5, -1.0, 1.0, 1.0),
            (9.0, -1.0, 1.0, 1.0),
            (-9.5, -1.0, 1.0, 1.0),
            (12.0, 1.5, f64::INFINITY, 0.7),
            (-12.0, f64::NEG_INFINITY, -1.5, 0.7),
        ];
        for &(arg, lower, upper, scale) in &cases {
            // Act
            let out =
                neg_log_interval_probability(arg, lower, upper, scale, DEFAULT_UNDERFLOW_THRESHOLD);
            let fd = fd_gradient(arg, lower, upper, scale, DEFAULT_UNDERFLOW_THRESHOLD);

            // Assert
            assert!(
                (out.gradient - fd).abs() <= 1e-4 * (1.0 + fd.abs()),
                "arg={arg}, band=[{lower}, {upper}]: analytic {} vs fd {fd}",
                out.gradient
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // Following the asymptotic-branch gradient must lower the returned value.
    //
    // Given
    // -----
    // - Box [-1, 1], τ = 1, arg = 9.0 (probability far below 1e-10).
    //
    // Expect
    // ------
    // - A small step against the gradient decreases `value` by about
    //   `step · gradient²`.
    fn asymptotic_gradient_is_a_descent_direction() {
        // Arrange
        let step = 1e-4;
        let here = neg_log_interval_probability(9.0, -1.0, 1.0, 1.0, DEFAULT_UNDERFLOW_THRESHOLD);

        // Act
        let moved = neg_log_interval_probability(
            9.0 - step * here.gradient,
            -1.0,
            1.0,
            1.0,
            DEFAULT_UNDERFLOW_THRESHOLD,
        );

        // Assert
        let predicted = step * here.gradient * here.gradient;
        let actual = here.value - moved.value;
        assert!(actual > 0.0);
        assert!((actual - predicted).abs() < 0.05 * predicted, "{actual} vs {predicted}");
    }

    #[test]
    // Purpose
    // -------
    // Ensure the asymptotic branch stays close to the regular one at the
    // switch point, for both tails.
    //
    // Given
    // -----
    // - Box [-1, 1], τ = 1, threshold 1e-3 so the regular branch is still
    //   accurate on both sides of the switch.
    //
    // Expect
    // ------
    // - Across a fine sweep of arguments the value never jumps by more than
    //   0.1 between neighbours.
    fn branches_are_nearly_continuous() {
        for &sign in &[1.0, -1.0] {
            let mut previous: Option<f64> = None;
            for k in 0..400 {
                // Arrange
                let arg = sign * (2.0 + k as f64 * 0.01);

                // Act
                let value = neg_log_interval_probability(arg, -1.0, 1.0, 1.0, 1e-3).value;

                // Assert
                if let Some(prev) = previous {
                    assert!((value - prev).abs() < 0.1, "jump at arg={arg}: {prev} -> {value}");
                }
                previous = Some(value);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Support a one-sided band with an infinite upper endpoint.
    //
    // Given
    // -----
    // - Band [1.5, ∞), τ = 0.7, arguments -12, 0, and 12.
    //
    // Expect
    // ------
    // - At arg = 0, value equals `-ln Φ̄(1.5/0.7)`.
    // - At arg = -12 the event is almost sure: value ≈ 0, gradient ≥ 0.
    // - At arg = 12 (asymptotic branch) the value is finite and the gradient
    //   is positive, since `P = Φ̄((arg + 1.5)/0.7)` falls as `arg` grows; it
    //   matches a finite difference.
    fn infinite_upper_endpoint_is_supported() {
        // Arrange
        let normal = Normal::standard();
        let expected = -normal.sf(1.5 / 0.7).ln();
        let eval = |arg: f64| {
            neg_log_interval_probability(arg, 1.5, f64::INFINITY, 0.7, DEFAULT_UNDERFLOW_THRESHOLD)
        };

        // Act
        let certain = eval(-12.0);
        let at_zero = eval(0.0);
        let rare = eval(12.0);
        let fd = fd_gradient(12.0, 1.5, f64::INFINITY, 0.7, DEFAULT_UNDERFLOW_THRESHOLD);

        // Assert
        assert!((at_zero.value - expected).abs() < 1e-10);
        assert!(certain.value.abs() < 1e-12);
        assert!(certain.gradient >= 0.0 && certain.gradient.is_finite());
        assert!(rare.value.is_finite() && rare.gradient > 0.0);
        assert!((rare.gradient - fd).abs() <= 1e-4 * (1.0 + fd.abs()));
    }

    #[test]
    // Purpose
    // -------
    // Check the vector cube helper sums terms and validates shapes.
    //
    // Given
    // -----
    // - arg = [0.1, -2.0], λ = [1.0, 0.5], τ = 1.
    //
    // Expect
    // ------
    // - Total equals the sum of scalar evaluations; gradient entries match.
    // - Mismatched lengths return `DimensionMismatch`.
    fn cube_probability_sums_coordinates() {
        // Arrange
        let arg = array![0.1, -2.0];
        let lagrange = array![1.0, 0.5];

        // Act
        let (total, grad) =
            neg_log_cube_probability(&arg, &lagrange, 1.0, DEFAULT_UNDERFLOW_THRESHOLD).unwrap();

        // Assert
        let a = neg_log_interval_probability(0.1, -1.0, 1.0, 1.0, DEFAULT_UNDERFLOW_THRESHOLD);
        let b = neg_log_interval_probability(-2.0, -0.5, 0.5, 1.0, DEFAULT_UNDERFLOW_THRESHOLD);
        assert!((total - a.value - b.value).abs() < 1e-12);
        assert!((grad[0] - a.gradient).abs() < 1e-12);
        assert!((grad[1] - b.gradient).abs() < 1e-12);
        assert!(matches!(
            neg_log_cube_probability(&arg, &array![1.0], 1.0, 1e-10),
            Err(OptError::DimensionMismatch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Validate the threshold checker.
    //
    // Given
    // -----
    // - Thresholds 0, 1, NaN, and 1e-10.
    //
    // Expect
    // ------
    // - Only 1e-10 is accepted.
    fn underflow_threshold_validation() {
        assert!(verify_underflow_threshold(0.0).is_err());
        assert!(verify_underflow_threshold(1.0).is_err());
        assert!(verify_underflow_threshold(f64::NAN).is_err());
        assert!(verify_underflow_threshold(1e-10).is_ok());
    }
}
