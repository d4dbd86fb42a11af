//! selection::linalg — Gram-block inverses and design slicing.
//!
//! Purpose
//! -------
//! Bridge `ndarray` designs into `nalgebra` for the small dense inverses the
//! selection geometry needs (`(X_EᵀX_E)⁻¹`), and provide the column slicing
//! used to split a design into active and inactive blocks.
//!
//! Key behaviors
//! -------------
//! - [`symmetric_inverse`]: Cholesky inverse of a symmetric matrix, falling
//!   back to an eigen pseudo-inverse when the matrix is not numerically
//!   positive definite.
//! - [`select_columns`]: owned copy of the requested columns, in the order
//!   requested.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs to [`symmetric_inverse`] are square and symmetric up to
//!   rounding; only the lower triangle is trusted by the Cholesky path.
//! - Eigenvalues at or below `EIGEN_EPS · max(1, λ_max)` are dropped by the
//!   pseudo-inverse.
use crate::{
    optimization::numerical_stability::EIGEN_EPS,
    selection::errors::{SelectionError, SelectionResult},
};
use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView2, Axis};

/// Copy an `ndarray` matrix into a column-major `DMatrix`.
pub fn to_dmatrix(a: &ArrayView2<'_, f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Copy a `DMatrix` back into an `ndarray` matrix.
pub fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Inverse of a symmetric positive (semi-)definite matrix.
///
/// Parameters
/// ----------
/// - `a`: `&ArrayView2<f64>`
///   Square symmetric matrix, typically a Gram block `X_EᵀX_E`.
/// - `what`: `&'static str`
///   Label used in errors and log messages.
///
/// Returns
/// -------
/// `SelectionResult<Array2<f64>>`
///   `A⁻¹` when Cholesky succeeds; otherwise the Moore–Penrose inverse built
///   from the eigen-directions above the truncation threshold.
///
/// Errors
/// ------
/// - [`SelectionError::DimensionMismatch`] for a non-square input.
/// - [`SelectionError::SingularMatrix`] when no eigenvalue survives the
///   truncation.
pub fn symmetric_inverse(a: &ArrayView2<'_, f64>, what: &'static str) -> SelectionResult<Array2<f64>> {
    if a.nrows() != a.ncols() {
        return Err(SelectionError::DimensionMismatch { what, expected: a.nrows(), found: a.ncols() });
    }
    let m = to_dmatrix(a);
    if let Some(chol) = m.clone().cholesky() {
        return Ok(from_dmatrix(&chol.inverse()));
    }

    log::debug!("{what}: Cholesky failed, using eigen pseudo-inverse");
    let eigen = m.symmetric_eigen();
    let largest = eigen.eigenvalues.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = EIGEN_EPS * largest.max(1.0);
    let n = a.nrows();
    let mut inverse = Array2::<f64>::zeros((n, n));
    let mut kept = 0;
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= cutoff {
            continue;
        }
        kept += 1;
        for i in 0..n {
            let qi = eigen.eigenvectors[(i, k)] / lambda;
            for j in 0..n {
                inverse[[i, j]] += qi * eigen.eigenvectors[(j, k)];
            }
        }
    }
    if kept == 0 {
        return Err(SelectionError::SingularMatrix { what });
    }
    Ok(inverse)
}

/// Owned copy of `columns` of `x`, in the order given.
pub fn select_columns(x: &ArrayView2<'_, f64>, columns: &[usize]) -> Array2<f64> {
    x.select(Axis(1), columns)
}
