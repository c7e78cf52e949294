//! Least squares solver.
//!
//! Every calibration fit is a small linear regression:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! where `x_i` is a row of the (column-scaled) Vandermonde matrix.
//!
//! Implementation choices:
//! - We solve with SVD so tall design matrices (more samples than
//!   coefficients) work directly. (Nalgebra's `QR::solve` is intended for
//!   square systems and will panic for non-square matrices.)
//! - The ratio of smallest to largest singular value is reported back so the
//!   caller can reject numerically singular systems with an explicit tolerance.

use nalgebra::{DMatrix, DVector};

/// A solved least-squares system.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub beta: DVector<f64>,
    /// `σ_min / σ_max` of the design matrix.
    pub rcond: f64,
}

/// The design matrix was too ill-conditioned to solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingularSystem {
    pub rcond: f64,
}

/// Solve a least squares problem using SVD.
///
/// Fails when the inputs are not finite, when `σ_min / σ_max < min_rcond`, or
/// when the solution is not finite.
pub fn solve_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    min_rcond: f64,
) -> Result<LeastSquares, SingularSystem> {
    // SVD does not converge on NaN/inf entries.
    if !(x.iter().all(|v| v.is_finite()) && y.iter().all(|v| v.is_finite())) {
        return Err(SingularSystem { rcond: 0.0 });
    }

    let svd = x.clone().svd(true, true);

    let sv_max = svd.singular_values.max();
    let sv_min = svd.singular_values.min();
    let rcond = if sv_max > 0.0 { sv_min / sv_max } else { 0.0 };
    if !rcond.is_finite() || rcond < min_rcond {
        return Err(SingularSystem { rcond });
    }

    let eps = f64::EPSILON * sv_max;
    match svd.solve(y, eps) {
        Ok(beta) if beta.iter().all(|v| v.is_finite()) => Ok(LeastSquares { beta, rcond }),
        _ => Err(SingularSystem { rcond }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let ls = solve_least_squares(&x, &y, 1e-12).unwrap();
        assert!((ls.beta[0] - 2.0).abs() < 1e-10);
        assert!((ls.beta[1] - 3.0).abs() < 1e-10);
        assert!(ls.rcond > 0.0 && ls.rcond <= 1.0);
    }

    #[test]
    fn duplicate_columns_are_singular() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);

        let err = solve_least_squares(&x, &y, 1e-12).unwrap_err();
        assert!(err.rcond < 1e-12);
    }

    #[test]
    fn non_finite_entries_are_rejected_before_svd() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, f64::NAN, 1.0, f64::INFINITY]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(solve_least_squares(&x, &y, 1e-12).unwrap_err(), SingularSystem { rcond: 0.0 });

        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0, f64::NAN, 3.0]);
        assert!(solve_least_squares(&x, &y, 1e-12).is_err());
    }
}
