//! Polynomial evaluation.
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a given count (for least squares)
//! - evaluate the polynomial at a count (for derived stats/plots)
//!
//! Coefficients are stored in ascending power order: `c[0] + c[1]·x + c[2]·x² + ...`

/// Fill a Vandermonde design row: `out[k] = x^k`.
pub fn fill_design_row(x: f64, out: &mut [f64]) {
    let mut p = 1.0;
    for v in out.iter_mut() {
        *v = p;
        p *= x;
    }
}

/// Evaluate the polynomial at `x` (Horner's method).
pub fn evaluate_coefficients(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}
