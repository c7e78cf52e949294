//! Least-squares polynomial fitting.
//!
//! Given measured counts `x_i` and engineering units `y_i`, we solve for the
//! coefficients of `y = c0 + c1·x + ... + cd·x^d`.
//!
//! Raw PLC counts run into the tens of thousands, so the Vandermonde columns
//! differ by many orders of magnitude. Each column is divided by its largest
//! absolute entry before solving and the coefficients are unscaled afterwards.
//! The scaled system is what the singularity check looks at.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::FitResult;
use crate::error::CalError;
use crate::math::solve_least_squares;
use crate::models::{evaluate_coefficients, fill_design_row};
use crate::stats::fit_quality;

/// Smallest accepted `σ_min / σ_max` of the column-scaled design matrix.
pub const MIN_RCOND: f64 = 1e-12;

/// Scaled coefficients below this fraction of the largest one are set to zero.
pub const ZERO_SNAP: f64 = 1e-12;

/// Fit a polynomial of the given degree to `(counts, eus)`.
pub fn fit(counts: &[i64], eus: &[f64], degree: usize) -> Result<FitResult, CalError> {
    if degree == 0 {
        return Err(CalError::validation("fit", "degree", "polynomial degree must be at least 1"));
    }
    if counts.len() != eus.len() {
        return Err(CalError::validation(
            "fit",
            "actEus",
            format!("{} counts but {} EU values", counts.len(), eus.len()),
        ));
    }

    let n = counts.len();
    if n <= degree {
        return Err(CalError::UnderdeterminedFit { samples: n, degree });
    }

    let distinct = distinct_count(counts);
    if distinct <= degree {
        return Err(CalError::SingularFit {
            degree,
            detail: format!(
                "only {distinct} distinct count values for {} coefficients",
                degree + 1
            ),
        });
    }

    let p = degree + 1;
    let xs: Vec<f64> = counts.iter().map(|&c| c as f64).collect();

    // Column scale = max |x_i|^k over the samples.
    let mut scales = vec![0.0_f64; p];
    let mut row = vec![0.0; p];
    for &x in &xs {
        fill_design_row(x, &mut row);
        for (s, v) in scales.iter_mut().zip(row.iter()) {
            *s = s.max(v.abs());
        }
    }
    if let Some(k) = scales.iter().position(|s| !s.is_finite()) {
        return Err(CalError::SingularFit {
            degree,
            detail: format!("count^{k} overflows f64; lower the degree"),
        });
    }
    for s in scales.iter_mut() {
        if *s == 0.0 {
            *s = 1.0;
        }
    }

    let mut design = DMatrix::<f64>::zeros(n, p);
    for (i, &x) in xs.iter().enumerate() {
        fill_design_row(x, &mut row);
        for k in 0..p {
            design[(i, k)] = row[k] / scales[k];
        }
    }
    let y = DVector::from_iterator(n, eus.iter().copied());

    let solved = solve_least_squares(&design, &y, MIN_RCOND).map_err(|s| CalError::SingularFit {
        degree,
        detail: format!("reciprocal condition {:.3e} is below {MIN_RCOND:e}", s.rcond),
    })?;

    let largest = solved.beta.amax();
    let coefficients: Vec<f64> = solved
        .beta
        .iter()
        .zip(scales.iter())
        .map(|(&g, &s)| if g.abs() < ZERO_SNAP * largest { 0.0 } else { g / s })
        .collect();

    let quality = fit_quality(&coefficients, counts, eus);
    debug!(
        degree,
        rcond = solved.rcond,
        sse = quality.sse,
        ?coefficients,
        "polynomial fit solved"
    );

    Ok(FitResult {
        degree,
        coefficients,
        quality,
        rcond: solved.rcond,
    })
}

/// Evaluate a fitted polynomial at a count.
pub fn evaluate(fit: &FitResult, x: f64) -> f64 {
    evaluate_coefficients(&fit.coefficients, x)
}

fn distinct_count(counts: &[i64]) -> usize {
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}
