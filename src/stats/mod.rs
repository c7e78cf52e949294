//! Derived statistics: EU at the configured bounds, per-sample errors, fit quality.
//!
//! Everything here is a pure function of a fit and the measured samples and
//! returns fresh values; the record is never touched.

use tracing::warn;

use crate::domain::{CalibrationRecord, DerivedStats, FitQuality, FitResult, RangePolicy, SampleErrors};
use crate::error::CalError;
use crate::fit::evaluate;
use crate::models::evaluate_coefficients;

/// EU predicted by the fit at the configured min and max counts.
pub fn compute_bounds(fit: &FitResult, min_count: i64, max_count: i64) -> (f64, f64) {
    (evaluate(fit, min_count as f64), evaluate(fit, max_count as f64))
}

/// Calculated EU, absolute error and percent-of-range error for every sample.
pub fn compute_errors(
    fit: &FitResult,
    counts: &[i64],
    eus: &[f64],
    eu_range: f64,
) -> Result<SampleErrors, CalError> {
    if eu_range == 0.0 || !eu_range.is_finite() {
        return Err(CalError::DegenerateRange { eu_range });
    }
    let mut errors = compute_abs_errors(fit, counts, eus);
    errors.pct_error = Some(errors.abs_error.iter().map(|e| e / eu_range * 100.0).collect());
    Ok(errors)
}

/// Like [`compute_errors`] but without percent error.
pub fn compute_abs_errors(fit: &FitResult, counts: &[i64], eus: &[f64]) -> SampleErrors {
    let calculated_eu: Vec<f64> = counts.iter().map(|&c| evaluate(fit, c as f64)).collect();
    let abs_error = calculated_eu.iter().zip(eus.iter()).map(|(c, m)| c - m).collect();
    SampleErrors {
        calculated_eu,
        abs_error,
        pct_error: None,
    }
}

/// Bounds plus per-sample errors for one record.
pub fn derive_stats(
    fit: &FitResult,
    record: &CalibrationRecord,
    policy: RangePolicy,
) -> Result<DerivedStats, CalError> {
    let (eu_at_min, eu_at_max) = compute_bounds(fit, record.count_bounds.min, record.count_bounds.max);

    let errors = match compute_errors(fit, &record.counts, &record.eus, record.eu_bounds.range()) {
        Ok(e) => e,
        Err(err @ CalError::DegenerateRange { .. }) if policy == RangePolicy::AbsoluteOnly => {
            warn!(instrument = %record.instrument, "{err}; reporting absolute error only");
            compute_abs_errors(fit, &record.counts, &record.eus)
        }
        Err(e) => return Err(e),
    };

    Ok(DerivedStats {
        eu_at_min,
        eu_at_max,
        errors,
    })
}

/// SSE, RMSE and R² of a polynomial against the samples.
pub fn fit_quality(coefficients: &[f64], counts: &[i64], eus: &[f64]) -> FitQuality {
    let n = counts.len().min(eus.len());
    let sse: f64 = counts
        .iter()
        .zip(eus.iter())
        .map(|(&c, &y)| {
            let r = y - evaluate_coefficients(coefficients, c as f64);
            r * r
        })
        .sum();
    let rmse = if n > 0 { (sse / n as f64).sqrt() } else { 0.0 };

    let mean = if n > 0 { eus.iter().take(n).sum::<f64>() / n as f64 } else { 0.0 };
    let sst: f64 = eus.iter().take(n).map(|y| (y - mean) * (y - mean)).sum();
    let r_squared = if sst > 0.0 { Some(1.0 - sse / sst) } else { None };

    FitQuality {
        sse,
        rmse,
        r_squared,
        n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use crate::domain::{CountBounds, EuBounds};
    use crate::fit::fit;

    fn record(counts: Vec<i64>, eus: Vec<f64>, eu_bounds: EuBounds) -> CalibrationRecord {
        CalibrationRecord {
            instrument: "PT-100".to_string(),
            cal_date: NaiveDate::from_ymd_opt(2017, 10, 5)
                .unwrap()
                .and_hms_opt(12, 10, 0)
                .unwrap(),
            eu_units: "psi".to_string(),
            count_bounds: CountBounds { min: 0, max: 100 },
            eu_bounds,
            counts,
            eus,
            notes: None,
            equipment: None,
            doc_title: None,
        }
    }

    #[test]
    fn three_point_linear_scenario() {
        let rec = record(vec![0, 50, 100], vec![0.0, 5.0, 10.0], EuBounds { min: 0.0, max: 10.0 });
        let f = fit(&rec.counts, &rec.eus, 1).unwrap();
        assert_abs_diff_eq!(f.coefficients[1], 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(f.coefficients[0], 0.0, epsilon = 1e-9);

        let stats = derive_stats(&f, &rec, RangePolicy::Strict).unwrap();
        assert_abs_diff_eq!(stats.eu_at_min, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.eu_at_max, 10.0, epsilon = 1e-9);
        for e in &stats.errors.abs_error {
            assert_abs_diff_eq!(*e, 0.0, epsilon = 1e-9);
        }
        for e in stats.errors.pct_error.as_ref().unwrap() {
            assert_abs_diff_eq!(*e, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn errors_are_calculated_minus_measured() {
        let f = fit(&[0, 100], &[0.0, 10.0], 1).unwrap();
        let errs = compute_errors(&f, &[0, 50, 100], &[0.5, 5.0, 9.0], 20.0).unwrap();
        assert_abs_diff_eq!(errs.calculated_eu[1], 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(errs.abs_error[0], -0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(errs.abs_error[2], 1.0, epsilon = 1e-9);
        let pct = errs.pct_error.unwrap();
        assert_abs_diff_eq!(pct[0], -2.5, epsilon = 1e-9);
        assert_abs_diff_eq!(pct[2], 5.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_range_is_degenerate() {
        let f = fit(&[0, 100], &[0.0, 10.0], 1).unwrap();
        let err = compute_errors(&f, &[0, 100], &[0.0, 10.0], 0.0).unwrap_err();
        assert!(matches!(err, CalError::DegenerateRange { .. }));
    }

    #[test]
    fn policy_controls_degenerate_range() {
        let rec = record(vec![0, 50, 100], vec![0.0, 5.0, 10.0], EuBounds { min: 3.0, max: 3.0 });
        let f = fit(&rec.counts, &rec.eus, 1).unwrap();

        let err = derive_stats(&f, &rec, RangePolicy::Strict).unwrap_err();
        assert_eq!(err, CalError::DegenerateRange { eu_range: 0.0 });

        let stats = derive_stats(&f, &rec, RangePolicy::AbsoluteOnly).unwrap();
        assert!(stats.errors.pct_error.is_none());
        assert_eq!(stats.errors.abs_error.len(), 3);
    }

    #[test]
    fn quality_of_perfect_and_imperfect_fits() {
        let q = fit_quality(&[0.0, 0.1], &[0, 50, 100], &[0.0, 5.0, 10.0]);
        assert_abs_diff_eq!(q.sse, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(q.r_squared.unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(q.n, 3);

        let q = fit_quality(&[0.0, 0.1], &[0, 50, 100], &[1.0, 5.0, 10.0]);
        assert_abs_diff_eq!(q.sse, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(q.rmse, (1.0_f64 / 3.0).sqrt(), epsilon = 1e-12);

        let q = fit_quality(&[2.0], &[0, 1], &[2.0, 2.0]);
        assert!(q.r_squared.is_none());
    }
}
