//! Report assembly: per-sample rows, polynomial description, text report.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for golden tests)

use crate::domain::{CalibrationRecord, DerivedStats, FitQuality, FitResult, OffsetCompensation};

pub mod format;

pub use format::format_report;

/// Significant digits used for polynomial coefficients.
pub const COEFF_SIG_DIGITS: usize = 6;

/// One measured sample with its calculated value and errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub measured_count: i64,
    pub measured_eu: f64,
    pub calculated_eu: f64,
    pub abs_error: f64,
    pub pct_error: Option<f64>,
}

/// Everything a renderer needs for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    pub rows: Vec<ReportRow>,
    pub polynomial: String,
    pub degree: usize,
    pub eu_at_min: f64,
    pub eu_at_max: f64,
    pub quality: FitQuality,
    pub offset: Option<OffsetReport>,
}

/// The offset-compensation block of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetReport {
    pub count_offset: f64,
    pub adjusted_counts: Vec<i64>,
    pub polynomial: String,
    pub eu_at_min: f64,
    pub eu_at_max: f64,
}

/// Build the report rows in original sample order.
pub fn assemble(
    record: &CalibrationRecord,
    fit: &FitResult,
    stats: &DerivedStats,
    offset: Option<&OffsetCompensation>,
) -> CalibrationReport {
    let rows = record
        .counts
        .iter()
        .zip(record.eus.iter())
        .enumerate()
        .map(|(i, (&count, &eu))| ReportRow {
            measured_count: count,
            measured_eu: eu,
            calculated_eu: stats.errors.calculated_eu[i],
            abs_error: stats.errors.abs_error[i],
            pct_error: stats.errors.pct_error.as_ref().map(|p| p[i]),
        })
        .collect();

    CalibrationReport {
        rows,
        polynomial: describe_polynomial(fit),
        degree: fit.degree,
        eu_at_min: stats.eu_at_min,
        eu_at_max: stats.eu_at_max,
        quality: fit.quality.clone(),
        offset: offset.map(|o| OffsetReport {
            count_offset: o.count_offset,
            adjusted_counts: o.adjusted_counts.clone(),
            polynomial: describe_polynomial(&o.fit),
            eu_at_min: o.eu_at_min,
            eu_at_max: o.eu_at_max,
        }),
    }
}

/// Human-readable polynomial, e.g. `0.00305176x - 3.86047`.
///
/// Terms run from the highest power down; exactly-zero coefficients are
/// omitted. Coefficients use [`COEFF_SIG_DIGITS`] significant digits.
pub fn describe_polynomial(fit: &FitResult) -> String {
    let mut out = String::new();

    for (power, &c) in fit.coefficients.iter().enumerate().rev() {
        if c == 0.0 {
            continue;
        }
        let magnitude = fmt_sig(c.abs(), COEFF_SIG_DIGITS);
        let var = match power {
            0 => String::new(),
            1 => "x".to_string(),
            p => format!("x^{p}"),
        };
        let term = if power > 0 && magnitude == "1" {
            var
        } else {
            format!("{magnitude}{var}")
        };

        if out.is_empty() {
            if c < 0.0 {
                out.push('-');
            }
        } else if c < 0.0 {
            out.push_str(" - ");
        } else {
            out.push_str(" + ");
        }
        out.push_str(&term);
    }

    if out.is_empty() {
        out.push('0');
    }
    out
}

/// Format a value to `digits` significant digits, trimming trailing zeros.
///
/// Magnitudes outside `[1e-4, 1e6)` use scientific notation (`1.5e-7`).
pub fn fmt_sig(v: f64, digits: usize) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if !v.is_finite() {
        return format!("{v}");
    }
    let digits = digits.max(1);
    let exp = v.abs().log10().floor() as i32;

    if !(-4..6).contains(&exp) {
        let s = format!("{:.*e}", digits - 1, v);
        return match s.split_once('e') {
            Some((mantissa, e)) => format!("{}e{e}", trim_zeros(mantissa)),
            None => s,
        };
    }

    let decimals = (digits as i32 - 1 - exp).max(0) as usize;
    trim_zeros(&format!("{v:.decimals$}")).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use crate::domain::{CountBounds, EuBounds, SampleErrors};

    fn poly(coefficients: Vec<f64>) -> FitResult {
        FitResult {
            degree: coefficients.len() - 1,
            coefficients,
            quality: FitQuality { sse: 0.0, rmse: 0.0, r_squared: Some(1.0), n: 3 },
            rcond: 1.0,
        }
    }

    #[test]
    fn sig_digit_formatting() {
        assert_eq!(fmt_sig(0.1, 6), "0.1");
        assert_eq!(fmt_sig(0.00305175781, 6), "0.00305176");
        assert_eq!(fmt_sig(3.86047123, 6), "3.86047");
        assert_eq!(fmt_sig(100.0, 6), "100");
        assert_eq!(fmt_sig(123456.7, 6), "123457");
        assert_eq!(fmt_sig(2.5e-8, 6), "2.5e-8");
        assert_eq!(fmt_sig(1.25e7, 6), "1.25e7");
        assert_eq!(fmt_sig(0.0, 6), "0");
    }

    #[test]
    fn describes_line() {
        assert_eq!(describe_polynomial(&poly(vec![0.0, 0.1])), "0.1x");
        assert_eq!(describe_polynomial(&poly(vec![-3.86047123, 0.00305175781])), "0.00305176x - 3.86047");
        assert_eq!(describe_polynomial(&poly(vec![2.0, -1.0])), "-x + 2");
    }

    #[test]
    fn describes_higher_degree_with_omitted_terms() {
        assert_eq!(describe_polynomial(&poly(vec![1.5, 0.0, 3e-8])), "3e-8x^2 + 1.5");
        assert_eq!(
            describe_polynomial(&poly(vec![-1.0, 2.0, 0.0, -4.5e-12])),
            "-4.5e-12x^3 + 2x - 1"
        );
        assert_eq!(describe_polynomial(&poly(vec![0.0, 0.0])), "0");
    }

    #[test]
    fn description_is_deterministic() {
        let fit = poly(vec![-0.123456789, 0.000987654321, 1.23e-9]);
        let first = describe_polynomial(&fit);
        for _ in 0..10 {
            assert_eq!(describe_polynomial(&fit), first);
        }
    }

    #[test]
    fn rows_follow_sample_order() {
        let record = CalibrationRecord {
            instrument: "FT-7".to_string(),
            cal_date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap(),
            eu_units: "gpm".to_string(),
            count_bounds: CountBounds { min: 0, max: 100 },
            eu_bounds: EuBounds { min: 0.0, max: 10.0 },
            counts: vec![100, 0, 50],
            eus: vec![9.5, 0.0, 5.0],
            notes: None,
            equipment: None,
            doc_title: None,
        };
        let fit = poly(vec![0.0, 0.1]);
        let stats = DerivedStats {
            eu_at_min: 0.0,
            eu_at_max: 10.0,
            errors: SampleErrors {
                calculated_eu: vec![10.0, 0.0, 5.0],
                abs_error: vec![0.5, 0.0, 0.0],
                pct_error: Some(vec![5.0, 0.0, 0.0]),
            },
        };

        let report = assemble(&record, &fit, &stats, None);
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].measured_count, 100);
        assert_eq!(report.rows[0].pct_error, Some(5.0));
        assert_eq!(report.rows[1].measured_count, 0);
        assert_eq!(report.rows[2].calculated_eu, 5.0);
        assert_eq!(report.polynomial, "0.1x");
        assert!(report.offset.is_none());
    }
}
