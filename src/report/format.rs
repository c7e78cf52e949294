//! Traveler-style text report.
//!
//! Layout (one block per instrument, framed by 72 `*`):
//! - traveler/operation blanks and document title
//! - instrument, calibration date, equipment, notes
//! - nominal bounds, measured table with calculated EU and errors
//! - fitted polynomial, EU at the configured bounds, fit quality
//! - optional offset-compensation section
//! - sign-off lines

use crate::domain::CalibrationRecord;
use crate::report::{CalibrationReport, OffsetReport};

const RULE_WIDTH: usize = 72;

/// Format the full text report for one instrument.
pub fn format_report(record: &CalibrationRecord, report: &CalibrationReport) -> String {
    let units = &record.eu_units;
    let mut out = String::new();

    out.push_str(&"*".repeat(RULE_WIDTH));
    out.push('\n');
    out.push_str("Traveler Number _____________________________________________________\n\n");
    out.push_str("Traveler Operation(s) _______________  Traveler Page(s) _____________\n\n");
    out.push_str(&format!("{}\n\n", record.title()));
    out.push_str("Nominal and Actual Calibration Data\n");
    out.push_str(&format!("{}\n", record.instrument));
    out.push_str(&format!("{}\n\n", record.cal_date.format("%m/%d/%Y %H:%M:%S")));
    out.push_str(&format!("Equipment Used: {}\n\n", record.equipment.as_deref().unwrap_or("")));
    out.push_str(&format!("NOTE: {}\n\n", record.notes.as_deref().unwrap_or("")));

    out.push_str(&format!(
        "{:<37} {:>9} {:>9}\n",
        "Min and Max PLC Nominal Counts:", record.count_bounds.min, record.count_bounds.max
    ));
    out.push_str(&format!(
        "{:<37} {:>9.2} {:>9.2}\n\n",
        format!("Min and Max Nominal EU ({units}):"),
        record.eu_bounds.min,
        record.eu_bounds.max
    ));

    out.push_str(&format_rows(report, units));

    out.push_str(&format!(
        "\nThe least squares fit degree-{} polynomial is:\nEU = {}\n\n",
        report.degree, report.polynomial
    ));
    out.push_str("Calibrated engineering units for the min and max\n");
    out.push_str("PLC counts are as follows:\n");
    out.push_str(&format!(
        "EU at min and max PLC Counts:  {:>11.4}   {:>11.4}\n\n",
        report.eu_at_min, report.eu_at_max
    ));

    let r2 = report
        .quality
        .r_squared
        .map(|v| format!("{v:.6}"))
        .unwrap_or_else(|| "n/a".to_string());
    out.push_str(&format!(
        "Fit quality: n={} SSE={:.6} RMSE={:.6} R^2={r2}\n",
        report.quality.n, report.quality.sse, report.quality.rmse
    ));

    if let Some(offset) = &report.offset {
        out.push('\n');
        out.push_str(&format_offset(record, offset));
    }

    out.push_str(&format!("\n\n\nMfg Sign/Date  {}\n\n\n", "_".repeat(50)));
    out.push_str(&format!("QA Sign/Date   {}\n\n\n", "_".repeat(50)));
    out.push_str(&"*".repeat(RULE_WIDTH));
    out.push('\n');

    out
}

fn format_rows(report: &CalibrationReport, units: &str) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<16}  {:<20}  {:<15}  {:<15}  {:<10}\n",
            "Measured Counts",
            truncate(&format!("Measured EU ({units})"), 20),
            "Calculated EU",
            "Error (EU)",
            "Error (%)"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:_<15}   {:_<20}  {:_<15}  {:_<15}  {:_<10}\n",
            "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for row in &report.rows {
        let pct = row
            .pct_error
            .map(|p| format!("{p:.3}"))
            .unwrap_or_else(|| "n/a".to_string());
        out.push_str(
            format!(
                "{:<16}  {:<20.2}  {:<15.4}  {:<15.4}  {:<10}\n",
                row.measured_count, row.measured_eu, row.calculated_eu, row.abs_error, pct
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn format_offset(record: &CalibrationRecord, offset: &OffsetReport) -> String {
    let mut out = String::new();
    out.push_str("Compensate for a non-zero count value at zero EU.\n");
    out.push_str("Shift the curve fit by the count value of the zero EU value\n");
    out.push_str(&format!(
        "(the x-intercept of the EU axis, {:.2} counts).\n",
        offset.count_offset
    ));
    out.push_str("The adjusted count values vs EU values are:\n\n");
    out.push_str(&format!(
        "{:<16}  {}\n",
        "Adjusted Counts",
        format!("Measured EU ({})", record.eu_units)
    ));
    out.push_str(&format!("{:_<15}   {:_<20}\n", "", ""));
    for (count, eu) in offset.adjusted_counts.iter().zip(record.eus.iter()) {
        out.push_str(format!("{count:<16}  {eu:<20.2}\n").trim_end());
        out.push('\n');
    }
    out.push_str(&format!(
        "\nThe least squares fit polynomial for the adjusted counts is:\nEU = {}\n\n",
        offset.polynomial
    ));
    out.push_str("Calibrated engineering units for the adjusted\n");
    out.push_str("min and max PLC counts are as follows:\n");
    out.push_str(&format!(
        "EU at min and max PLC Counts:  {:>11.4}   {:>11.4}\n",
        offset.eu_at_min, offset.eu_at_max
    ));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use crate::domain::{CountBounds, EuBounds, FitQuality};
    use crate::report::ReportRow;

    fn record() -> CalibrationRecord {
        CalibrationRecord {
            instrument: "PT-100".to_string(),
            cal_date: NaiveDate::from_ymd_opt(2017, 10, 5).unwrap().and_hms_opt(12, 10, 0).unwrap(),
            eu_units: "psi".to_string(),
            count_bounds: CountBounds { min: 0, max: 100 },
            eu_bounds: EuBounds { min: 0.0, max: 10.0 },
            counts: vec![0, 50, 100],
            eus: vec![0.0, 5.0, 10.0],
            notes: Some("as found".to_string()),
            equipment: None,
            doc_title: None,
        }
    }

    fn report(pct: bool) -> CalibrationReport {
        let rows = [(0, 0.0), (50, 5.0), (100, 10.0)]
            .iter()
            .map(|&(c, eu)| ReportRow {
                measured_count: c,
                measured_eu: eu,
                calculated_eu: eu,
                abs_error: 0.0,
                pct_error: if pct { Some(0.0) } else { None },
            })
            .collect();
        CalibrationReport {
            rows,
            polynomial: "0.1x".to_string(),
            degree: 1,
            eu_at_min: 0.0,
            eu_at_max: 10.0,
            quality: FitQuality { sse: 0.0, rmse: 0.0, r_squared: Some(1.0), n: 3 },
            offset: None,
        }
    }

    #[test]
    fn measured_table_golden() {
        let txt = format_rows(&report(true), "psi");
        let expected = concat!(
            "Measured Counts   Measured EU (psi)     Calculated EU    Error (EU)       Error (%)\n",
            "_______________   ____________________  _______________  _______________  __________\n",
            "0                 0.00                  0.0000           0.0000           0.000\n",
            "50                5.00                  5.0000           0.0000           0.000\n",
            "100               10.00                 10.0000          0.0000           0.000\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn report_contains_all_sections() {
        let txt = format_report(&record(), &report(true));
        assert!(txt.starts_with(&"*".repeat(72)));
        assert!(txt.contains("PT-100 Calibration\n"));
        assert!(txt.contains("10/05/2017 12:10:00\n"));
        assert!(txt.contains("Equipment Used: \n"));
        assert!(txt.contains("NOTE: as found\n"));
        assert!(txt.contains("Min and Max PLC Nominal Counts:               0       100\n"));
        assert!(txt.contains("EU = 0.1x\n"));
        assert!(txt.contains("EU at min and max PLC Counts:       0.0000       10.0000\n"));
        assert!(txt.contains("R^2=1.000000"));
        assert!(!txt.contains("Adjusted Counts"));
        assert!(txt.ends_with(&format!("{}\n", "*".repeat(72))));
    }

    #[test]
    fn absolute_only_rows_show_na() {
        let txt = format_rows(&report(false), "psi");
        assert!(txt.lines().nth(2).unwrap().ends_with("n/a"));
    }

    #[test]
    fn offset_section_lists_adjusted_counts() {
        let mut rep = report(true);
        rep.offset = Some(OffsetReport {
            count_offset: 12.0,
            adjusted_counts: vec![-12, 38, 88],
            polynomial: "0.1x + 1.2".to_string(),
            eu_at_min: 1.2,
            eu_at_max: 11.2,
        });
        let txt = format_report(&record(), &rep);
        assert!(txt.contains("x-intercept of the EU axis, 12.00 counts"));
        assert!(txt.contains("Adjusted Counts   Measured EU (psi)\n"));
        assert!(txt.contains("-12               0.00\n"));
        assert!(txt.contains("EU = 0.1x + 1.2\n"));
    }
}
