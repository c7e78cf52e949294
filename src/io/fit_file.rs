//! Read/write fit JSON files.
//!
//! A fit file is the portable form of one instrument's result:
//! - record metadata (instrument, date, units, configured bounds)
//! - the measured samples the fit was computed from
//! - the fitted polynomial and its quality
//! - a precomputed grid across the configured count span for quick plotting
//!
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CalibrationRecord, CountBounds, FitFile, FitGrid, FitResult};
use crate::error::AppError;
use crate::fit::evaluate;

/// Points in the saved grid.
pub const GRID_POINTS: usize = 101;

/// Build the fit file for one instrument.
pub fn build_fit_file(record: &CalibrationRecord, fit: &FitResult) -> FitFile {
    let (counts, eu) = build_grid(fit, record.count_bounds, GRID_POINTS);
    FitFile {
        tool: "plccal".to_string(),
        instrument: record.instrument.clone(),
        cal_date: record.cal_date,
        eu_units: record.eu_units.clone(),
        count_bounds: record.count_bounds,
        eu_bounds: record.eu_bounds,
        measured_counts: record.counts.clone(),
        measured_eus: record.eus.clone(),
        fit: fit.clone(),
        grid: FitGrid { counts, eu },
    }
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, fit_file: &FitFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create fit JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, fit_file)
        .map_err(|e| AppError::new(2, format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    let fit_file: FitFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid fit JSON: {e}")))?;
    Ok(fit_file)
}

fn build_grid(fit: &FitResult, bounds: CountBounds, n: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n.max(2);
    let c0 = bounds.min as f64;
    let c1 = bounds.max as f64;

    let mut counts = Vec::with_capacity(n);
    let mut eu = Vec::with_capacity(n);

    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let c = c0 + u * (c1 - c0);
        counts.push(c);
        eu.push(evaluate(fit, c));
    }

    (counts, eu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use crate::domain::{EuBounds, FitQuality};

    fn record() -> CalibrationRecord {
        CalibrationRecord {
            instrument: "LT-3".to_string(),
            cal_date: NaiveDate::from_ymd_opt(2019, 6, 1).unwrap().and_hms_opt(8, 0, 0).unwrap(),
            eu_units: "in".to_string(),
            count_bounds: CountBounds { min: 0, max: 1000 },
            eu_bounds: EuBounds { min: 0.0, max: 50.0 },
            counts: vec![0, 500, 1000],
            eus: vec![0.0, 25.0, 50.0],
            notes: None,
            equipment: None,
            doc_title: None,
        }
    }

    fn line() -> FitResult {
        FitResult {
            degree: 1,
            coefficients: vec![0.0, 0.05],
            quality: FitQuality { sse: 0.0, rmse: 0.0, r_squared: Some(1.0), n: 3 },
            rcond: 0.5,
        }
    }

    #[test]
    fn grid_spans_configured_counts() {
        let file = build_fit_file(&record(), &line());
        assert_eq!(file.grid.counts.len(), GRID_POINTS);
        assert_eq!(file.grid.counts[0], 0.0);
        assert_eq!(file.grid.counts[GRID_POINTS - 1], 1000.0);
        assert_abs_diff_eq!(file.grid.eu[50], 25.0, epsilon = 1e-12);
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.json");
        let file = build_fit_file(&record(), &line());
        write_fit_json(&path, &file).unwrap();

        let back = read_fit_json(&path).unwrap();
        assert_eq!(back.tool, "plccal");
        assert_eq!(back.instrument, "LT-3");
        assert_eq!(back.fit, line());
        assert_eq!(back.measured_counts, vec![0, 500, 1000]);
        assert_eq!(back.cal_date, record().cal_date);
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"tool\": 1}").unwrap();
        let err = read_fit_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Invalid fit JSON"));
    }
}
