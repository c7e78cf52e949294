//! Calibration plots.
//!
//! Both renderers draw the same four series:
//! - measured samples
//! - the nominal line through the configured bounds
//! - the fitted polynomial
//! - the offset-compensated fit, when there is one
//!
//! Curves are stored as coefficients and sampled by each renderer at its own
//! resolution.

use crate::domain::{CalibrationRecord, CountBounds, EuBounds, FitFile, FitResult, OffsetCompensation};
use crate::models::{NominalLine, evaluate_coefficients};

pub mod ascii;
pub mod svg;

pub use ascii::render_ascii_plot;
pub use svg::write_svg_plot;

/// Render-only description of one instrument's plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub instrument: String,
    /// Calibration date as printed under the title.
    pub date_label: String,
    pub eu_units: String,
    pub count_bounds: CountBounds,
    pub eu_bounds: EuBounds,
    pub measured: Vec<(f64, f64)>,
    pub fit: Vec<f64>,
    pub offset: Option<Vec<f64>>,
}

impl PlotData {
    pub fn from_run(record: &CalibrationRecord, fit: &FitResult, offset: Option<&OffsetCompensation>) -> Self {
        Self {
            instrument: record.instrument.clone(),
            date_label: record.cal_date.format("%m/%d/%Y %H:%M").to_string(),
            eu_units: record.eu_units.clone(),
            count_bounds: record.count_bounds,
            eu_bounds: record.eu_bounds,
            measured: measured_points(&record.counts, &record.eus),
            fit: fit.coefficients.clone(),
            offset: offset.map(|o| o.fit.coefficients.clone()),
        }
    }

    /// Plot a saved fit. Offset compensation is not part of the file.
    pub fn from_fit_file(file: &FitFile) -> Self {
        Self {
            instrument: file.instrument.clone(),
            date_label: file.cal_date.format("%m/%d/%Y %H:%M").to_string(),
            eu_units: file.eu_units.clone(),
            count_bounds: file.count_bounds,
            eu_bounds: file.eu_bounds,
            measured: measured_points(&file.measured_counts, &file.measured_eus),
            fit: file.fit.coefficients.clone(),
            offset: None,
        }
    }

    pub fn nominal(&self) -> NominalLine {
        NominalLine::new(self.count_bounds, self.eu_bounds)
    }

    /// Configured count span widened to include every measured sample.
    pub fn count_range(&self) -> (f64, f64) {
        let mut lo = self.count_bounds.min as f64;
        let mut hi = self.count_bounds.max as f64;
        for &(c, _) in &self.measured {
            lo = lo.min(c);
            hi = hi.max(c);
        }
        if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) }
    }
}

/// `n` evenly spaced `(x, p(x))` points on `[x0, x1]`.
pub fn sample_polynomial(coefficients: &[f64], x0: f64, x1: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x0 + u * (x1 - x0);
            (x, evaluate_coefficients(coefficients, x))
        })
        .collect()
}

/// Nominal line sampled on `[x0, x1]`.
pub fn sample_nominal(line: &NominalLine, x0: f64, x1: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x0 + u * (x1 - x0);
            (x, line.eu_at(x))
        })
        .collect()
}

fn measured_points(counts: &[i64], eus: &[f64]) -> Vec<(f64, f64)> {
    counts.iter().zip(eus.iter()).map(|(&c, &eu)| (c as f64, eu)).collect()
}
