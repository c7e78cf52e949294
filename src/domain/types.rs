//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A record as it appears in the input file, before validation.
///
/// Serializes with the historical numbered keys (`01_instName`, ...), which is
/// how the template is written. Reading goes through `io::ingest::raw_record`,
/// which also accepts the bare names and reports errors per field. Every field
/// is optional here; `io::ingest` decides which ones are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRecord {
    #[serde(rename = "01_instName", skip_serializing_if = "Option::is_none")]
    pub inst_name: Option<String>,
    #[serde(rename = "02_calDate", skip_serializing_if = "Option::is_none")]
    pub cal_date: Option<String>,
    #[serde(rename = "03_EuUnits", skip_serializing_if = "Option::is_none")]
    pub eu_units: Option<String>,
    #[serde(rename = "04_minMaxCounts", skip_serializing_if = "Option::is_none")]
    pub min_max_counts: Option<Vec<i64>>,
    #[serde(rename = "05_minMaxEu", skip_serializing_if = "Option::is_none")]
    pub min_max_eu: Option<Vec<f64>>,
    #[serde(rename = "06_actCounts", skip_serializing_if = "Option::is_none")]
    pub act_counts: Option<Vec<i64>>,
    #[serde(rename = "07_actEus", skip_serializing_if = "Option::is_none")]
    pub act_eus: Option<Vec<f64>>,
    #[serde(rename = "08_notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "09_equipment", skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(rename = "10_docTitle", skip_serializing_if = "Option::is_none")]
    pub doc_title: Option<String>,
}

/// Configured PLC count span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBounds {
    pub min: i64,
    pub max: i64,
}

impl CountBounds {
    pub fn span(&self) -> f64 {
        self.max as f64 - self.min as f64
    }
}

/// Configured engineering-unit span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EuBounds {
    pub min: f64,
    pub max: f64,
}

impl EuBounds {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// One instrument's validated calibration session.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationRecord {
    pub instrument: String,
    pub cal_date: NaiveDateTime,
    pub eu_units: String,
    pub count_bounds: CountBounds,
    pub eu_bounds: EuBounds,
    pub counts: Vec<i64>,
    pub eus: Vec<f64>,
    pub notes: Option<String>,
    pub equipment: Option<String>,
    pub doc_title: Option<String>,
}

impl CalibrationRecord {
    /// A copy of this record with the measured counts replaced (used by simulation).
    pub fn with_counts(&self, counts: Vec<i64>) -> CalibrationRecord {
        CalibrationRecord {
            counts,
            ..self.clone()
        }
    }

    /// Title printed at the top of the report.
    pub fn title(&self) -> String {
        match &self.doc_title {
            Some(t) => t.clone(),
            None => format!("{} Calibration", self.instrument),
        }
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    /// `None` when the measured EUs have zero variance.
    pub r_squared: Option<f64>,
    pub n: usize,
}

/// Polynomial fit output.
///
/// `coefficients[k]` multiplies `count^k` (ascending powers), so
/// `coefficients.len() == degree + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub degree: usize,
    pub coefficients: Vec<f64>,
    pub quality: FitQuality,
    /// Reciprocal condition ratio of the column-scaled design matrix.
    pub rcond: f64,
}

/// Calculated EU, absolute error and percent-of-range error per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleErrors {
    pub calculated_eu: Vec<f64>,
    pub abs_error: Vec<f64>,
    /// `None` when percent error was not computed (zero EU range).
    pub pct_error: Option<Vec<f64>>,
}

/// Per-record calculated outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedStats {
    pub eu_at_min: f64,
    pub eu_at_max: f64,
    pub errors: SampleErrors,
}

/// Zero-EU count offset compensation (linear fits only).
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetCompensation {
    /// Count at which the fitted line reads zero EU.
    pub count_offset: f64,
    /// Measured counts shifted by `count_offset`, rounded.
    pub adjusted_counts: Vec<i64>,
    pub fit: FitResult,
    pub eu_at_min: f64,
    pub eu_at_max: f64,
}

/// What to do when the configured EU range is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePolicy {
    /// Fail the record with `DegenerateRange`.
    Strict,
    /// Report absolute error only.
    AbsoluteOnly,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_path: PathBuf,
    pub output_prefix: Option<String>,
    pub degree: usize,

    pub simulate: bool,
    pub seed: u64,
    /// Simulation noise in counts. `None` means 1% of each record's count span.
    pub noise_std_dev: Option<f64>,

    pub verbose: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub plot_file: bool,
    pub export_fit: bool,

    pub range_policy: RangePolicy,
    pub fail_fast: bool,
}

/// A saved fit file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub instrument: String,
    pub cal_date: NaiveDateTime,
    pub eu_units: String,
    pub count_bounds: CountBounds,
    pub eu_bounds: EuBounds,
    pub measured_counts: Vec<i64>,
    pub measured_eus: Vec<f64>,
    pub fit: FitResult,
    pub grid: FitGrid,
}

/// Fitted EU evaluated across the configured count span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitGrid {
    pub counts: Vec<f64>,
    pub eu: Vec<f64>,
}
