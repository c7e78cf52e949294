//! JSON ingest and validation.
//!
//! This module is responsible for turning an input file into a clean set of
//! `CalibrationRecord`s that are safe to fit.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors naming the field)
//! - **Record-level validation** (skip bad records, but report what happened)
//! - **One shape for the core**: a single object or a list of objects both
//!   become `Vec<CalibrationRecord>` here
//! - **Separation of concerns**: no fitting logic here

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::domain::{CalibrationRecord, CountBounds, EuBounds, RawRecord};
use crate::error::{AppError, CalError};

/// Accepted input keys: `(file key, bare name)`. The bare name is what errors report.
const INST_NAME: (&str, &str) = ("01_instName", "instName");
const CAL_DATE: (&str, &str) = ("02_calDate", "calDate");
const EU_UNITS: (&str, &str) = ("03_EuUnits", "EuUnits");
const MIN_MAX_COUNTS: (&str, &str) = ("04_minMaxCounts", "minMaxCounts");
const MIN_MAX_EU: (&str, &str) = ("05_minMaxEu", "minMaxEu");
const ACT_COUNTS: (&str, &str) = ("06_actCounts", "actCounts");
const ACT_EUS: (&str, &str) = ("07_actEus", "actEus");
const NOTES: (&str, &str) = ("08_notes", "notes");
const EQUIPMENT: (&str, &str) = ("09_equipment", "equipment");
const DOC_TITLE: (&str, &str) = ("10_docTitle", "docTitle");

const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// A record that failed validation.
#[derive(Debug, Clone)]
pub struct RecordError {
    /// Zero-based position in the input.
    pub index: usize,
    pub error: CalError,
}

/// Ingest output: validated records + per-record errors.
#[derive(Debug, Clone)]
pub struct IngestedRecords {
    pub records: Vec<CalibrationRecord>,
    pub errors: Vec<RecordError>,
    pub records_read: usize,
}

/// Read and validate an input file.
pub fn load_records(path: &Path) -> Result<IngestedRecords, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input file '{}': {e}", path.display())))?;
    let ingested = parse_records(&text)?;

    info!(
        path = %path.display(),
        read = ingested.records_read,
        valid = ingested.records.len(),
        "loaded calibration records"
    );
    for e in &ingested.errors {
        warn!(index = e.index, "{}", e.error);
    }
    Ok(ingested)
}

/// Parse and validate JSON text holding one record or a list of records.
pub fn parse_records(text: &str) -> Result<IngestedRecords, CalError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CalError::validation("input", "(document)", format!("invalid JSON: {e}")))?;
    let items = normalize_input(value)?;
    let records_read = items.len();

    let mut records = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match raw_record(item, index).and_then(|raw| validate_record(raw, index)) {
            Ok(r) => records.push(r),
            Err(error) => errors.push(RecordError { index, error }),
        }
    }

    Ok(IngestedRecords {
        records,
        errors,
        records_read,
    })
}

/// Collapse "single object or list of objects" into a list.
pub fn normalize_input(value: Value) -> Result<Vec<Value>, CalError> {
    match value {
        Value::Array(items) if items.is_empty() => Err(CalError::validation(
            "input",
            "(document)",
            "the record list is empty",
        )),
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(vec![value]),
        other => Err(CalError::validation(
            "input",
            "(document)",
            format!("expected an object or a list of objects, got {}", json_kind(&other)),
        )),
    }
}

/// Pull the known keys out of one JSON object.
pub fn raw_record(value: Value, index: usize) -> Result<RawRecord, CalError> {
    let label = record_label(index, None);
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(CalError::validation(
                label,
                "(record)",
                format!("expected an object, got {}", json_kind(&other)),
            ));
        }
    };

    Ok(RawRecord {
        inst_name: field(&map, INST_NAME, &label)?,
        cal_date: field(&map, CAL_DATE, &label)?,
        eu_units: field(&map, EU_UNITS, &label)?,
        min_max_counts: field(&map, MIN_MAX_COUNTS, &label)?,
        min_max_eu: field(&map, MIN_MAX_EU, &label)?,
        act_counts: field(&map, ACT_COUNTS, &label)?,
        act_eus: field(&map, ACT_EUS, &label)?,
        notes: field(&map, NOTES, &label)?,
        equipment: field(&map, EQUIPMENT, &label)?,
        doc_title: field(&map, DOC_TITLE, &label)?,
    })
}

/// Check required fields and invariants, producing a `CalibrationRecord`.
pub fn validate_record(raw: RawRecord, index: usize) -> Result<CalibrationRecord, CalError> {
    let label = record_label(index, None);

    let instrument = required(raw.inst_name, INST_NAME, &label)?;
    if instrument.trim().is_empty() {
        return Err(CalError::validation(label, INST_NAME.1, "instrument name is empty"));
    }
    let label = record_label(index, Some(&instrument));

    let cal_date_text = required(raw.cal_date, CAL_DATE, &label)?;
    let cal_date = parse_cal_date(&cal_date_text).ok_or_else(|| {
        CalError::validation(
            &label,
            CAL_DATE.1,
            format!("unrecognised date '{cal_date_text}' (expected e.g. MM/DD/YYYY HH:MM)"),
        )
    })?;

    let eu_units = required(raw.eu_units, EU_UNITS, &label)?;

    let counts_pair = required(raw.min_max_counts, MIN_MAX_COUNTS, &label)?;
    let [count_min, count_max] = pair(&counts_pair, MIN_MAX_COUNTS, &label)?;
    if count_min >= count_max {
        return Err(CalError::validation(
            label,
            MIN_MAX_COUNTS.1,
            format!("min ({count_min}) must be less than max ({count_max})"),
        ));
    }

    let eu_pair = required(raw.min_max_eu, MIN_MAX_EU, &label)?;
    let [eu_min, eu_max] = pair(&eu_pair, MIN_MAX_EU, &label)?;
    if !(eu_min.is_finite() && eu_max.is_finite()) {
        return Err(CalError::validation(label, MIN_MAX_EU.1, "bounds must be finite"));
    }
    if eu_min > eu_max {
        return Err(CalError::validation(
            label,
            MIN_MAX_EU.1,
            format!("min ({eu_min}) is above max ({eu_max}); EU bounds must run in the same direction as counts"),
        ));
    }

    let counts = required(raw.act_counts, ACT_COUNTS, &label)?;
    let eus = required(raw.act_eus, ACT_EUS, &label)?;
    if counts.len() != eus.len() {
        return Err(CalError::validation(
            label,
            ACT_EUS.1,
            format!("{} measured counts but {} measured EU values", counts.len(), eus.len()),
        ));
    }
    if counts.len() < 2 {
        return Err(CalError::validation(
            label,
            ACT_COUNTS.1,
            format!("at least 2 samples are required, got {}", counts.len()),
        ));
    }
    if let Some(i) = eus.iter().position(|v| !v.is_finite()) {
        return Err(CalError::validation(label, ACT_EUS.1, format!("value #{} is not finite", i + 1)));
    }

    Ok(CalibrationRecord {
        instrument,
        cal_date,
        eu_units,
        count_bounds: CountBounds {
            min: count_min,
            max: count_max,
        },
        eu_bounds: EuBounds { min: eu_min, max: eu_max },
        counts,
        eus,
        notes: non_empty(raw.notes),
        equipment: non_empty(raw.equipment),
        doc_title: non_empty(raw.doc_title),
    })
}

/// Parse the calibration timestamp; date-only inputs are taken at midnight.
pub fn parse_cal_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn field<T: DeserializeOwned>(
    map: &Map<String, Value>,
    (key, bare): (&str, &str),
    label: &str,
) -> Result<Option<T>, CalError> {
    let Some(v) = map.get(key).or_else(|| map.get(bare)) else {
        return Ok(None);
    };
    if v.is_null() {
        return Ok(None);
    }
    serde_json::from_value(v.clone())
        .map(Some)
        .map_err(|e| CalError::validation(label, bare, e.to_string()))
}

fn required<T>(v: Option<T>, (_, bare): (&str, &str), label: &str) -> Result<T, CalError> {
    v.ok_or_else(|| CalError::validation(label, bare, "required field is missing"))
}

fn pair<T: Copy>(v: &[T], (_, bare): (&str, &str), label: &str) -> Result<[T; 2], CalError> {
    match v {
        [a, b] => Ok([*a, *b]),
        _ => Err(CalError::validation(
            label,
            bare,
            format!("expected a [min, max] pair, got {} values", v.len()),
        )),
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn record_label(index: usize, name: Option<&str>) -> String {
    match name {
        Some(n) => format!("record #{} ({n})", index + 1),
        None => format!("record #{}", index + 1),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
