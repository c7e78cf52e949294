//! Input template writer.
//!
//! Writes a two-instrument example file the user can edit. Keys come out in
//! their numbered order with 4-space indentation.

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::domain::RawRecord;
use crate::error::AppError;

/// The example records written by `plccal template`.
pub fn template_records() -> Vec<RawRecord> {
    vec![
        RawRecord {
            inst_name: Some("Instrument A".to_string()),
            cal_date: Some("10/5/2017 12:10".to_string()),
            eu_units: Some("units".to_string()),
            min_max_counts: Some(vec![0, 32767]),
            min_max_eu: Some(vec![0.0, 100.0]),
            act_counts: Some(vec![1265, 12093, 26989]),
            act_eus: Some(vec![0.0, 50.0, 90.0]),
            notes: Some("calibration notes".to_string()),
            equipment: Some("equipment notes".to_string()),
            doc_title: Some("Document Title".to_string()),
        },
        RawRecord {
            inst_name: Some("Instrument B".to_string()),
            cal_date: Some("10/5/2017 12:10".to_string()),
            eu_units: Some("units".to_string()),
            min_max_counts: Some(vec![-27648, 27648]),
            min_max_eu: Some(vec![-100.0, 100.0]),
            act_counts: Some(vec![1265, 5209, 10093, 22345, 26989]),
            act_eus: Some(vec![-90.0, -50.0, 0.0, 50.0, 90.0]),
            notes: Some("calibration notes".to_string()),
            equipment: Some("equipment notes".to_string()),
            doc_title: Some("Document Title".to_string()),
        },
    ]
}

/// Write the template to `path`, replacing any existing file.
pub fn write_template(path: &Path) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create template '{}': {e}", path.display())))?;

    let mut ser = serde_json::Serializer::with_formatter(file, PrettyFormatter::with_indent(b"    "));
    template_records()
        .serialize(&mut ser)
        .map_err(|e| AppError::new(2, format!("Failed to write template: {e}")))?;

    info!(path = %path.display(), "wrote input template");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::load_records;

    #[test]
    fn template_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.json");
        write_template(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    {\n        \"01_instName\": \"Instrument A\""));

        let ingested = load_records(&path).unwrap();
        assert!(ingested.errors.is_empty());
        assert_eq!(ingested.records.len(), 2);
        assert_eq!(ingested.records[0].instrument, "Instrument A");
        assert_eq!(ingested.records[1].counts, vec![1265, 5209, 10093, 22345, 26989]);
    }

    #[test]
    fn keys_are_in_sorted_order() {
        let text = serde_json::to_string(&template_records()[0]).unwrap();
        let positions: Vec<usize> = [
            "01_instName",
            "02_calDate",
            "03_EuUnits",
            "04_minMaxCounts",
            "05_minMaxEu",
            "06_actCounts",
            "07_actEus",
            "08_notes",
            "09_equipment",
            "10_docTitle",
        ]
        .iter()
        .map(|k| text.find(k).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
