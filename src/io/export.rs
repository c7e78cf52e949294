//! Per-instrument output files.
//!
//! File names are `<prefix>_<instName>.<ext>`. The text report is appended so
//! repeated calibrations of one instrument accumulate in a single traveler file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// `<prefix>_<instrument>.<ext>`.
///
/// Path separators in the instrument name are replaced so the file always
/// lands next to the prefix.
pub fn output_path(prefix: &str, instrument: &str, ext: &str) -> PathBuf {
    let name: String = instrument
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    PathBuf::from(format!("{prefix}_{name}.{ext}"))
}

/// Append a text report to `path`, creating the file if needed.
pub fn append_text_report(path: &Path, text: &str) -> Result<(), AppError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report '{}': {e}", path.display())))?;

    file.write_all(text.as_bytes())
        .map_err(|e| AppError::new(2, format!("Failed to write report '{}': {e}", path.display())))?;

    Ok(())
}
