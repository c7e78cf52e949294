//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and validated calibration records (`RawRecord`, `CalibrationRecord`)
//! - fit outputs (`FitResult`, `FitQuality`)
//! - derived statistics (`DerivedStats`, `SampleErrors`, `OffsetCompensation`)
//! - run configuration and the saved fit file (`RunConfig`, `FitFile`)

pub mod types;

pub use types::*;
