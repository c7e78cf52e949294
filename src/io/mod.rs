//! Input/output helpers.
//!
//! - JSON record ingest + validation (`ingest`)
//! - input template writer (`template`)
//! - per-instrument report files (`export`)
//! - fit JSON read/write (`fit_file`)

pub mod export;
pub mod fit_file;
pub mod ingest;
pub mod template;

pub use export::*;
pub use fit_file::*;
pub use ingest::*;
pub use template::*;
