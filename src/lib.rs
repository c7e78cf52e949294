//! `plc-calibration` library crate.
//!
//! The binary (`plccal`) is a thin wrapper around this library so that:
//!
//! - the fit/statistics core is testable without spawning processes
//! - the core has no I/O; adapters live in `io`, `plot` and `app`
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod stats;
