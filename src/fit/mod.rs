//! Polynomial fit engine.
//!
//! Responsibilities:
//!
//! - least-squares polynomial fit and evaluation
//! - simulated counts from the nominal line with seeded noise
//! - zero-EU offset compensation for linear fits

pub mod fitter;
pub mod offset;
pub mod simulate;

pub use fitter::*;
pub use offset::*;
pub use simulate::*;
