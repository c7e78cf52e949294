//! Curve models: the fitted polynomial and the nominal line.
//!
//! Models are implemented as small, pure functions so that fitting and
//! reporting code can stay generic.

pub mod nominal;
pub mod polynomial;

pub use nominal::*;
pub use polynomial::*;
