//! Error types.
//!
//! - `CalError`: typed failures of the calibration core (validation, fitting,
//!   derived statistics). These are deterministic functions of the input.
//! - `AppError`: what the binary reports. Carries a process exit code.

use thiserror::Error;

/// A failure inside the calibration core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalError {
    /// Malformed or incomplete input record.
    #[error("{record}: invalid field '{field}': {message}")]
    Validation {
        record: String,
        field: String,
        message: String,
    },

    /// Not enough samples to determine a polynomial of the requested degree.
    #[error("underdetermined fit: {samples} samples cannot determine a degree-{degree} polynomial (need at least {})", .degree + 1)]
    UnderdeterminedFit { samples: usize, degree: usize },

    /// The least-squares system is numerically singular.
    #[error("singular fit for degree {degree}: {detail}")]
    SingularFit { degree: usize, detail: String },

    /// Configured EU range is zero, so percent-of-range (and the nominal inverse) is undefined.
    #[error("degenerate EU range (max - min = {eu_range}): percent-of-range error is undefined")]
    DegenerateRange { eu_range: f64 },
}

impl CalError {
    pub fn validation(record: impl Into<String>, field: impl Into<String>, message: impl Into<String>) -> Self {
        CalError::Validation {
            record: record.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            CalError::Validation { .. } => 2,
            CalError::UnderdeterminedFit { .. } | CalError::SingularFit { .. } => 3,
            CalError::DegenerateRange { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// Prefix the message with the instrument the failure belongs to.
    pub fn for_instrument(self, instrument: &str) -> Self {
        Self {
            exit_code: self.exit_code,
            message: format!("{instrument}: {}", self.message),
        }
    }
}

impl From<CalError> for AppError {
    fn from(err: CalError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
