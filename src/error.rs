//! Error types.
//!
//! - `DataError` is what the aggregation/forecast core returns. It is a closed set
//!   so callers can match on it (and tests can assert on the variant).
//! - `AppError` is what the binary surfaces: a message plus a process exit code.

use thiserror::Error;

use crate::domain::Cause;

/// Failures raised by the core (grid keying, time indexing, aggregation, forecasting).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// A field could not be converted to its expected type.
    #[error("cannot parse `{field}` value '{value}' as {expected}")]
    Parse {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{year}-{month:02} is outside the time index range {first_year}..={last_year}")]
    OutOfRange {
        year: i32,
        month: u32,
        first_year: i32,
        last_year: i32,
    },

    #[error("offset {offset} is outside the time index (length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("regression for cell ({latitude}, {longitude}) cause {label} could not be solved", label = .cause.label())]
    Fit {
        latitude: f64,
        longitude: f64,
        cause: Cause,
    },
}

impl DataError {
    pub fn parse(field: &'static str, value: impl Into<String>, expected: &'static str) -> Self {
        DataError::Parse {
            field,
            value: value.into(),
            expected,
        }
    }

    /// Exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            DataError::Fit { .. } => 4,
            _ => 2,
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

    /// Wrap a core error with a location prefix (file, line, ...).
    pub fn from_data(context: impl std::fmt::Display, err: DataError) -> Self {
        Self::new(err.exit_code(), format!("{context}: {err}"))
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        Self::new(err.exit_code(), err.to_string())
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
