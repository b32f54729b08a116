//! Error types for speedcontrol.
//!
//! This module defines the error taxonomy shared by the record store, the
//! service facade and the command-line interface.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::codec::FormatError;
use crate::record::ValidationError;

/// The main error type for speedcontrol operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// A record failed construction-time validation.
    #[error("invalid record: {0}")]
    Validation(#[from] ValidationError),

    /// A request field could not be parsed.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        /// Name of the offending request field.
        field: &'static str,
        /// Description of the parse failure.
        message: String,
    },

    // === Storage Errors ===
    /// A stored row could not be decoded.
    #[error("malformed row at line {line}: {source}")]
    Format {
        /// 1-based line number of the row inside its partition.
        line: u64,
        /// The underlying decode failure.
        #[source]
        source: FormatError,
    },

    /// No partition exists for the requested day.
    #[error("there are no records for {day}")]
    PartitionNotFound {
        /// The requested day.
        day: NaiveDate,
    },

    /// The partition exists but holds no record for the requested day.
    #[error("no records for day {day}")]
    NoRecordsForDay {
        /// The requested day.
        day: NaiveDate,
    },

    // === Service Errors ===
    /// The service was called outside its availability window.
    #[error("service is not available now, try between {start} and {end}")]
    Unavailable {
        /// Start of the availability window (`HH:MM`).
        start: String,
        /// End of the availability window (`HH:MM`).
        end: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for speedcontrol operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid input error for the named request field.
    #[must_use]
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Wrap a csv reader error for the given line.
    ///
    /// I/O failures stay I/O errors; anything else is a syntax error in the
    /// stored row.
    pub(crate) fn from_csv(err: csv::Error, line: u64) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::Io(source),
            _ => Self::Format {
                line,
                source: FormatError::Syntax(message),
            },
        }
    }

    /// Check if this error was caused by bad caller input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidInput { .. })
    }

    /// Check if this error means there is no data for the requested day.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PartitionNotFound { .. } | Self::NoRecordsForDay { .. }
        )
    }
}
