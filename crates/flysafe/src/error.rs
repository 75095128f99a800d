//! Error types for flysafe.
//!
//! This module defines all error types used throughout the flysafe crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flysafe operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Data Errors ===
    /// A required data file does not exist.
    #[error("data file not found: {path}")]
    DataFileMissing {
        /// Path that was expected to hold the table.
        path: PathBuf,
    },

    /// A data file could not be read as CSV.
    #[error("failed to read {path}: {source}")]
    DataRead {
        /// Path to the offending file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from a data file header.
    #[error("{table} table is missing column '{column}'")]
    MissingColumn {
        /// Name of the table being loaded.
        table: &'static str,
        /// The column that was expected.
        column: &'static str,
    },

    /// CSV decoding failed outside the context of a known file.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

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

    // === Dashboard Errors ===
    /// A filter value is out of shape (for example `lo > hi`).
    #[error("invalid filter: {message}")]
    InvalidFilter {
        /// Description of the rejected value.
        message: String,
    },

    /// No session exists with the given id.
    #[error("unknown session: {0}")]
    UnknownSession(u64),

    /// A request body, query string or path could not be decoded.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested chart name is not known.
    #[error("unknown chart: {0}")]
    UnknownChart(String),

    // === I/O Errors ===
    /// File system or socket operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for flysafe operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new invalid filter error.
    #[must_use]
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Attach a file path to a CSV error.
    #[must_use]
    pub fn data_read(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::DataRead {
            path: path.into(),
            source,
        }
    }

    /// Check if this error was caused by client input rather than the server.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFilter { .. }
                | Self::BadRequest(_)
                | Self::UnknownChart(_)
                | Self::Json(_)
        )
    }

    /// Check if this error refers to something that does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnknownSession(_) | Self::UnknownChart(_) | Self::DataFileMissing { .. }
        )
    }
}
