//! Error types for metadata operations
//!
//! This module defines the error type used throughout the toolkit.

use thiserror::Error;

/// Error types for metadata operations
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed metadata key (wrong shape or family prefix)
    #[error("Invalid key: {0}")]
    BadKey(String),

    /// Bad value or parameter
    #[error("Bad value: {0}")]
    BadValue(String),

    /// Image data not recognized by any registered format handler
    #[error("Unknown image format: {0}")]
    UnknownFormat(String),

    /// Metadata payload could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Metadata payload could not be encoded or written back
    #[error("Write error: {0}")]
    WriteError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation not supported
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable numeric code for this error, surfaced across the C boundary.
    pub fn code(&self) -> i32 {
        match self {
            Error::BadKey(_) => 1,
            Error::BadValue(_) => 2,
            Error::UnknownFormat(_) => 3,
            Error::ParseError(_) => 4,
            Error::WriteError(_) => 5,
            Error::SerializationError(_) => 6,
            Error::Io(_) => 7,
            Error::NotSupported(_) => 8,
            Error::Internal(_) => 9,
        }
    }
}

/// Result type alias for metadata operations
pub type Result<T> = std::result::Result<T, Error>;
