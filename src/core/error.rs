//! Core error types.

use std::fmt;

/// Errors raised while building or validating request inputs.
///
/// Structural problems in the request (malformed JSON, broken upload
/// descriptors) are absorbed by the input tree and never surface here; only
/// construction failures, platform I/O and validation results do.
#[derive(Debug)]
pub enum Error {
    /// Invalid HTTP request.
    InvalidRequest(String),

    /// Multipart stream could not be decoded.
    Multipart(String),

    /// Upload descriptor is missing a field or has a malformed one.
    InvalidUpload { field: String, reason: String },

    /// Input failed a validation rule.
    Validation { field: String, message: String },

    /// I/O error.
    Io(std::io::Error),

    /// JSON error.
    Json(serde_json::Error),

    /// Custom error with message.
    Custom(String),
}

impl Error {
    /// Shorthand for a missing or malformed upload descriptor field.
    pub fn invalid_upload(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidUpload {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            Error::Multipart(msg) => write!(f, "multipart error: {}", msg),
            Error::InvalidUpload { field, reason } => {
                write!(f, "invalid upload field '{}': {}", field, reason)
            }
            Error::Validation { field, message } => {
                write!(f, "validation failed for '{}': {}", field, message)
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

#[cfg(feature = "multipart")]
impl From<multer::Error> for Error {
    fn from(e: multer::Error) -> Self {
        Error::Multipart(e.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Custom(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Custom(msg.to_string())
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
