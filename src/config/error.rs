//! Errors raised while reading input limits from the environment.

use std::fmt;

/// A php.ini style setting that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable is set but is not a number or size.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// A limit outside the range the decoder can honor.
    OutOfRange {
        key: String,
        value: u64,
        min: u64,
        max: u64,
    },
}

impl ConfigError {
    /// Name of the environment variable at fault.
    pub fn key(&self) -> &str {
        match self {
            ConfigError::Parse { key, .. } | ConfigError::OutOfRange { key, .. } => key,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}='{}': {}", key, value, error)
            }
            ConfigError::OutOfRange { key, value, min, max } => {
                write!(f, "{}={} is out of range ({}..={})", key, value, min, max)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
