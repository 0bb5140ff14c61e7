//! Configuration module for php_input.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use php_input::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Upload dir: {:?}", config.input.upload_tmp_dir);
//! ```

mod error;
mod input;
mod logging;
mod parse;

pub use error::ConfigError;
pub use input::InputConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::parse_size;

/// Complete crate configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Input decoding limits.
    pub input: InputConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            input: InputConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Upload max filesize: {} bytes", self.input.upload_max_filesize);
        info!("  Post max size: {} bytes", self.input.post_max_size);
        info!("  Max file uploads: {}", self.input.max_file_uploads);
        info!("  Upload tmp dir: {:?}", self.input.upload_tmp_dir);
        info!("  Max input vars: {}", self.input.max_input_vars);
        info!("  Max input nesting level: {}", self.input.max_input_nesting_level);
    }
}
