//! Input decoding limits (php.ini equivalents).

use std::path::PathBuf;

use super::parse::{env_bounded, env_opt, env_size};
use super::ConfigError;
use crate::superglobals::DecodeLimits;

/// Deepest bracket nesting accepted from `MAX_INPUT_NESTING_LEVEL`.
pub const NESTING_LEVEL_CEILING: usize = 1024;
/// Largest per-source variable count accepted from `MAX_INPUT_VARS`.
pub const INPUT_VARS_CEILING: usize = 1_000_000;
/// Largest per-request upload count accepted from `MAX_FILE_UPLOADS`.
pub const FILE_UPLOADS_CEILING: usize = 10_000;

/// Limits and locations used when building superglobals from a request.
#[derive(Clone, Debug)]
pub struct InputConfig {
    /// Maximum size of one uploaded file in bytes (`upload_max_filesize`).
    pub upload_max_filesize: u64,
    /// Maximum accepted body size for form and upload decoding (`post_max_size`).
    pub post_max_size: u64,
    /// Maximum number of file parts accepted per request (`max_file_uploads`).
    pub max_file_uploads: usize,
    /// Directory where uploaded files are stored (`upload_tmp_dir`).
    pub upload_tmp_dir: PathBuf,
    /// Maximum number of variables per source (`max_input_vars`).
    pub max_input_vars: usize,
    /// Maximum bracket depth of a variable name (`max_input_nesting_level`).
    pub max_input_nesting_level: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            upload_max_filesize: 10 * 1024 * 1024,
            post_max_size: 8 * 1024 * 1024,
            max_file_uploads: 20,
            upload_tmp_dir: std::env::temp_dir(),
            max_input_vars: 1000,
            max_input_nesting_level: 64,
        }
    }
}

impl InputConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            upload_max_filesize: env_size("UPLOAD_MAX_FILESIZE", "10M")?,
            post_max_size: env_size("POST_MAX_SIZE", "8M")?,
            max_file_uploads: env_bounded("MAX_FILE_UPLOADS", 20, 1, FILE_UPLOADS_CEILING)?,
            upload_tmp_dir: env_opt("UPLOAD_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            max_input_vars: env_bounded("MAX_INPUT_VARS", 1000, 1, INPUT_VARS_CEILING)?,
            max_input_nesting_level: env_bounded(
                "MAX_INPUT_NESTING_LEVEL",
                64,
                1,
                NESTING_LEVEL_CEILING,
            )?,
        })
    }

    /// Variable count and nesting bounds for the array builders.
    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_vars: self.max_input_vars,
            max_depth: self.max_input_nesting_level,
        }
    }

    /// Override the upload directory.
    pub fn with_upload_tmp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_tmp_dir = dir.into();
        self
    }

    /// Override the per-file upload limit.
    pub fn with_upload_max_filesize(mut self, bytes: u64) -> Self {
        self.upload_max_filesize = bytes;
        self
    }

    /// Override the variable count and nesting limits.
    pub fn with_input_limits(mut self, max_vars: usize, max_nesting_level: usize) -> Self {
        self.max_input_vars = max_vars;
        self.max_input_nesting_level = max_nesting_level;
        self
    }

    /// Override the per-request file count limit.
    pub fn with_max_file_uploads(mut self, count: usize) -> Self {
        self.max_file_uploads = count;
        self
    }
}
