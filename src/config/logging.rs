//! Logging configuration.

use std::fmt;
use std::str::FromStr;

use super::parse::{env_opt, env_or, env_parse};
use super::ConfigError;

/// Levels accepted by `LOG_LEVEL`.
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Output format of the installed subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human readable `tracing_subscriber::fmt` output.
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "plain" => Ok(LogFormat::Text),
            other => Err(format!("unknown log format '{}', expected json or text", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Json => "json",
            LogFormat::Text => "text",
        })
    }
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// `EnvFilter` directives for the decoder's events.
    pub filter: String,
    /// Reported as `service` in JSON output.
    pub service_name: String,
    /// Subscriber output format (`LOG_FORMAT`).
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "php_input=info".into(),
            service_name: "php_input".into(),
            format: LogFormat::Json,
        }
    }
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// `LOG_LEVEL` (a bare level) beats `RUST_LOG` (full filter syntax, e.g.
    /// `php_input=debug,multer=warn`). An unknown `LOG_LEVEL` is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let filter = resolve_log_filter(
            env_opt("LOG_LEVEL").as_deref(),
            env_opt("RUST_LOG").as_deref(),
        )?;
        Ok(Self {
            filter,
            service_name: env_or("SERVICE_NAME", "php_input"),
            format: env_parse("LOG_FORMAT", LogFormat::Json)?,
        })
    }
}

/// Pick the filter directives from `LOG_LEVEL` and `RUST_LOG` values.
fn resolve_log_filter(
    log_level: Option<&str>,
    rust_log: Option<&str>,
) -> Result<String, ConfigError> {
    if let Some(level) = log_level {
        let level = level.trim().to_ascii_lowercase();
        if !LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Parse {
                key: "LOG_LEVEL".into(),
                value: level,
                error: format!("expected one of {}", LEVELS.join(", ")),
            });
        }
        return Ok(format!("php_input={}", level));
    }

    Ok(rust_log.map_or_else(|| "php_input=info".to_string(), str::to_string))
}
