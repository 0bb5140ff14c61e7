//! php_input - PHP-style request input handling for Rust HTTP services.
//!
//! This crate decodes an HTTP request the way PHP fills its superglobals
//! (`$_GET`, `$_POST`, `$_FILES`, `php://input`) and exposes the result as
//! trees of named input items and uploaded files.
//!
//! # Features
//!
//! - **Bracket keys**: `a[]=1&user[name]=x` decode into nested arrays
//! - **Uploads**: multipart files are streamed to temp files and rearranged
//!   from PHP's column layout into one node per upload slot
//! - **JSON bodies**: decoded for body-bearing methods
//! - **Unified lookups**: `find`/`value`/`exists`/`all` across sources, with
//!   typed coercion and pluggable validation
//! - **Structured logging**: JSON log lines through tracing
//!
//! # Example
//!
//! ```rust,ignore
//! use php_input::{Config, InputHandler};
//! use php_input::input::SourceFilter;
//!
//! let config = Config::from_env()?;
//! php_input::logging::init(&config.logging);
//!
//! let input = InputHandler::from_request(request.into(), &config.input).await?;
//! let page = input.value("page", 1, SourceFilter::from("get"));
//! for photo in input.file("photos").children() {
//!     photo.move_to(format!("/srv/uploads/{}", photo.filename().unwrap_or("upload")))?;
//! }
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod core;
pub mod input;
pub mod logging;
pub mod superglobals;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use crate::core::{Error, Request, Result};
pub use input::{InputFile, InputHandler, InputItem};
pub use superglobals::Superglobals;
