//! Core types for request handling.
//!
//! - [`Request`] - HTTP request abstraction (method, headers, raw body)
//! - [`ContentKind`] - Content-Type classification used to pick a body decoder
//! - [`Error`] - Core error types

mod error;
mod request;

pub use error::{Error, Result};
pub use request::{ContentKind, Request, BODY_METHODS};
