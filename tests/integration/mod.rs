//! Integration tests for php_input
//!
//! These tests drive the public API end to end: an `http::Request` is
//! converted, decoded into superglobals and queried through `InputHandler`.
//! Uploads are written to a temporary directory per test.
//!
//! Run with: cargo test --test integration

mod helpers;

mod query_body;
mod uploads;
mod validation;
