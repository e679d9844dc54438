// crates/milady-config-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers and fixtures for config core tests.
// ============================================================================
//! ## Overview
//! Shared test helpers for consistent Result-based assertions.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::error::Error;
use std::fmt;

use milady_config_core::ConfigSchema;
use milady_config_core::ConfigValues;
use milady_config_core::UiHints;
use serde_json::Value;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across config core integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl TestError {
    /// Creates a new test error with the provided message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(Box::new(TestError::new(message))) }
}

// ========================================================================
// Fixtures
// ========================================================================

/// Parses a schema document.
///
/// # Errors
/// Returns the schema error when the document is rejected.
pub fn schema(raw: &Value) -> TestResult<ConfigSchema> {
    Ok(ConfigSchema::parse_document(raw)?)
}

/// Parses a hint document strictly.
///
/// # Errors
/// Returns the first hint error.
pub fn hints(raw: &Value) -> TestResult<UiHints> {
    Ok(UiHints::parse_document(raw)?)
}

/// Converts a JSON object literal into form values.
///
/// # Errors
/// Returns an error when the literal is not an object.
pub fn values(raw: &Value) -> TestResult<ConfigValues> {
    raw.as_object().cloned().ok_or_else(|| "values must be an object".into())
}
