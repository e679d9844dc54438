// crates/milady-config-ui/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers and renderer fixtures for UI tests.
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
use std::sync::Arc;

use milady_config_core::ConfigValues;
use milady_config_core::MemoryEventSink;
use milady_config_ui::ConfigRenderer;
use milady_config_ui::FieldNode;
use milady_config_ui::FieldRegistry;
use milady_config_ui::RenderNode;
use milady_config_ui::standard_registry;
use serde_json::Value;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across config UI integration tests.
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

/// Converts a JSON object literal into form values.
///
/// # Errors
/// Returns an error when the literal is not an object.
pub fn values(raw: &Value) -> TestResult<ConfigValues> {
    raw.as_object().cloned().ok_or_else(|| "values must be an object".into())
}

/// Builds a renderer over the standard registry with a memory sink.
pub fn renderer(schema: &Value, hints: &Value) -> (ConfigRenderer, Arc<MemoryEventSink>) {
    renderer_with(standard_registry(), schema, hints)
}

/// Builds a renderer over a custom registry with a memory sink.
pub fn renderer_with(
    registry: FieldRegistry,
    schema: &Value,
    hints: &Value,
) -> (ConfigRenderer, Arc<MemoryEventSink>) {
    let sink = Arc::new(MemoryEventSink::new());
    let mut renderer = ConfigRenderer::new("demo", Arc::new(registry)).with_sink(sink.clone());
    renderer.load_documents(schema, hints);
    (renderer, sink)
}

/// Collects every field node in render order, descending into groups and
/// open disclosures.
pub fn field_nodes(node: &RenderNode) -> Vec<&FieldNode> {
    let mut out = Vec::new();
    collect(node, &mut out);
    out
}

/// Recursive worker for [`field_nodes`].
fn collect<'a>(node: &'a RenderNode, out: &mut Vec<&'a FieldNode>) {
    match node {
        RenderNode::Field(field) => out.push(field),
        RenderNode::Form {
            children, ..
        }
        | RenderNode::Group {
            children, ..
        }
        | RenderNode::Disclosure {
            children, ..
        } => {
            for child in children {
                collect(child, out);
            }
        }
        RenderNode::EmptyState {
            ..
        }
        | RenderNode::ProgressBar {
            ..
        }
        | RenderNode::ErrorSummary {
            ..
        } => {}
    }
}

/// Top-level children of a rendered form.
///
/// # Errors
/// Returns an error when the node is not a form.
pub fn form_children(node: &RenderNode) -> TestResult<&[RenderNode]> {
    match node {
        RenderNode::Form {
            children, ..
        } => Ok(children),
        _ => Err("expected a form node".into()),
    }
}
