// crates/milady-config-ui/src/actions.rs
// ============================================================================
// Module: Async Seams
// Description: Host-supplied action handlers and secret revealers.
// Purpose: Keep all network-backed behavior outside the engine.
// Dependencies: async-trait, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The engine performs no I/O. Actions bound through `hint.on.<event>` and
//! secret reveals are delegated to host implementations of [`ActionHandler`]
//! and [`SecretRevealer`]. Dispatch hands back a [`PendingAction`] future; the
//! host decides whether to await it or drop it. There is no cancellation
//! token: a dropped future simply never completes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Action handler failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The handler rejected the request parameters.
    #[error("action rejected: {0}")]
    Rejected(String),
    /// The handler failed while running.
    #[error("action failed: {0}")]
    Failed(String),
}

/// Secret reveal failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevealError {
    /// The backend could not be reached or refused the request.
    #[error("reveal unavailable: {0}")]
    Unavailable(String),
    /// The backend answered with an unusable payload.
    #[error("reveal response invalid: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// SECTION: Actions
// ============================================================================

/// Request passed to an action handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRequest {
    /// Plugin whose form raised the event.
    pub plugin_id: String,
    /// Field key the binding is attached to.
    pub field: String,
    /// Event name (`change`, `blur`, `click`, ...).
    pub event: String,
    /// Registered action name.
    pub action: String,
    /// Parameters resolved against the single-key state snapshot.
    pub params: Map<String, Value>,
}

/// Host action handler.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Runs the action.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the action cannot complete.
    async fn handle(&self, request: ActionRequest) -> Result<(), ActionError>;
}

/// In-flight action returned by dispatch; await it or drop it.
pub type PendingAction = Pin<Box<dyn Future<Output = Result<(), ActionError>> + Send>>;

/// Handler built from a synchronous closure.
pub struct FnActionHandler<F> {
    /// Wrapped closure.
    function: F,
}

impl<F> FnActionHandler<F>
where
    F: Fn(&ActionRequest) -> Result<(), ActionError> + Send + Sync,
{
    /// Wraps a closure.
    pub const fn new(function: F) -> Self {
        Self {
            function,
        }
    }
}

#[async_trait]
impl<F> ActionHandler for FnActionHandler<F>
where
    F: Fn(&ActionRequest) -> Result<(), ActionError> + Send + Sync,
{
    async fn handle(&self, request: ActionRequest) -> Result<(), ActionError> {
        (self.function)(&request)
    }
}

// ============================================================================
// SECTION: Secrets
// ============================================================================

/// Host secret revealer.
#[async_trait]
pub trait SecretRevealer: Send + Sync {
    /// Fetches the true value of a sensitive field.
    ///
    /// `Ok(None)` means the backend has nothing to reveal; the field stays
    /// masked.
    ///
    /// # Errors
    ///
    /// Returns [`RevealError`] when the backend call fails.
    async fn reveal(&self, plugin_id: &str, key: &str) -> Result<Option<String>, RevealError>;
}
