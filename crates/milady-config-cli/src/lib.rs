// crates/milady-config-cli/src/lib.rs
// ============================================================================
// Module: Settings CLI Library
// Description: Host-side pieces of the settings CLI.
// Purpose: Expose config loading, the backend client, and edit sessions.
// Dependencies: milady-config-core, milady-config-ui, reqwest, toml
// ============================================================================

//! ## Overview
//! The `milady-settings` binary is a thin dispatcher over this library:
//! [`CliConfig`] loads the TOML configuration, [`BackendClient`] talks to the
//! agent API, and [`SettingsSession`] owns a plugin's values while the engine
//! renders and validates them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod config;
pub mod session;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::BackendClient;
pub use client::BackendClientConfig;
pub use client::BackendError;
pub use client::BackendRevealer;
pub use client::PluginSummary;
pub use config::CliConfig;
pub use config::CliConfigError;
pub use config::LogSinkKind;
pub use session::ConfigStore;
pub use session::PluginConfigDocument;
pub use session::SessionError;
pub use session::SessionOptions;
pub use session::SettingsSession;
