// crates/milady-config-cli/src/config.rs
// ============================================================================
// Module: Settings CLI Configuration
// Description: TOML configuration loading and validation for the settings CLI.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Configuration is read from `milady-settings.toml`, a path passed with
//! `--config`, or the path in `MILADY_SETTINGS_CONFIG`. An explicit path must
//! exist; when only the default name is used and the file is absent, built-in
//! defaults apply. Unknown keys, oversized files, and out-of-range limits are
//! rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "milady-settings.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "MILADY_SETTINGS_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:2138";
/// Default environment variable holding the backend bearer token.
pub const DEFAULT_TOKEN_ENV: &str = "MILADY_API_TOKEN";
/// Minimum backend request timeout in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum backend request timeout in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 60_000;
/// Default backend request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default maximum backend response size in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;
/// Upper bound for the configurable response size.
pub const MAX_RESPONSE_BYTES_LIMIT: usize = 64 * 1024 * 1024;
/// Default maximum local document size in bytes.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 1024 * 1024;
/// Upper bound for the configurable document size.
pub const MAX_DOCUMENT_BYTES_LIMIT: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum CliConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Settings CLI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Backend connection settings.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Rendering preferences.
    #[serde(default)]
    pub render: RenderConfig,
    /// Local input limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Engine event sink selection.
    #[serde(default)]
    pub log: LogConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the agent API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_env: default_token_env(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl BackendConfig {
    /// Validates backend settings.
    fn validate(&self) -> Result<(), CliConfigError> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|err| CliConfigError::Invalid(format!("backend.base_url: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CliConfigError::Invalid(
                "backend.base_url must use http:// or https://".to_string(),
            ));
        }
        if url.cannot_be_a_base() {
            return Err(CliConfigError::Invalid("backend.base_url must be a base url".to_string()));
        }
        let token_env = self.token_env.trim();
        if token_env.is_empty() || token_env.contains('=') || token_env.contains('\0') {
            return Err(CliConfigError::Invalid(
                "backend.token_env must be a valid environment variable name".to_string(),
            ));
        }
        if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(CliConfigError::Invalid(format!(
                "backend.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(CliConfigError::Invalid(format!(
                "backend.max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Rendering preferences.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Expand the advanced section on render.
    #[serde(default)]
    pub show_advanced: bool,
    /// Omit the aggregate error summary.
    #[serde(default)]
    pub suppress_error_summary: bool,
}

/// Local input limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum size of a local plugin config document in bytes.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

impl LimitsConfig {
    /// Validates input limits.
    fn validate(&self) -> Result<(), CliConfigError> {
        if self.max_document_bytes == 0 || self.max_document_bytes > MAX_DOCUMENT_BYTES_LIMIT {
            return Err(CliConfigError::Invalid(format!(
                "limits.max_document_bytes must be between 1 and {MAX_DOCUMENT_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Engine event sink kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `log.path`.
    File,
    /// Events are discarded.
    None,
}

/// Engine event sink selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: LogSinkKind,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LogConfig {
    /// Validates sink settings.
    fn validate(&self) -> Result<(), CliConfigError> {
        match (&self.sink, &self.path) {
            (LogSinkKind::File, None) => {
                Err(CliConfigError::Invalid("log.path is required for the file sink".to_string()))
            }
            (LogSinkKind::File, Some(path)) => validate_path(path),
            (_, Some(_)) => {
                Err(CliConfigError::Invalid("log.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl CliConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`CliConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, CliConfigError> {
        let env_path = env::var(CONFIG_ENV_VAR).ok();
        Self::load_resolved(path, env_path.as_deref())
    }

    /// Loads configuration with an explicit environment override value.
    ///
    /// # Errors
    ///
    /// Returns [`CliConfigError`] when loading or validation fails.
    pub fn load_resolved(
        path: Option<&Path>,
        env_path: Option<&str>,
    ) -> Result<Self, CliConfigError> {
        let (resolved, explicit) = resolve_path(path, env_path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            let mut config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| CliConfigError::Io(err.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Parses and validates configuration from raw TOML bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CliConfigError`] when the content is oversized, not UTF-8,
    /// malformed, or invalid.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CliConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(CliConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| CliConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| CliConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`CliConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), CliConfigError> {
        self.backend.base_url = self.backend.base_url.trim().to_string();
        self.backend.token_env = self.backend.token_env.trim().to_string();
        self.backend.validate()?;
        self.limits.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag reports whether it was explicit.
fn resolve_path(
    path: Option<&Path>,
    env_path: Option<&str>,
) -> Result<(PathBuf, bool), CliConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(env_path) = env_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(CliConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates a path against length limits.
///
/// # Errors
///
/// Returns [`CliConfigError::Invalid`] when the path or a component is too long.
pub fn validate_path(path: &Path) -> Result<(), CliConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(CliConfigError::Invalid("path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(CliConfigError::Invalid("path component too long".to_string()));
        }
    }
    Ok(())
}

/// Default backend base URL.
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Default token environment variable.
fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default response size limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Default document size limit.
const fn default_max_document_bytes() -> usize {
    DEFAULT_MAX_DOCUMENT_BYTES
}
