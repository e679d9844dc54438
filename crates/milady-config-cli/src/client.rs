// crates/milady-config-cli/src/client.rs
// ============================================================================
// Module: Backend Client
// Description: Typed HTTP client for the agent's plugin configuration API.
// Purpose: List plugins, read and write config, and reveal stored secrets.
// Dependencies: async-trait, reqwest, serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! [`BackendClient`] talks to the agent API over HTTP:
//!
//! | Operation | Request |
//! |---|---|
//! | `list_plugins` | `GET /api/plugins` |
//! | `get_config` | `GET /api/plugins/{id}/config` |
//! | `update_config` | `PUT /api/plugins/{id}/config` |
//! | `reveal_secret` | `POST /api/plugins/{id}/config/reveal` |
//!
//! Responses are untrusted: bodies are read under a hard byte limit,
//! redirects are not followed, and the bearer token never appears in
//! `Debug` output or error messages. [`BackendRevealer`] adapts the client to
//! the engine's [`SecretRevealer`] seam.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use milady_config_core::ConfigValues;
use milady_config_ui::RevealError;
use milady_config_ui::SecretRevealer;
use reqwest::Client;
use reqwest::Method;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::config::BackendConfig;
use crate::session::PluginConfigDocument;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Backend client configuration.
#[derive(Clone)]
pub struct BackendClientConfig {
    /// API base URL.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Optional bearer token.
    pub bearer_token: Option<String>,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
}

impl BackendClientConfig {
    /// Builds client settings from CLI config, reading the token from the
    /// configured environment variable.
    #[must_use]
    pub fn from_config(config: &BackendConfig) -> Self {
        let bearer_token =
            env::var(&config.token_env).ok().filter(|token| !token.trim().is_empty());
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            bearer_token,
            max_response_bytes: config.max_response_bytes,
        }
    }
}

impl std::fmt::Debug for BackendClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

/// Backend client errors.
///
/// # Invariants
/// - String payloads may include untrusted server text but never the token.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Configuration error.
    #[error("backend config error: {0}")]
    Config(String),
    /// Transport error.
    #[error("backend transport error: {0}")]
    Transport(String),
    /// Non-success HTTP status.
    #[error("backend returned http status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body preview.
        body: String,
    },
    /// JSON serialization or parsing error.
    #[error("backend json error: {0}")]
    Json(String),
    /// Response size exceeds limits.
    #[error("backend response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Actual size in bytes.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
}

/// Plugin entry returned by `list_plugins`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSummary {
    /// Plugin identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Plugin is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// All required parameters are configured.
    #[serde(default)]
    pub configured: bool,
}

/// `GET /api/plugins` payload.
#[derive(Debug, Deserialize)]
struct PluginListResponse {
    /// Plugin entries.
    plugins: Vec<PluginSummary>,
}

/// Reveal payload.
#[derive(Debug, Deserialize)]
struct RevealResponse {
    /// Stored secret, or null when nothing is stored.
    #[serde(default)]
    value: Option<String>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client for the plugin configuration API.
pub struct BackendClient {
    /// Reqwest client instance.
    client: Client,
    /// API base URL.
    base_url: Url,
    /// Optional bearer token.
    bearer_token: Option<String>,
    /// Maximum response body size in bytes.
    max_response_bytes: usize,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url.as_str())
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("max_response_bytes", &self.max_response_bytes)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Builds a client.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the base URL is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(config: BackendClientConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|err| BackendError::Config(format!("invalid base url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Config("base url cannot be a base".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url,
            bearer_token: config.bearer_token,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Lists installed plugins.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the request or parsing fails.
    pub async fn list_plugins(&self) -> Result<Vec<PluginSummary>, BackendError> {
        let url = self.endpoint(&["plugins"])?;
        let response: PluginListResponse = self.send_json(Method::GET, url, None).await?;
        Ok(response.plugins)
    }

    /// Fetches a plugin's schema, hints, and stored values.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the request or parsing fails.
    pub async fn get_config(&self, plugin_id: &str) -> Result<PluginConfigDocument, BackendError> {
        let url = self.endpoint(&["plugins", plugin_id, "config"])?;
        let mut document: PluginConfigDocument = self.send_json(Method::GET, url, None).await?;
        if document.plugin_id.is_empty() {
            document.plugin_id = plugin_id.to_string();
        }
        Ok(document)
    }

    /// Persists a plugin's values.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the request fails.
    pub async fn update_config(
        &self,
        plugin_id: &str,
        values: &ConfigValues,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&["plugins", plugin_id, "config"])?;
        let body = json!({ "values": values });
        let _: Value = self.send_json(Method::PUT, url, Some(&body)).await?;
        Ok(())
    }

    /// Requests the stored value of a secret field.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the request or parsing fails.
    pub async fn reveal_secret(
        &self,
        plugin_id: &str,
        key: &str,
    ) -> Result<Option<String>, BackendError> {
        let url = self.endpoint(&["plugins", plugin_id, "config", "reveal"])?;
        let body = json!({ "key": key });
        let response: RevealResponse = self.send_json(Method::POST, url, Some(&body)).await?;
        Ok(response.value)
    }

    /// Builds `{base}/api/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| BackendError::Config("base url cannot be a base".to_string()))?;
            path.pop_if_empty().push("api");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Sends a request and parses the JSON response.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the request fails or the response is invalid.
    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<T, BackendError> {
        let mut request = self.client.request(method, url).headers(self.headers()?);
        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|err| BackendError::Json(format!("request serialization failed: {err}")))?;
            request = request.body(payload);
        }
        let response =
            request.send().await.map_err(|err| BackendError::Transport(err.to_string()))?;
        let status = response.status();
        let body = read_response_body_with_limit(response, self.max_response_bytes).await?;
        if !status.is_success() {
            let preview = String::from_utf8_lossy(&body);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: preview.trim().chars().take(512).collect(),
            });
        }
        let bytes: &[u8] = if body.iter().all(u8::is_ascii_whitespace) { b"null" } else { &body };
        serde_json::from_slice(bytes)
            .map_err(|err| BackendError::Json(format!("invalid response body: {err}")))
    }

    /// Builds request headers.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when header values are invalid.
    fn headers(&self) -> Result<HeaderMap, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.bearer_token {
            let value = format!("Bearer {token}");
            let header = HeaderValue::from_str(&value)
                .map_err(|_| BackendError::Config("invalid bearer token header".to_string()))?;
            headers.insert(AUTHORIZATION, header);
        }
        Ok(headers)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a response body while enforcing a hard byte limit.
///
/// # Errors
///
/// Returns [`BackendError::ResponseTooLarge`] once the limit is exceeded.
async fn read_response_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, BackendError> {
    let mut body = Vec::new();
    let mut total: usize = 0;
    while let Some(chunk) =
        response.chunk().await.map_err(|err| BackendError::Transport(err.to_string()))?
    {
        let next_total = total.checked_add(chunk.len()).ok_or(BackendError::ResponseTooLarge {
            actual: usize::MAX,
            limit,
        })?;
        if next_total > limit {
            return Err(BackendError::ResponseTooLarge {
                actual: next_total,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
        total = next_total;
    }
    Ok(body)
}

// ============================================================================
// SECTION: Secret Revealer
// ============================================================================

/// [`SecretRevealer`] backed by [`BackendClient::reveal_secret`].
#[derive(Debug)]
pub struct BackendRevealer<'a> {
    /// Client used for reveal requests.
    client: &'a BackendClient,
}

impl<'a> BackendRevealer<'a> {
    /// Wraps a client.
    #[must_use]
    pub const fn new(client: &'a BackendClient) -> Self {
        Self {
            client,
        }
    }
}

#[async_trait]
impl SecretRevealer for BackendRevealer<'_> {
    async fn reveal(&self, plugin_id: &str, key: &str) -> Result<Option<String>, RevealError> {
        self.client.reveal_secret(plugin_id, key).await.map_err(|err| match err {
            BackendError::Json(message) => RevealError::InvalidResponse(message),
            other => RevealError::Unavailable(other.to_string()),
        })
    }
}
