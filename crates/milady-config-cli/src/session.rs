// crates/milady-config-cli/src/session.rs
// ============================================================================
// Module: Settings Session
// Description: Host-side owner of a plugin's values during an edit session.
// Purpose: Apply edits through the renderer and gate saves on validation.
// Dependencies: async-trait, serde, serde_json, thiserror, milady-config-core, milady-config-ui
// ============================================================================

//! ## Overview
//! The engine never writes values. A [`SettingsSession`] plays the host role:
//! it owns `values` and `set_keys`, forwards user edits to the
//! [`ConfigRenderer`], and applies whatever the renderer reports through its
//! change callback. [`SettingsSession::save`] runs a full validation pass and
//! refuses to persist while any visible field has errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use milady_config_core::ConfigValues;
use milady_config_core::EngineEventSink;
use milady_config_core::SetKeys;
use milady_config_core::coerce_input;
use milady_config_core::is_empty_value;
use milady_config_core::merge_hint_documents;
use milady_config_ui::ConfigRenderer;
use milady_config_ui::EditResult;
use milady_config_ui::FieldEdit;
use milady_config_ui::FieldRegistry;
use milady_config_ui::RenderNode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::client::BackendClient;
use crate::client::BackendError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The document could not be read.
    #[error("document io error: {0}")]
    Io(String),
    /// The document exceeds the configured size limit.
    #[error("document exceeds size limit ({size} > {limit})")]
    TooLarge {
        /// Document size in bytes.
        size: u64,
        /// Maximum size in bytes.
        limit: usize,
    },
    /// The document is not valid JSON of the expected shape.
    #[error("document parse error: {0}")]
    Parse(String),
    /// The key does not name a visible field.
    #[error("unknown or hidden field: {0}")]
    UnknownField(String),
    /// Validation failed; nothing was saved.
    #[error("validation failed for: {}", fields.join(", "))]
    Invalid {
        /// Keys of fields with errors.
        fields: Vec<String>,
    },
    /// Persisting the values failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

// ============================================================================
// SECTION: Documents
// ============================================================================

/// Everything needed to render one plugin's settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfigDocument {
    /// Plugin identifier.
    #[serde(default)]
    pub plugin_id: String,
    /// JSON schema document; null when the plugin has no settings.
    #[serde(default)]
    pub schema: Value,
    /// Host-declared UI hints.
    #[serde(default)]
    pub hints: Value,
    /// Plugin-declared UI hints.
    #[serde(default)]
    pub server_hints: Value,
    /// Current values.
    #[serde(default)]
    pub values: ConfigValues,
    /// Keys with a stored backend value.
    #[serde(default)]
    pub set_keys: SetKeys,
}

impl PluginConfigDocument {
    /// Reads a document from a JSON file under a size limit.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the file is unreadable, oversized, or
    /// malformed.
    pub fn from_file(path: &Path, max_bytes: usize) -> Result<Self, SessionError> {
        let bytes = read_bytes_with_limit(path, max_bytes)?;
        serde_json::from_slice(&bytes).map_err(|err| SessionError::Parse(err.to_string()))
    }

    /// Plugin hints overlaid with host hints.
    #[must_use]
    pub fn merged_hints(&self) -> Value {
        merge_hint_documents(&self.server_hints, &self.hints)
    }
}

/// Reads a file, failing once it exceeds `max_bytes`.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, SessionError> {
    let file = File::open(path).map_err(|err| SessionError::Io(err.to_string()))?;
    let size = file.metadata().map_err(|err| SessionError::Io(err.to_string()))?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(SessionError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|err| SessionError::Io(err.to_string()))?;
    if bytes.len() > max_bytes {
        return Err(SessionError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Persistence Seam
// ============================================================================

/// Destination for saved values.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Persists a plugin's values.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the values cannot be stored.
    async fn save_values(
        &self,
        plugin_id: &str,
        values: &ConfigValues,
    ) -> Result<(), BackendError>;
}

#[async_trait]
impl ConfigStore for BackendClient {
    async fn save_values(
        &self,
        plugin_id: &str,
        values: &ConfigValues,
    ) -> Result<(), BackendError> {
        self.update_config(plugin_id, values).await
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Presentation switches applied when a session opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Start with the advanced section expanded.
    pub show_advanced: bool,
    /// Omit the aggregate error summary.
    pub suppress_error_summary: bool,
    /// Offer secret reveal on password fields.
    pub can_reveal: bool,
}

/// Host-side edit session for one plugin.
pub struct SettingsSession {
    /// Orchestrator for the plugin's form.
    renderer: ConfigRenderer,
    /// Current values; the session is their only writer.
    values: ConfigValues,
    /// Keys the backend reports as stored.
    set_keys: SetKeys,
    /// Keys edited since the last save.
    dirty: BTreeSet<String>,
}

impl SettingsSession {
    /// Opens a session over a document.
    #[must_use]
    pub fn open(
        document: PluginConfigDocument,
        registry: Arc<FieldRegistry>,
        sink: Arc<dyn EngineEventSink>,
        options: SessionOptions,
    ) -> Self {
        let mut renderer = ConfigRenderer::new(document.plugin_id.clone(), registry)
            .with_sink(sink)
            .with_reveal(options.can_reveal)
            .with_error_summary_suppressed(options.suppress_error_summary);
        renderer.load_documents(&document.schema, &document.merged_hints());
        if options.show_advanced {
            renderer.toggle_advanced();
        }
        Self {
            renderer,
            values: document.values,
            set_keys: document.set_keys,
            dirty: BTreeSet::new(),
        }
    }

    /// Orchestrator.
    #[must_use]
    pub const fn renderer(&self) -> &ConfigRenderer {
        &self.renderer
    }

    /// Mutable orchestrator, for toggles and reveals.
    pub const fn renderer_mut(&mut self) -> &mut ConfigRenderer {
        &mut self.renderer
    }

    /// Current values.
    #[must_use]
    pub const fn values(&self) -> &ConfigValues {
        &self.values
    }

    /// Keys with a stored backend value.
    #[must_use]
    pub const fn set_keys(&self) -> &SetKeys {
        &self.set_keys
    }

    /// Keys edited since the last save.
    #[must_use]
    pub const fn dirty_keys(&self) -> &BTreeSet<String> {
        &self.dirty
    }

    /// Renders the current form.
    #[must_use]
    pub fn render(&self) -> RenderNode {
        self.renderer.render(&self.values, &self.set_keys)
    }

    /// Applies an edit; changes reported by the renderer land in `values`.
    pub fn edit(&mut self, key: &str, edit: FieldEdit) -> EditResult {
        let mut changes: Vec<(String, Value)> = Vec::new();
        let result =
            self.renderer.handle_edit(key, edit, &self.values, &self.set_keys, |key, value| {
                changes.push((key.to_string(), value.clone()));
            });
        for (key, value) in changes {
            if value.is_null() {
                self.values.remove(&key);
            } else {
                self.values.insert(key.clone(), value);
            }
            self.dirty.insert(key);
        }
        result
    }

    /// Sets a field from command-line text, coerced to the field's type.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownField`] when the key is not a visible
    /// field.
    pub fn set_text(&mut self, key: &str, raw: &str) -> Result<EditResult, SessionError> {
        let field = self
            .renderer
            .field(key)
            .filter(|field| field.is_visible(&self.values))
            .ok_or_else(|| SessionError::UnknownField(key.to_string()))?;
        let value = coerce_input(field, raw);
        Ok(self.edit(key, FieldEdit::SetValue(value)))
    }

    /// Runs a full validation pass and returns the keys with errors.
    pub fn invalid_fields(&mut self) -> Vec<String> {
        if self.renderer.validate_all(&self.values) {
            return Vec::new();
        }
        self.renderer
            .field_errors()
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Validates and persists the values.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Invalid`] without saving when validation fails,
    /// or [`SessionError::Backend`] when the store rejects the values.
    pub async fn save(&mut self, store: &dyn ConfigStore) -> Result<(), SessionError> {
        let fields = self.invalid_fields();
        if !fields.is_empty() {
            return Err(SessionError::Invalid {
                fields,
            });
        }
        store.save_values(self.renderer.plugin_id(), &self.values).await?;
        for key in std::mem::take(&mut self.dirty) {
            if self.values.get(&key).is_some_and(|value| !is_empty_value(Some(value))) {
                self.set_keys.insert(key);
            } else {
                self.set_keys.remove(&key);
            }
        }
        Ok(())
    }
}
