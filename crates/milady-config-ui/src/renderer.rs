// crates/milady-config-ui/src/renderer.rs
// ============================================================================
// Module: Config Renderer
// Description: Orchestrator that turns schema, hints, and values into a form.
// Purpose: Own resolved fields, per-field errors, and renderer-local UI state.
// Dependencies: milady-config-core, serde_json
// ============================================================================

//! ## Overview
//! [`ConfigRenderer`] is the single writer of the field error map and the
//! per-field UI state. The host owns the values map and the set-key list and
//! passes them by reference on every call; the renderer never mutates them and
//! reports value changes through the `on_change` callback instead.
//!
//! Each edit moves through `idle -> validating -> idle` synchronously:
//! the renderer applies the edit, revalidates only the edited field against
//! the next values, forwards the change, and dispatches any bound actions.
//! Actions run outside the renderer; dispatch hands back their futures.
//!
//! Structural problems never fail: a missing schema renders an empty state,
//! malformed hints fall back to defaults, and a missing action handler is
//! logged and skipped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use milady_config_core::ConfigSchema;
use milady_config_core::ConfigValues;
use milady_config_core::EngineEvent;
use milady_config_core::EngineEventSink;
use milady_config_core::EventKind;
use milady_config_core::FieldType;
use milady_config_core::HintError;
use milady_config_core::NoopEventSink;
use milady_config_core::ResolvedField;
use milady_config_core::SchemaError;
use milady_config_core::SetKeys;
use milady_config_core::UiHints;
use milady_config_core::ValidationReport;
use milady_config_core::resolve_fields;
use milady_config_core::resolve_params;
use milady_config_core::validate_field;
use serde::Serialize;
use serde_json::Value;

use crate::actions::ActionRequest;
use crate::actions::PendingAction;
use crate::actions::SecretRevealer;
use crate::field::render_field;
use crate::node::RenderNode;
use crate::node::SummaryEntry;
use crate::node::field_element_id;
use crate::node::group_icon;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderProps;
use crate::props::FieldUiState;
use crate::registry::FieldRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message shown when no usable schema is loaded.
pub const NO_SCHEMA_MESSAGE: &str = "No configuration schema is available for this plugin.";
/// Message shown when every field is hidden or invisible.
pub const NO_FIELDS_MESSAGE: &str = "This plugin has no configurable settings.";
/// Label of the advanced disclosure.
pub const ADVANCED_LABEL: &str = "Advanced settings";
/// Event name dispatched after a value change.
pub const CHANGE_EVENT: &str = "change";

// ============================================================================
// SECTION: Outputs
// ============================================================================

/// Required-field configuration progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Configured visible required fields.
    pub configured: usize,
    /// Visible required fields.
    pub total: usize,
}

impl Progress {
    /// Fraction configured, in `[0, 1]`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "Field counts are far below the f64 mantissa limit."
    )]
    pub fn fraction(self) -> f64 {
        if self.total == 0 { 1.0 } else { self.configured as f64 / self.total as f64 }
    }
}

/// Result of [`ConfigRenderer::handle_edit`].
#[derive(Default)]
pub struct EditResult {
    /// Value forwarded to `on_change`, if the edit changed one.
    pub changed: Option<Value>,
    /// Actions dispatched by the edit; await them or drop them.
    pub actions: Vec<PendingAction>,
}

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Schema-driven settings form for one plugin.
///
/// # Invariants
/// - `fields` is recomputed only when the schema or hints change.
/// - `field_errors` never holds an entry with an empty message list.
/// - UI state never reaches the host's values map.
pub struct ConfigRenderer {
    /// Plugin identifier, used for element ids and events.
    plugin_id: String,
    /// Loaded schema; `None` renders the empty state.
    schema: Option<ConfigSchema>,
    /// Merged hints.
    hints: UiHints,
    /// Renderers, catalog, handlers.
    registry: Arc<FieldRegistry>,
    /// Memoized resolution of `schema` x `hints`.
    fields: Vec<ResolvedField>,
    /// Messages per field key.
    field_errors: BTreeMap<String, Vec<String>>,
    /// Renderer-local state per field key.
    ui: BTreeMap<String, FieldUiState>,
    /// Advanced disclosure expanded.
    advanced_open: bool,
    /// Host suppresses the aggregate error summary.
    suppress_error_summary: bool,
    /// Host can reveal secrets.
    can_reveal: bool,
    /// Diagnostic sink.
    sink: Arc<dyn EngineEventSink>,
}

impl ConfigRenderer {
    /// Creates a renderer with no schema loaded.
    #[must_use]
    pub fn new(plugin_id: impl Into<String>, registry: Arc<FieldRegistry>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            schema: None,
            hints: UiHints::default(),
            registry,
            fields: Vec::new(),
            field_errors: BTreeMap::new(),
            ui: BTreeMap::new(),
            advanced_open: false,
            suppress_error_summary: false,
            can_reveal: false,
            sink: Arc::new(NoopEventSink),
        }
    }

    /// Routes diagnostics to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EngineEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Enables or disables secret reveal affordances.
    #[must_use]
    pub fn with_reveal(mut self, enabled: bool) -> Self {
        self.can_reveal = enabled;
        self
    }

    /// Hides the aggregate error summary when `suppress` is true.
    #[must_use]
    pub fn with_error_summary_suppressed(mut self, suppress: bool) -> Self {
        self.suppress_error_summary = suppress;
        self
    }

    /// Loads a typed schema and hints.
    #[must_use]
    pub fn with_schema(mut self, schema: Option<ConfigSchema>, hints: UiHints) -> Self {
        self.update_schema(schema, hints);
        self
    }

    /// Plugin identifier.
    #[must_use]
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// Loaded schema.
    #[must_use]
    pub const fn schema(&self) -> Option<&ConfigSchema> {
        self.schema.as_ref()
    }

    /// Registry in use.
    #[must_use]
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------------
    // Schema loading
    // ------------------------------------------------------------------------

    /// Loads raw schema and hint documents leniently.
    ///
    /// A null schema document means "no schema". An unusable schema document
    /// logs `malformed_schema` and renders the empty state; a malformed
    /// property only loses its bad keywords and logs `malformed_schema` with
    /// its key. Each unusable property hint key logs
    /// `malformed_hint` and falls back to defaults.
    pub fn load_documents(&mut self, schema: &Value, hints: &Value) {
        let parsed = if schema.is_null() {
            None
        } else {
            match ConfigSchema::parse_lenient(schema) {
                Ok((parsed, issues)) => {
                    for issue in issues {
                        let field = match &issue {
                            SchemaError::Malformed {
                                key, ..
                            } => key.clone(),
                            _ => None,
                        };
                        self.emit(EventKind::MalformedSchema, field.as_deref(), issue.to_string());
                    }
                    Some(parsed)
                }
                Err(err) => {
                    self.emit(EventKind::MalformedSchema, None, err.to_string());
                    None
                }
            }
        };
        let (hints, errors) = UiHints::from_value(hints);
        for err in errors {
            let field = match &err {
                HintError::Malformed {
                    key, ..
                } => Some(key.clone()),
                HintError::NotAnObject => None,
            };
            self.emit(EventKind::MalformedHint, field.as_deref(), err.to_string());
        }
        self.update_schema(parsed, hints);
    }

    /// Replaces the schema and hints, re-resolving only when they changed.
    pub fn update_schema(&mut self, schema: Option<ConfigSchema>, hints: UiHints) {
        if self.schema == schema && self.hints == hints {
            return;
        }
        self.schema = schema;
        self.hints = hints;
        self.fields = self.schema.as_ref().map_or_else(Vec::new, |schema| {
            resolve_fields(schema, &self.hints, self.registry.catalog())
        });
        let keys: Vec<String> = self.fields.iter().map(|field| field.key.clone()).collect();
        self.field_errors.retain(|key, _| keys.contains(key));
        self.ui.retain(|key, _| keys.contains(key));
        let fallbacks: Vec<(String, String, FieldType)> = self
            .fields
            .iter()
            .filter_map(|field| {
                field
                    .fallback_from
                    .as_ref()
                    .map(|raw| (field.key.clone(), raw.clone(), field.field_type))
            })
            .collect();
        for (key, raw, resolved) in fallbacks {
            self.emit(
                EventKind::UnknownFieldType,
                Some(&key),
                format!("field type `{raw}` is unavailable; rendering as {}", resolved.as_str()),
            );
        }
    }

    // ------------------------------------------------------------------------
    // Field views
    // ------------------------------------------------------------------------

    /// Every resolved field (hidden fields excluded) in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    /// Resolved field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Fields visible under `values`, in declaration order.
    #[must_use]
    pub fn visible_fields(&self, values: &ConfigValues) -> Vec<&ResolvedField> {
        self.fields.iter().filter(|field| field.is_visible(values)).collect()
    }

    /// Splits visible fields into general and advanced, each sorted with
    /// required-unconfigured fields first and then by `order`. The sort is
    /// stable, so ties keep declaration order.
    #[must_use]
    pub fn partition<'a>(
        &'a self,
        values: &ConfigValues,
        set_keys: &SetKeys,
    ) -> (Vec<&'a ResolvedField>, Vec<&'a ResolvedField>) {
        let (mut general, mut advanced): (Vec<_>, Vec<_>) =
            self.visible_fields(values).into_iter().partition(|field| !field.advanced);
        let sort_key = |field: &&ResolvedField| {
            let pending = field.required && !field.is_configured(values, set_keys);
            (!pending, field.order)
        };
        general.sort_by_key(sort_key);
        advanced.sort_by_key(sort_key);
        (general, advanced)
    }

    /// Groups fields by `group`, in order of first appearance.
    #[must_use]
    pub fn group_fields<'a>(
        fields: &[&'a ResolvedField],
    ) -> Vec<(String, Vec<&'a ResolvedField>)> {
        let mut groups: Vec<(String, Vec<&'a ResolvedField>)> = Vec::new();
        for &field in fields {
            match groups.iter_mut().find(|(name, _)| *name == field.group) {
                Some((_, members)) => members.push(field),
                None => groups.push((field.group.clone(), vec![field])),
            }
        }
        groups
    }

    /// Required-field progress, or `None` when there is nothing left to show:
    /// no visible required fields, or all of them configured.
    #[must_use]
    pub fn progress(&self, values: &ConfigValues, set_keys: &SetKeys) -> Option<Progress> {
        let required: Vec<&ResolvedField> =
            self.visible_fields(values).into_iter().filter(|field| field.required).collect();
        let total = required.len();
        let configured =
            required.iter().filter(|field| field.is_configured(values, set_keys)).count();
        (total > 0 && configured < total).then_some(Progress {
            configured,
            total,
        })
    }

    /// Advanced disclosure state.
    #[must_use]
    pub const fn advanced_open(&self) -> bool {
        self.advanced_open
    }

    /// Flips the advanced disclosure.
    pub const fn toggle_advanced(&mut self) {
        self.advanced_open = !self.advanced_open;
    }

    /// Renderer-local state for a field, if any exists yet.
    #[must_use]
    pub fn ui_state(&self, key: &str) -> Option<&FieldUiState> {
        self.ui.get(key)
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Current error map.
    #[must_use]
    pub const fn field_errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.field_errors
    }

    /// Messages for one field; empty when valid or not yet validated.
    #[must_use]
    pub fn errors_for(&self, key: &str) -> &[String] {
        self.field_errors.get(key).map_or(&[], Vec::as_slice)
    }

    /// Revalidates one field and replaces its entry in the error map.
    pub fn validate_key(&mut self, key: &str, values: &ConfigValues) {
        let Some(report) = self.field(key).map(|field| self.run_field(field, values)) else {
            return;
        };
        self.store_report(key, report);
    }

    /// Revalidates every visible field, replacing the whole error map.
    ///
    /// Returns true when no field has errors.
    pub fn validate_all(&mut self, values: &ConfigValues) -> bool {
        let reports: Vec<(String, ValidationReport)> = self
            .visible_fields(values)
            .into_iter()
            .map(|field| (field.key.clone(), self.run_field(field, values)))
            .collect();
        self.field_errors.clear();
        for (key, report) in reports {
            self.store_report(&key, report);
        }
        self.field_errors.is_empty()
    }

    /// Runs the per-field pipeline.
    fn run_field(&self, field: &ResolvedField, values: &ConfigValues) -> ValidationReport {
        validate_field(
            field,
            values,
            self.registry.catalog(),
            self.registry.validation_functions(),
        )
    }

    /// Stores a report and logs its degradations.
    fn store_report(&mut self, key: &str, report: ValidationReport) {
        for pattern in &report.skipped_patterns {
            self.emit(
                EventKind::PatternSkipped,
                Some(key),
                format!("pattern skipped as unsafe or invalid: {pattern}"),
            );
        }
        for function in &report.missing_functions {
            self.emit(
                EventKind::MissingValidationFunction,
                Some(key),
                format!("validation function `{function}` is not registered"),
            );
        }
        if report.errors.is_empty() {
            self.field_errors.remove(key);
        } else {
            self.field_errors.insert(key.to_string(), report.errors);
        }
    }

    // ------------------------------------------------------------------------
    // Edits and actions
    // ------------------------------------------------------------------------

    /// Applies a user edit to one field.
    ///
    /// Value edits on read-only or invisible fields are ignored. When the edit
    /// changes the value, the field is revalidated against the next values,
    /// `on_change` receives the new value, and a `change` binding is
    /// dispatched. `blur` and `click` edits dispatch their own bindings.
    pub fn handle_edit<F>(
        &mut self,
        key: &str,
        edit: FieldEdit,
        values: &ConfigValues,
        set_keys: &SetKeys,
        mut on_change: F,
    ) -> EditResult
    where
        F: FnMut(&str, &Value),
    {
        let mut result = EditResult::default();
        let Some(index) = self
            .fields
            .iter()
            .position(|field| field.key == key && field.is_visible(values))
        else {
            return result;
        };
        let event = edit.event_name();
        let ui_only = edit.is_ui_only();
        let readonly = self.fields[index].readonly;
        let registry = Arc::clone(&self.registry);
        let outcome = if readonly && !ui_only {
            EditOutcome::Unchanged
        } else {
            let field = &self.fields[index];
            let props = FieldRenderProps {
                plugin_id: &self.plugin_id,
                field,
                value: values.get(key),
                is_set: set_keys.contains(key),
                errors: self.field_errors.get(key).map_or(&[], Vec::as_slice),
                readonly,
                can_reveal: self.can_reveal,
                registry: &registry,
            };
            let ui = self.ui.entry(key.to_string()).or_default();
            registry.renderer(field.field_type).apply(&props, ui, edit)
        };
        let mut current = values.get(key).cloned();
        if let EditOutcome::Changed(next) = outcome {
            let mut next_values = values.clone();
            next_values.insert(key.to_string(), next.clone());
            self.validate_key(key, &next_values);
            on_change(key, &next);
            if let Some(action) = self.dispatch(key, CHANGE_EVENT, Some(&next)) {
                result.actions.push(action);
            }
            current = Some(next.clone());
            result.changed = Some(next);
        }
        if let Some(event) = event
            && let Some(action) = self.dispatch(key, event, current.as_ref())
        {
            result.actions.push(action);
        }
        result
    }

    /// Dispatches the binding for `event` on a field using the current value.
    #[must_use]
    pub fn trigger(&self, key: &str, event: &str, values: &ConfigValues) -> Option<PendingAction> {
        self.dispatch(key, event, values.get(key))
    }

    /// Resolves a binding against the single-key snapshot and starts it.
    fn dispatch(&self, key: &str, event: &str, value: Option<&Value>) -> Option<PendingAction> {
        let field = self.field(key)?;
        let binding = field.hint.on.get(event)?;
        let Some(handler) = self.registry.action(&binding.action) else {
            self.emit(
                EventKind::MissingActionHandler,
                Some(key),
                format!("no handler registered for action `{}` on {event}", binding.action),
            );
            return None;
        };
        let mut snapshot = ConfigValues::new();
        if let Some(value) = value {
            snapshot.insert(key.to_string(), value.clone());
        }
        let request = ActionRequest {
            plugin_id: self.plugin_id.clone(),
            field: key.to_string(),
            event: event.to_string(),
            action: binding.action.clone(),
            params: resolve_params(&binding.params, &snapshot),
        };
        let sink = Arc::clone(&self.sink);
        Some(Box::pin(async move {
            let plugin_id = request.plugin_id.clone();
            let field = request.field.clone();
            let outcome = handler.handle(request).await;
            if let Err(err) = &outcome {
                sink.record(&EngineEvent::new(
                    EventKind::ActionFailed,
                    Some(&plugin_id),
                    Some(&field),
                    err.to_string(),
                ));
            }
            outcome
        }))
    }

    /// Fetches a secret through the host and unmasks the field.
    ///
    /// Returns true when a value was revealed. A missing value or a failed
    /// call leaves the field masked; failures are logged as `reveal_failed`.
    pub async fn reveal(&mut self, key: &str, revealer: &dyn SecretRevealer) -> bool {
        let eligible = self.can_reveal
            && self.field(key).is_some_and(|field| field.field_type == FieldType::Password);
        if !eligible {
            return false;
        }
        match revealer.reveal(&self.plugin_id, key).await {
            Ok(Some(secret)) => {
                let ui = self.ui.entry(key.to_string()).or_default();
                ui.revealed = Some(secret);
                ui.unmasked = true;
                true
            }
            Ok(None) => false,
            Err(err) => {
                self.emit(EventKind::RevealFailed, Some(key), err.to_string());
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Renders the whole form.
    #[must_use]
    pub fn render(&self, values: &ConfigValues, set_keys: &SetKeys) -> RenderNode {
        if self.schema.is_none() {
            return RenderNode::EmptyState {
                message: NO_SCHEMA_MESSAGE.to_string(),
            };
        }
        let (general, advanced) = self.partition(values, set_keys);
        if general.is_empty() && advanced.is_empty() {
            return RenderNode::EmptyState {
                message: NO_FIELDS_MESSAGE.to_string(),
            };
        }
        let mut children = Vec::new();
        if let Some(progress) = self.progress(values, set_keys) {
            children.push(RenderNode::ProgressBar {
                configured: progress.configured,
                total: progress.total,
            });
        }
        if let Some(summary) = self.error_summary(values) {
            children.push(summary);
        }
        let groups = Self::group_fields(&general);
        if groups.len() > 1 {
            for (name, members) in groups {
                children.push(RenderNode::Group {
                    icon: group_icon(&name),
                    name,
                    children: self.render_nodes(&members, values, set_keys),
                });
            }
        } else {
            children.extend(self.render_nodes(&general, values, set_keys));
        }
        if !advanced.is_empty() {
            children.push(RenderNode::Disclosure {
                label: ADVANCED_LABEL.to_string(),
                count: advanced.len(),
                open: self.advanced_open,
                children: if self.advanced_open {
                    self.render_nodes(&advanced, values, set_keys)
                } else {
                    Vec::new()
                },
            });
        }
        RenderNode::Form {
            plugin_id: self.plugin_id.clone(),
            children,
        }
    }

    /// Error summary over visible fields, unless suppressed or empty.
    fn error_summary(&self, values: &ConfigValues) -> Option<RenderNode> {
        if self.suppress_error_summary {
            return None;
        }
        let entries: Vec<SummaryEntry> = self
            .visible_fields(values)
            .into_iter()
            .filter_map(|field| {
                let messages = self.field_errors.get(&field.key)?;
                Some(SummaryEntry {
                    key: field.key.clone(),
                    label: field.label.clone(),
                    target_id: field_element_id(&self.plugin_id, &field.key),
                    messages: messages.clone(),
                })
            })
            .collect();
        (!entries.is_empty()).then_some(RenderNode::ErrorSummary {
            entries,
        })
    }

    /// Renders field nodes for a sorted slice.
    fn render_nodes(
        &self,
        fields: &[&ResolvedField],
        values: &ConfigValues,
        set_keys: &SetKeys,
    ) -> Vec<RenderNode> {
        let default_ui = FieldUiState::default();
        fields
            .iter()
            .map(|field| {
                let props = FieldRenderProps {
                    plugin_id: &self.plugin_id,
                    field,
                    value: values.get(&field.key),
                    is_set: set_keys.contains(&field.key),
                    errors: self.errors_for(&field.key),
                    readonly: field.readonly,
                    can_reveal: self.can_reveal,
                    registry: &self.registry,
                };
                let renderer = self.registry.renderer(field.field_type);
                let ui = self.ui.get(&field.key).unwrap_or(&default_ui);
                RenderNode::Field(Box::new(render_field(&props, renderer, ui)))
            })
            .collect()
    }

    /// Records a diagnostic for this plugin.
    fn emit(&self, kind: EventKind, field: Option<&str>, message: String) {
        self.sink.record(&EngineEvent::new(kind, Some(&self.plugin_id), field, message));
    }
}
