// crates/milady-config-ui/src/props.rs
// ============================================================================
// Module: Field Renderer Contract
// Description: Props, renderer-local state, edits, and the renderer trait.
// Purpose: Define the seam between the orchestrator and per-type renderers.
// Dependencies: serde, serde_json, milady-config-core
// ============================================================================

//! ## Overview
//! A [`FieldRenderer`] turns [`FieldRenderProps`] into a [`Control`] and maps
//! user [`FieldEdit`]s to an [`EditOutcome`]. Renderers never see or write the
//! host's values map directly: they read the current value from props and
//! report a replacement value, which the orchestrator forwards to `onChange`.
//!
//! Transient UI state (mask toggle, search text, JSON draft, preview mode)
//! lives in [`FieldUiState`], owned by the orchestrator per field key, and is
//! never merged into the values map.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use milady_config_core::FieldOption;
use milady_config_core::FieldType;
use milady_config_core::PropertySchema;
use milady_config_core::ResolvedField;
use milady_config_core::UiHint;
use milady_config_core::resolve_options;
use milady_config_core::schema::display_value;
use serde_json::Value;

use crate::node::Control;
use crate::node::MarkdownMode;
use crate::registry::FieldRegistry;

// ============================================================================
// SECTION: Props
// ============================================================================

/// Inputs handed to a field renderer.
#[derive(Clone, Copy)]
pub struct FieldRenderProps<'a> {
    /// Plugin identifier.
    pub plugin_id: &'a str,
    /// Resolved field.
    pub field: &'a ResolvedField,
    /// Current value from the host.
    pub value: Option<&'a Value>,
    /// Backend reports a stored value.
    pub is_set: bool,
    /// Current validation messages.
    pub errors: &'a [String],
    /// Edits are ignored.
    pub readonly: bool,
    /// The host can reveal secrets.
    pub can_reveal: bool,
    /// Registry used for nested fields.
    pub registry: &'a FieldRegistry,
}

impl<'a> FieldRenderProps<'a> {
    /// Field key.
    #[must_use]
    pub fn key(&self) -> &'a str {
        &self.field.key
    }

    /// Property schema.
    #[must_use]
    pub fn schema(&self) -> &'a PropertySchema {
        &self.field.schema
    }

    /// Merged hint.
    #[must_use]
    pub fn hint(&self) -> &'a UiHint {
        &self.field.hint
    }

    /// Resolved field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field.field_type
    }

    /// Schema-required marker.
    #[must_use]
    pub fn required(&self) -> bool {
        self.field.required
    }

    /// Options from `hint.options`, schema `enum`/`oneOf`, or `items.enum`.
    #[must_use]
    pub fn options(&self) -> Vec<FieldOption> {
        resolve_options(self.schema(), self.hint())
    }

    /// Current value as display text; empty when missing.
    #[must_use]
    pub fn text_value(&self) -> String {
        self.value.map(display_value).unwrap_or_default()
    }
}

// ============================================================================
// SECTION: Renderer-Local State
// ============================================================================

/// Transient per-field UI state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldUiState {
    /// Password is shown in clear text.
    pub unmasked: bool,
    /// Value fetched through a reveal.
    pub revealed: Option<String>,
    /// Combobox search text.
    pub search: String,
    /// JSON editor text not yet committed.
    pub json_draft: Option<String>,
    /// JSON error from the last blur.
    pub json_error: Option<String>,
    /// Markdown editor mode.
    pub markdown_mode: MarkdownMode,
    /// State of nested group children keyed by child key.
    pub nested: BTreeMap<String, FieldUiState>,
}

// ============================================================================
// SECTION: Edits
// ============================================================================

/// User interaction applied to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    /// Replaces the text of a text-like input.
    SetText(String),
    /// Sets a number directly.
    SetNumber(f64),
    /// Stepper up.
    Increment,
    /// Stepper down.
    Decrement,
    /// Sets a boolean.
    SetBool(bool),
    /// Flips a boolean.
    Toggle,
    /// Chooses an option.
    Select(Value),
    /// Adds or removes an option from a multi-choice selection.
    ToggleOption(Value),
    /// Updates combobox search text.
    Search(String),
    /// Flips the password mask.
    ToggleMask,
    /// Field lost focus.
    Blur,
    /// Field was clicked (buttons, custom components).
    Click,
    /// Appends a list item.
    AddItem(String),
    /// Replaces a list item.
    SetItem {
        /// Item index.
        index: usize,
        /// New text.
        text: String,
    },
    /// Removes a list item.
    RemoveItem(usize),
    /// Adds a key-value entry.
    AddEntry {
        /// Entry key.
        key: String,
        /// Entry value.
        value: String,
    },
    /// Updates an existing key-value entry.
    SetEntry {
        /// Entry key.
        key: String,
        /// Entry value.
        value: String,
    },
    /// Renames a key-value entry, keeping its position.
    RenameEntry {
        /// Current key.
        from: String,
        /// New key.
        to: String,
    },
    /// Removes a key-value entry.
    RemoveEntry(String),
    /// Appends an empty table row.
    AddRow,
    /// Sets one table cell.
    SetCell {
        /// Row index.
        row: usize,
        /// Column key.
        column: String,
        /// Cell text.
        text: String,
    },
    /// Removes a table row.
    RemoveRow(usize),
    /// Switches the markdown editor mode.
    SetMode(MarkdownMode),
    /// Edit addressed to a child of a group field.
    Nested {
        /// Child key.
        key: String,
        /// Child edit.
        edit: Box<FieldEdit>,
    },
    /// Replaces the value wholesale.
    SetValue(Value),
    /// Clears the value.
    Clear,
}

impl FieldEdit {
    /// Returns true for edits that only touch renderer-local state.
    #[must_use]
    pub fn is_ui_only(&self) -> bool {
        match self {
            Self::Search(_) | Self::ToggleMask | Self::SetMode(_) | Self::Blur | Self::Click => {
                true
            }
            Self::Nested {
                edit, ..
            } => edit.is_ui_only(),
            _ => false,
        }
    }

    /// Action event name raised by the edit besides `change`, if any.
    #[must_use]
    pub const fn event_name(&self) -> Option<&'static str> {
        match self {
            Self::Blur => Some("blur"),
            Self::Click => Some("click"),
            _ => None,
        }
    }
}

/// Result of applying an edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The field's value changed; forward to `onChange`.
    Changed(Value),
    /// Nothing to report upward.
    Unchanged,
}

// ============================================================================
// SECTION: Renderer Trait
// ============================================================================

/// Per-type field renderer.
pub trait FieldRenderer: Send + Sync {
    /// Describes the control for the current props and UI state.
    fn render(&self, props: &FieldRenderProps<'_>, ui: &FieldUiState) -> Control;

    /// Applies an edit. Unsupported edits return [`EditOutcome::Unchanged`].
    fn apply(
        &self,
        props: &FieldRenderProps<'_>,
        ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome;
}
