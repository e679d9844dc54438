// crates/milady-config-ui/src/node.rs
// ============================================================================
// Module: View Tree
// Description: Serializable render output consumed by front ends.
// Purpose: Describe forms, groups, fields, and controls without a UI toolkit.
// Dependencies: serde, serde_json, milady-config-core
// ============================================================================

//! ## Overview
//! Rendering produces a [`RenderNode`] tree. Front ends (web bridge, terminal,
//! JSON dump) draw it however they like. Nodes hold display data only; secret
//! values appear solely after an explicit reveal or unmask.

// ============================================================================
// SECTION: Imports
// ============================================================================

use milady_config_core::FieldType;
use milady_config_core::FieldWidth;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::markdown::Block;

// ============================================================================
// SECTION: Form Nodes
// ============================================================================

/// Node of the rendered form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum RenderNode {
    /// Nothing to configure, or the schema was unusable.
    EmptyState {
        /// Explanation shown to the user.
        message: String,
    },
    /// Root of a rendered form.
    Form {
        /// Plugin identifier.
        plugin_id: String,
        /// Child nodes in display order.
        children: Vec<RenderNode>,
    },
    /// Required-field configuration progress.
    ProgressBar {
        /// Configured required fields.
        configured: usize,
        /// Visible required fields.
        total: usize,
    },
    /// Aggregate error list with jump targets.
    ErrorSummary {
        /// One entry per field with errors.
        entries: Vec<SummaryEntry>,
    },
    /// Titled group of fields.
    Group {
        /// Group name.
        name: String,
        /// Icon name for the header.
        icon: &'static str,
        /// Field nodes.
        children: Vec<RenderNode>,
    },
    /// Collapsible advanced section.
    Disclosure {
        /// Toggle label.
        label: String,
        /// Number of fields behind the toggle.
        count: usize,
        /// Whether the section is expanded.
        open: bool,
        /// Field nodes; empty while collapsed.
        children: Vec<RenderNode>,
    },
    /// Single field.
    Field(Box<FieldNode>),
}

/// Error summary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    /// Field key.
    pub key: String,
    /// Field label.
    pub label: String,
    /// Element id to scroll to: `field-{pluginId}-{key}`.
    pub target_id: String,
    /// Field messages.
    pub messages: Vec<String>,
}

/// Field wrapper output: label, help, status, errors, and the control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldNode {
    /// Element id: `field-{pluginId}-{key}`.
    pub id: String,
    /// Field key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Resolved field type.
    pub field_type: FieldType,
    /// Layout width.
    pub width: FieldWidth,
    /// Required marker.
    pub required: bool,
    /// Backend reports a stored value.
    pub is_set: bool,
    /// Read-only control.
    pub readonly: bool,
    /// Validation messages.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Type-specific control.
    pub control: Control,
}

// ============================================================================
// SECTION: Controls
// ============================================================================

/// Input flavor for single-line text controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Plain text.
    Text,
    /// URL.
    Url,
    /// Email.
    Email,
    /// Calendar date.
    Date,
    /// Date and time.
    Datetime,
    /// Hex color.
    Color,
}

/// Choice option as displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    /// Stored value.
    pub value: Value,
    /// Display label.
    pub label: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Currently selected.
    pub selected: bool,
}

/// Presentation of a multi-choice control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiStyle {
    /// Dropdown with chips.
    Dropdown,
    /// Checkbox list.
    Checkboxes,
}

/// Markdown editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownMode {
    /// Source editing.
    #[default]
    Edit,
    /// Rendered preview.
    Preview,
}

/// Type-specific control description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    /// Single-line input.
    TextInput {
        /// Input flavor.
        kind: InputKind,
        /// Current text.
        value: String,
        /// Placeholder.
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    /// Masked secret input.
    Password {
        /// True while the value is hidden.
        masked: bool,
        /// Visible text; `None` while masked.
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        /// A stored or typed value exists.
        has_value: bool,
        /// A reveal can be requested from the host.
        can_reveal: bool,
        /// Placeholder.
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    /// Numeric input with stepper.
    Number {
        /// Current number, if the text parses.
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
        /// Raw text.
        text: String,
        /// Minimum.
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Maximum.
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        /// Stepper increment.
        step: f64,
        /// Unit label.
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// On/off switch.
    Toggle {
        /// Current state.
        on: bool,
    },
    /// Plain dropdown.
    Select {
        /// Options.
        options: Vec<OptionView>,
        /// Placeholder.
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    /// Searchable combobox (five or more options).
    Combobox {
        /// Current search text.
        search: String,
        /// Options matching the search.
        options: Vec<OptionView>,
        /// Total option count before filtering.
        total: usize,
    },
    /// Radio group.
    Radio {
        /// Options.
        options: Vec<OptionView>,
    },
    /// Multi-choice control.
    MultiSelect {
        /// Presentation.
        style: MultiStyle,
        /// Options.
        options: Vec<OptionView>,
    },
    /// Multi-line text.
    TextArea {
        /// Current text.
        value: String,
        /// Visible rows.
        rows: u32,
        /// Placeholder.
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    /// JSON editor.
    Json {
        /// Editor text.
        draft: String,
        /// Parse or safety error from the last blur.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// List of text items.
    List {
        /// Item texts.
        items: Vec<String>,
        /// Another item may be added.
        can_add: bool,
        /// Item cap.
        max: usize,
    },
    /// String map editor.
    KeyValue {
        /// Entries in insertion order.
        entries: Vec<(String, String)>,
        /// Another entry may be added.
        can_add: bool,
        /// Entry cap.
        max: usize,
    },
    /// Row editor.
    Table {
        /// Column keys from `items.properties`.
        columns: Vec<String>,
        /// Rows as objects.
        rows: Vec<Map<String, Value>>,
        /// Another row may be added.
        can_add: bool,
        /// Row cap.
        max: usize,
    },
    /// Markdown editor with preview.
    Markdown {
        /// Active mode.
        mode: MarkdownMode,
        /// Source text.
        source: String,
        /// Preview blocks; empty in edit mode.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        preview: Vec<Block>,
        /// Visible rows.
        rows: u32,
    },
    /// Nested object fields.
    Group {
        /// Child field nodes.
        children: Vec<RenderNode>,
    },
    /// Placeholder for a host-provided component.
    Custom {
        /// Component name from `hint.component`.
        #[serde(skip_serializing_if = "Option::is_none")]
        component: Option<String>,
        /// Current value, passed through untouched.
        value: Value,
    },
}

/// Returns the stable element id for a field.
#[must_use]
pub fn field_element_id(plugin_id: &str, key: &str) -> String {
    format!("field-{plugin_id}-{key}")
}

/// Picks a header icon from a group name.
#[must_use]
pub fn group_icon(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    let table: [(&[&str], &'static str); 6] = [
        (&["auth", "secur", "credential", "key"], "lock"),
        (&["network", "connect", "endpoint", "api"], "globe"),
        (&["model", "llm", "provider"], "cpu"),
        (&["voice", "audio", "media"], "speaker"),
        (&["storage", "database", "cache"], "database"),
        (&["advanced", "debug"], "wrench"),
    ];
    table
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| lower.contains(needle)))
        .map_or("settings", |(_, icon)| *icon)
}
