// crates/milady-config-ui/src/renderers/mod.rs
// ============================================================================
// Module: Field Renderers
// Description: Built-in renderer implementations for every field type.
// Purpose: Provide the default type -> renderer table for registries.
// Dependencies: serde_json, milady-config-core
// ============================================================================

//! ## Overview
//! Each renderer is a stateless unit struct (or a small configuration struct)
//! implementing [`FieldRenderer`]. Renderer-local state lives in
//! [`crate::props::FieldUiState`], so a single renderer instance serves every
//! field of its type.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod boolean;
pub mod choice;
pub mod collections;
pub mod custom;
pub mod group;
pub mod json;
pub mod markdown;
pub mod number;
pub mod password;
pub mod text;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use milady_config_core::FieldType;
use milady_config_core::PropertySchema;
use milady_config_core::SchemaType;
use serde_json::Value;

pub use boolean::BooleanRenderer;
pub use choice::MultiSelectRenderer;
pub use choice::RadioRenderer;
pub use choice::SEARCHABLE_THRESHOLD;
pub use choice::SelectRenderer;
pub use collections::ArrayRenderer;
pub use collections::KeyValueRenderer;
pub use collections::TableRenderer;
pub use custom::CustomRenderer;
pub use group::GroupRenderer;
pub use json::JsonRenderer;
pub use markdown::MarkdownRenderer;
pub use number::NumberRenderer;
pub use password::PasswordRenderer;
pub use text::TextAreaRenderer;
pub use text::TextRenderer;

use crate::node::InputKind;
use crate::node::MultiStyle;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderer;

// ============================================================================
// SECTION: Standard Table
// ============================================================================

/// Built-in renderer for every field type.
#[must_use]
pub fn standard_renderers() -> Vec<(FieldType, Arc<dyn FieldRenderer>)> {
    vec![
        entry(FieldType::Text, TextRenderer::new(InputKind::Text)),
        entry(FieldType::Password, PasswordRenderer),
        entry(FieldType::Number, NumberRenderer),
        entry(FieldType::Boolean, BooleanRenderer),
        entry(FieldType::Url, TextRenderer::new(InputKind::Url)),
        entry(FieldType::Email, TextRenderer::new(InputKind::Email)),
        entry(FieldType::Select, SelectRenderer),
        entry(FieldType::Radio, RadioRenderer),
        entry(FieldType::Multiselect, MultiSelectRenderer::new(MultiStyle::Dropdown)),
        entry(FieldType::CheckboxGroup, MultiSelectRenderer::new(MultiStyle::Checkboxes)),
        entry(FieldType::Textarea, TextAreaRenderer),
        entry(FieldType::Date, TextRenderer::new(InputKind::Date)),
        entry(FieldType::Datetime, TextRenderer::new(InputKind::Datetime)),
        entry(FieldType::Color, TextRenderer::new(InputKind::Color)),
        entry(FieldType::Json, JsonRenderer),
        entry(FieldType::Array, ArrayRenderer),
        entry(FieldType::Keyvalue, KeyValueRenderer),
        entry(FieldType::Table, TableRenderer),
        entry(FieldType::Markdown, MarkdownRenderer),
        entry(FieldType::Group, GroupRenderer),
        entry(FieldType::Custom, CustomRenderer),
    ]
}

/// Boxes a renderer for the standard table.
fn entry(
    field_type: FieldType,
    renderer: impl FieldRenderer + 'static,
) -> (FieldType, Arc<dyn FieldRenderer>) {
    (field_type, Arc::new(renderer))
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Handles edits every renderer accepts: wholesale replacement and clearing.
pub(crate) fn common_edit(edit: FieldEdit) -> EditOutcome {
    match edit {
        FieldEdit::SetValue(value) => EditOutcome::Changed(value),
        FieldEdit::Clear => EditOutcome::Changed(Value::Null),
        _ => EditOutcome::Unchanged,
    }
}

/// Converts a float into a JSON number, preferring integers when exact.
#[must_use]
pub fn number_value(number: f64) -> Value {
    /// Largest magnitude where every integer is exactly representable.
    const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;
    if number.fract() == 0.0 && number.abs() < EXACT_LIMIT {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Integral value within the exactly representable range."
        )]
        let whole = number as i64;
        return Value::from(whole);
    }
    serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number)
}

/// Converts text typed into a cell or list item using the item schema.
#[must_use]
pub fn coerce_text(schema: Option<&PropertySchema>, text: &str) -> Value {
    match schema.and_then(|schema| schema.kind) {
        Some(kind) if kind.is_numeric() => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map_or_else(|| Value::String(text.to_string()), number_value),
        Some(SchemaType::Boolean) => match text.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        },
        _ => Value::String(text.to_string()),
    }
}

// ============================================================================
// SECTION: Test Support
// ============================================================================
