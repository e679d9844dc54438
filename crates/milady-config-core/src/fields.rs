// crates/milady-config-core/src/fields.rs
// ============================================================================
// Module: Field Resolution
// Description: Schema x hint x catalog merge into render-ready field records.
// Purpose: Produce the ordered field list and run the per-field pipeline.
// Dependencies: serde, serde_json, crate::{catalog, hint, schema, validation, visibility}
// ============================================================================

//! ## Overview
//! [`resolve_fields`] walks schema properties in declaration order, merges each
//! with its hint (hint values win over schema-derived defaults), and asks the
//! catalog for a field type. Hidden fields are dropped here and never reach the
//! visibility evaluator. Required-ness is taken from the schema only.
//!
//! [`validate_field`] runs the fixed four-stage pipeline: required, catalog
//! structure, hint pattern, declarative checks. Messages from every stage are
//! concatenated in that order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;

use crate::catalog::FieldCatalog;
use crate::catalog::FieldConstraints;
use crate::catalog::FieldType;
use crate::hint::UiHint;
use crate::hint::UiHints;
use crate::schema::ConfigSchema;
use crate::schema::ConfigValues;
use crate::schema::PropertySchema;
use crate::schema::SchemaType;
use crate::schema::is_empty_value;
use crate::validation::PatternOutcome;
use crate::validation::REQUIRED_MESSAGE;
use crate::validation::ValidationCheck;
use crate::validation::ValidationFunctions;
use crate::validation::ValidationReport;
use crate::validation::pattern_matches;
use crate::validation::run_validation;
use crate::visibility::ShowIf;
use crate::visibility::VisibilityExpr;
use crate::visibility::is_field_visible;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Group name used when a hint declares none.
pub const DEFAULT_GROUP: &str = "General";
/// Sort key for fields without `hint.order`.
pub const DEFAULT_ORDER: i64 = 999;
/// Message used when a hint pattern does not match and no `patternError` is set.
pub const PATTERN_MESSAGE: &str = "Invalid format.";

/// Keys whose values the backend reports as set (possibly masked).
pub type SetKeys = BTreeSet<String>;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Layout width of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldWidth {
    /// Full row.
    #[default]
    Full,
    /// Half row.
    Half,
    /// Third of a row.
    Third,
}

impl FieldWidth {
    /// Parses a hint width; unknown values fall back to `full`.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("half") => Self::Half,
            Some("third") => Self::Third,
            _ => Self::Full,
        }
    }

    /// Stable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Half => "half",
            Self::Third => "third",
        }
    }
}

/// Render-ready field computed from schema, hint, and catalog.
///
/// # Invariants
/// - Never persisted; recomputed whenever schema or hints change.
/// - `required` reflects the schema `required` list only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField {
    /// Property name.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Property schema.
    pub schema: PropertySchema,
    /// Merged hint (defaults when none was declared).
    pub hint: UiHint,
    /// Catalog-resolved type.
    pub field_type: FieldType,
    /// Raw `hint.fieldType` that could not be honored, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_from: Option<String>,
    /// Group name.
    pub group: String,
    /// Layout width.
    pub width: FieldWidth,
    /// Required by the schema.
    pub required: bool,
    /// Collapsed into the advanced section.
    pub advanced: bool,
    /// Read-only control.
    pub readonly: bool,
    /// Sort key.
    pub order: i64,
    /// Rich visibility rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<VisibilityExpr>,
    /// Legacy visibility rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_if: Option<ShowIf>,
    /// Declarative checks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationCheck>,
}

impl ResolvedField {
    /// Applies `visible`/`showIf` precedence against the current values.
    #[must_use]
    pub fn is_visible(&self, values: &ConfigValues) -> bool {
        is_field_visible(self.visible.as_ref(), self.show_if.as_ref(), values)
    }

    /// Effective regex: hint pattern wins over schema pattern.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.hint.pattern.as_deref().or(self.schema.pattern.as_deref())
    }

    /// Returns true when the backend reports the key as set or a value exists.
    #[must_use]
    pub fn is_configured(&self, values: &ConfigValues, set_keys: &SetKeys) -> bool {
        set_keys.contains(&self.key) || !is_empty_value(values.get(&self.key))
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves every non-hidden property in declaration order.
#[must_use]
pub fn resolve_fields(
    schema: &ConfigSchema,
    hints: &UiHints,
    catalog: &FieldCatalog,
) -> Vec<ResolvedField> {
    let default_hint = UiHint::default();
    schema
        .properties
        .iter()
        .filter_map(|(key, property)| {
            let hint = hints.get(key).unwrap_or(&default_hint);
            if hint.hidden {
                return None;
            }
            Some(resolve_field(key, property, hint, schema.is_required(key), catalog))
        })
        .collect()
}

/// Resolves a single property.
#[must_use]
pub fn resolve_field(
    key: &str,
    property: &PropertySchema,
    hint: &UiHint,
    required: bool,
    catalog: &FieldCatalog,
) -> ResolvedField {
    let field_type = catalog.resolve_field_type(property, hint);
    let fallback_from = hint
        .field_type
        .as_ref()
        .filter(|raw| FieldType::parse(raw).is_none_or(|parsed| parsed != field_type))
        .cloned();
    ResolvedField {
        key: key.to_string(),
        label: hint
            .label
            .clone()
            .or_else(|| property.title.clone())
            .unwrap_or_else(|| humanize_key(key)),
        help: hint.help.clone().or_else(|| property.description.clone()),
        schema: property.clone(),
        hint: hint.clone(),
        field_type,
        fallback_from,
        group: hint
            .group
            .clone()
            .filter(|group| !group.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GROUP.to_string()),
        width: FieldWidth::parse(hint.width.as_deref()),
        required,
        advanced: hint.advanced,
        readonly: hint.readonly || property.read_only,
        order: hint.order.unwrap_or(DEFAULT_ORDER),
        visible: hint.visible.clone(),
        show_if: hint.show_if.clone(),
        validation: hint.validation.clone(),
    }
}

/// Builds an object schema from a nested property so groups can resolve their
/// children with the same machinery.
#[must_use]
pub fn nested_schema(property: &PropertySchema) -> ConfigSchema {
    ConfigSchema {
        kind: Some(SchemaType::Object),
        title: property.title.clone(),
        properties: property.properties.clone(),
        required: property.required.clone(),
    }
}

/// Turns `apiKey` / `base_url` / `max-tokens` into `Api Key` / `Base Url` / `Max Tokens`.
#[must_use]
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for ch in key.chars() {
        if matches!(ch, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if ch.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// SECTION: Field Pipeline
// ============================================================================

/// Runs the four-stage validation pipeline for one field.
///
/// Stages: required-but-empty, catalog structure, hint pattern, declarative
/// checks. Empty values skip the structural and pattern stages. A required
/// empty field skips the declarative stage too, so it reports exactly the
/// required message.
#[must_use]
pub fn validate_field(
    field: &ResolvedField,
    values: &ConfigValues,
    catalog: &FieldCatalog,
    functions: &ValidationFunctions,
) -> ValidationReport {
    let value = values.get(&field.key);
    let mut report = ValidationReport::default();
    let empty = is_empty_value(value);
    if empty {
        if field.required {
            report.errors.push(REQUIRED_MESSAGE.to_string());
            return report;
        }
    } else if let Some(value) = value {
        let constraints = FieldConstraints {
            schema: &field.schema,
            hint: &field.hint,
        };
        report.errors.extend(catalog.validate(field.field_type, value, &constraints));
        if let Some(pattern) = field.pattern() {
            match pattern_matches(pattern, value) {
                PatternOutcome::Matched => {}
                PatternOutcome::Mismatched => report.errors.push(
                    field.hint.pattern_error.clone().unwrap_or_else(|| PATTERN_MESSAGE.to_string()),
                ),
                PatternOutcome::Skipped => report.skipped_patterns.push(pattern.to_string()),
            }
        }
    }
    let declarative = run_validation(&field.validation, value, values, functions);
    report.errors.extend(declarative.errors);
    report.missing_functions.extend(declarative.missing_functions);
    report.skipped_patterns.extend(declarative.skipped_patterns);
    report.valid = report.errors.is_empty();
    report
}

// ============================================================================
// SECTION: Description
// ============================================================================

impl FieldCatalog {
    /// Lists every resolved property with its type, for authoring assistants.
    #[must_use]
    pub fn describe_schema(&self, schema: &ConfigSchema, hints: &UiHints) -> String {
        let mut out = String::new();
        for field in resolve_fields(schema, hints, self) {
            let _ = write!(out, "- {} ({}", field.key, field.field_type.as_str());
            if field.required {
                out.push_str(", required");
            }
            if field.advanced {
                out.push_str(", advanced");
            }
            let _ = write!(out, "): {}", field.label);
            if let Some(help) = &field.help {
                let _ = write!(out, ". {help}");
            }
            out.push('\n');
        }
        out
    }
}

/// Converts a free-form value into the type the field stores, for hosts that
/// accept text input (command lines, query strings).
#[must_use]
pub fn coerce_input(field: &ResolvedField, raw: &str) -> Value {
    let trimmed = raw.trim();
    match field.field_type {
        FieldType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Value::Bool(true),
            "false" | "no" | "off" | "0" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        FieldType::Number => serde_json::from_str::<serde_json::Number>(trimmed)
            .map_or_else(|_| Value::String(raw.to_string()), Value::Number),
        FieldType::Multiselect
        | FieldType::CheckboxGroup
        | FieldType::Array
        | FieldType::Keyvalue
        | FieldType::Table
        | FieldType::Group => {
            serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(raw.to_string()))
        }
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap for clarity."
    )]

    use serde_json::json;

    use super::FieldWidth;
    use super::humanize_key;
    use super::resolve_fields;
    use super::validate_field;
    use crate::catalog::FieldCatalog;
    use crate::catalog::FieldType;
    use crate::hint::UiHints;
    use crate::schema::ConfigSchema;
    use crate::schema::ConfigValues;
    use crate::validation::ValidationFunctions;

    fn schema(raw: serde_json::Value) -> ConfigSchema {
        ConfigSchema::parse_document(&raw).unwrap()
    }

    fn values(raw: serde_json::Value) -> ConfigValues {
        raw.as_object().cloned().unwrap()
    }

    #[test]
    fn hidden_fields_are_excluded_and_order_is_kept() {
        let schema = schema(json!({
            "type": "object",
            "properties": {
                "b": { "type": "string" },
                "secret": { "type": "string" },
                "a": { "type": "string" }
            }
        }));
        let (hints, _) = UiHints::from_value(&json!({ "secret": { "hidden": true } }));
        let keys: Vec<String> = resolve_fields(&schema, &hints, &FieldCatalog::standard())
            .into_iter()
            .map(|field| field.key)
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn hint_values_win_and_required_comes_from_schema() {
        let schema = schema(json!({
            "type": "object",
            "properties": { "base_url": { "type": "string", "title": "Schema Title" } },
            "required": ["base_url"]
        }));
        let (hints, _) = UiHints::from_value(&json!({
            "base_url": { "label": "Endpoint", "width": "half", "group": "Network" }
        }));
        let fields = resolve_fields(&schema, &hints, &FieldCatalog::standard());
        let field = &fields[0];
        assert_eq!(field.label, "Endpoint");
        assert_eq!(field.width, FieldWidth::Half);
        assert_eq!(field.group, "Network");
        assert!(field.required);
        assert_eq!(field.order, 999);
    }

    #[test]
    fn malformed_width_and_unknown_type_degrade() {
        let schema = schema(json!({"type": "object", "properties": {"x": {"type": "string"}}}));
        let (hints, _) =
            UiHints::from_value(&json!({ "x": { "width": "quarter", "fieldType": "hologram" } }));
        let field = &resolve_fields(&schema, &hints, &FieldCatalog::standard())[0];
        assert_eq!(field.width, FieldWidth::Full);
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(field.fallback_from.as_deref(), Some("hologram"));
    }

    #[test]
    fn pipeline_concatenates_stages_in_order() {
        let schema = schema(json!({
            "type": "object",
            "properties": { "port": { "type": "integer", "maximum": 100 } }
        }));
        let (hints, _) = UiHints::from_value(&json!({
            "port": {
                "pattern": "^[0-9]{2}$",
                "patternError": "Two digits.",
                "validation": [{ "type": "range", "min": 200, "message": "Too small." }]
            }
        }));
        let catalog = FieldCatalog::standard();
        let field = &resolve_fields(&schema, &hints, &catalog)[0];
        let functions = ValidationFunctions::new();
        let report = validate_field(field, &values(json!({"port": 150})), &catalog, &functions);
        assert_eq!(report.errors, vec!["Must be at most 100.", "Two digits.", "Too small."]);
    }

    #[test]
    fn required_empty_field_reports_only_required() {
        let schema = schema(json!({
            "type": "object",
            "properties": { "apiKey": { "type": "string" } },
            "required": ["apiKey"]
        }));
        let (hints, _) = UiHints::from_value(&json!({
            "apiKey": { "sensitive": true, "validation": [{ "type": "length", "min": 10 }] }
        }));
        let catalog = FieldCatalog::standard();
        let field = &resolve_fields(&schema, &hints, &catalog)[0];
        assert_eq!(field.field_type, FieldType::Password);
        let functions = ValidationFunctions::new();
        let report = validate_field(field, &ConfigValues::new(), &catalog, &functions);
        assert_eq!(report.errors, vec!["This field is required."]);
    }

    #[test]
    fn keys_are_humanized() {
        assert_eq!(humanize_key("apiKey"), "Api Key");
        assert_eq!(humanize_key("base_url"), "Base Url");
        assert_eq!(humanize_key("max-tokens"), "Max Tokens");
        assert_eq!(humanize_key("OPENAI_API_KEY"), "OPENAI API KEY");
    }

    #[test]
    fn describe_schema_lists_resolved_types() {
        let schema = schema(json!({
            "type": "object",
            "properties": { "enabled": { "type": "boolean", "description": "Turn it on" } },
            "required": ["enabled"]
        }));
        let text = FieldCatalog::standard().describe_schema(&schema, &UiHints::default());
        assert_eq!(text, "- enabled (boolean, required): Enabled. Turn it on\n");
    }
}
