// crates/milady-config-core/src/catalog.rs
// ============================================================================
// Module: Field Catalog
// Description: Field type decision table with per-type structural validators.
// Purpose: Map schema + hint pairs to field types and validate raw values.
// Dependencies: regex, serde, serde_json, time, url, crate::{hint, schema}
// ============================================================================

//! ## Overview
//! [`FieldCatalog`] decides which [`FieldType`] a property renders as and holds
//! one structural validator per type. The decision is deterministic: an
//! explicit `hint.fieldType` wins, otherwise the schema shape is inspected in a
//! fixed precedence. Types the catalog does not carry fall back to `text`, so
//! an unexpected schema never blocks rendering.
//!
//! Catalogs are explicit values passed to the engine. Panels with different
//! capability sets build their own with [`FieldCatalog::with_types`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use time::Date;
use time::Month;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::Time;
use time::format_description::well_known::Rfc3339;
use url::Url;

use crate::hint::UiHint;
use crate::schema::PropertySchema;
use crate::schema::SchemaType;
use crate::schema::display_value;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum items an array field holds.
pub const ARRAY_MAX_ITEMS: usize = 100;
/// Maximum rows a table field holds.
pub const TABLE_MAX_ROWS: usize = 50;
/// Maximum entries a key-value field holds.
pub const KEY_VALUE_MAX_ENTRIES: usize = 100;
/// `maxLength` above which strings render as a textarea.
pub const TEXTAREA_MIN_LENGTH: u64 = 200;

// ============================================================================
// SECTION: Field Types
// ============================================================================

/// Concrete field type a property renders as.
///
/// # Invariants
/// - Serialized names are stable and match hint `fieldType` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// Single-line text.
    Text,
    /// Masked secret.
    Password,
    /// Numeric input with stepper.
    Number,
    /// Toggle switch.
    Boolean,
    /// URL input.
    Url,
    /// Email input.
    Email,
    /// Dropdown or searchable combobox.
    Select,
    /// Radio group.
    Radio,
    /// Multi-select.
    Multiselect,
    /// Checkbox group.
    CheckboxGroup,
    /// Multi-line text.
    Textarea,
    /// Calendar date.
    Date,
    /// Date and time.
    Datetime,
    /// Hex color.
    Color,
    /// Free-form JSON text.
    Json,
    /// List of scalar items.
    Array,
    /// String-to-string map.
    Keyvalue,
    /// Rows of objects.
    Table,
    /// Markdown with preview.
    Markdown,
    /// Nested object rendered as a group of fields.
    Group,
    /// Host-provided component placeholder.
    Custom,
}

/// Every field type in catalog order.
pub const ALL_FIELD_TYPES: [FieldType; 21] = [
    FieldType::Text,
    FieldType::Password,
    FieldType::Number,
    FieldType::Boolean,
    FieldType::Url,
    FieldType::Email,
    FieldType::Select,
    FieldType::Radio,
    FieldType::Multiselect,
    FieldType::CheckboxGroup,
    FieldType::Textarea,
    FieldType::Date,
    FieldType::Datetime,
    FieldType::Color,
    FieldType::Json,
    FieldType::Array,
    FieldType::Keyvalue,
    FieldType::Table,
    FieldType::Markdown,
    FieldType::Group,
    FieldType::Custom,
];

impl FieldType {
    /// Returns the stable name used in hints and render output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Url => "url",
            Self::Email => "email",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Multiselect => "multiselect",
            Self::CheckboxGroup => "checkbox-group",
            Self::Textarea => "textarea",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Color => "color",
            Self::Json => "json",
            Self::Array => "array",
            Self::Keyvalue => "keyvalue",
            Self::Table => "table",
            Self::Markdown => "markdown",
            Self::Group => "group",
            Self::Custom => "custom",
        }
    }

    /// Parses a hint `fieldType` name. Accepts a few common aliases.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        let field_type = match normalized.as_str() {
            "key-value" | "kv" => Self::Keyvalue,
            "checkboxgroup" | "checkbox_group" => Self::CheckboxGroup,
            "date-time" => Self::Datetime,
            "string" => Self::Text,
            "secret" => Self::Password,
            other => return ALL_FIELD_TYPES.into_iter().find(|ty| ty.as_str() == other),
        };
        Some(field_type)
    }

    /// One-line description used by the prompt helper.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Text => "single-line text input",
            Self::Password => "masked secret; value is only shown after an explicit reveal",
            Self::Number => "numeric input with stepper; honors min, max, step, unit",
            Self::Boolean => "on/off toggle",
            Self::Url => "URL input validated for well-formedness",
            Self::Email => "email address input",
            Self::Select => "dropdown; becomes searchable at five or more options",
            Self::Radio => "radio button group for a small closed set",
            Self::Multiselect => "multi-select over a closed set; stores an array",
            Self::CheckboxGroup => "checkbox list over a closed set; stores an array",
            Self::Textarea => "multi-line text",
            Self::Date => "calendar date (YYYY-MM-DD)",
            Self::Datetime => "date and time (RFC 3339 or YYYY-MM-DDTHH:MM)",
            Self::Color => "hex color (#rgb or #rrggbb)",
            Self::Json => "free-form JSON text validated on blur",
            Self::Array => "list of text items (max 100)",
            Self::Keyvalue => "map of string keys to string values (max 100)",
            Self::Table => "rows of objects with columns from items.properties (max 50)",
            Self::Markdown => "markdown text with edit/preview toggle",
            Self::Group => "nested object rendered as a group of fields",
            Self::Custom => "host-provided component named by hint.component",
        }
    }
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Option offered by select-like fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOption {
    /// Stored value.
    pub value: Value,
    /// Display label.
    pub label: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Resolves options: `hint.options` first, then schema `enum`/`oneOf`, then
/// `items.enum`.
#[must_use]
pub fn resolve_options(schema: &PropertySchema, hint: &UiHint) -> Vec<FieldOption> {
    if let Some(options) = &hint.options {
        return options
            .iter()
            .map(|option| FieldOption {
                value: option.value.clone(),
                label: option.label.clone().unwrap_or_else(|| display_value(&option.value)),
                description: option.description.clone(),
            })
            .collect();
    }
    let closed = schema.closed_values();
    if !closed.is_empty() {
        return closed
            .into_iter()
            .map(|(value, title)| FieldOption {
                label: title.unwrap_or_else(|| display_value(&value)),
                value,
                description: None,
            })
            .collect();
    }
    schema
        .item_enum()
        .map(|values| {
            values
                .iter()
                .map(|value| FieldOption {
                    value: value.clone(),
                    label: display_value(value),
                    description: None,
                })
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// SECTION: Validators
// ============================================================================

/// Schema and hint context handed to structural validators.
#[derive(Debug, Clone, Copy)]
pub struct FieldConstraints<'a> {
    /// Property schema.
    pub schema: &'a PropertySchema,
    /// Merged hint.
    pub hint: &'a UiHint,
}

impl FieldConstraints<'_> {
    /// Effective minimum: hint wins over schema.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.hint.min.or(self.schema.minimum)
    }

    /// Effective maximum: hint wins over schema.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.hint.max.or(self.schema.maximum)
    }
}

/// Structural validator: returns one message per violation, empty when valid.
pub type FieldValidator = fn(&Value, &FieldConstraints<'_>) -> Vec<String>;

/// Catalog entry for one field type.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    /// Field type described by the entry.
    pub field_type: FieldType,
    /// Prompt description.
    pub description: &'static str,
    /// Structural validator.
    pub validator: FieldValidator,
}

/// Returns the built-in validator for a field type.
#[must_use]
pub fn builtin_validator(field_type: FieldType) -> FieldValidator {
    match field_type {
        FieldType::Text | FieldType::Password | FieldType::Textarea | FieldType::Markdown => {
            validate_text
        }
        FieldType::Number => validate_number,
        FieldType::Boolean => validate_boolean,
        FieldType::Url => validate_url,
        FieldType::Email => validate_email,
        FieldType::Select | FieldType::Radio => validate_choice,
        FieldType::Multiselect | FieldType::CheckboxGroup => validate_multi_choice,
        FieldType::Date => validate_date,
        FieldType::Datetime => validate_datetime,
        FieldType::Color => validate_color,
        FieldType::Json => validate_json,
        FieldType::Array => validate_array,
        FieldType::Keyvalue => validate_key_value,
        FieldType::Table => validate_table,
        FieldType::Group => validate_group,
        FieldType::Custom => validate_nothing,
    }
}

/// Checks text length bounds.
fn validate_text(value: &Value, constraints: &FieldConstraints<'_>) -> Vec<String> {
    let Value::String(text) = value else {
        return vec!["Must be text.".to_string()];
    };
    let length = u64::try_from(text.chars().count()).unwrap_or(u64::MAX);
    let mut errors = Vec::new();
    if let Some(min) = constraints.schema.min_length
        && length < min
    {
        errors.push(format!("Must be at least {min} characters."));
    }
    if let Some(max) = constraints.schema.max_length
        && length > max
    {
        errors.push(format!("Must be at most {max} characters."));
    }
    errors
}

/// Reads a number from a JSON number or numeric string.
#[must_use]
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Checks numeric type, integrality, and range.
fn validate_number(value: &Value, constraints: &FieldConstraints<'_>) -> Vec<String> {
    let Some(number) = numeric_value(value) else {
        return vec!["Must be a number.".to_string()];
    };
    let mut errors = Vec::new();
    if constraints.schema.kind == Some(SchemaType::Integer) && number.fract() != 0.0 {
        errors.push("Must be a whole number.".to_string());
    }
    if let Some(min) = constraints.min()
        && number < min
    {
        errors.push(format!("Must be at least {min}."));
    }
    if let Some(max) = constraints.max()
        && number > max
    {
        errors.push(format!("Must be at most {max}."));
    }
    errors
}

/// Checks for a boolean.
fn validate_boolean(value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    if value.is_boolean() { Vec::new() } else { vec!["Must be true or false.".to_string()] }
}

/// Returns true for absolute URLs with a host.
#[must_use]
pub fn is_well_formed_url(text: &str) -> bool {
    Url::parse(text.trim()).is_ok_and(|url| url.has_host())
}

/// Checks URL well-formedness.
fn validate_url(value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    match value {
        Value::String(text) if is_well_formed_url(text) => Vec::new(),
        _ => vec!["Must be a valid URL.".to_string()],
    }
}

/// Returns true for `local@domain.tld` shaped addresses.
#[must_use]
pub fn is_plausible_email(text: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(text.trim()))
}

/// Checks email shape.
fn validate_email(value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    match value {
        Value::String(text) if is_plausible_email(text) => Vec::new(),
        _ => vec!["Must be a valid email address.".to_string()],
    }
}

/// Returns true when a value matches one of the options.
fn is_allowed(value: &Value, options: &[FieldOption]) -> bool {
    options.iter().any(|option| {
        option.value == *value || display_value(&option.value) == display_value(value)
    })
}

/// Checks a single choice against the option set.
fn validate_choice(value: &Value, constraints: &FieldConstraints<'_>) -> Vec<String> {
    let options = resolve_options(constraints.schema, constraints.hint);
    if options.is_empty() || is_allowed(value, &options) {
        Vec::new()
    } else {
        vec!["Must be one of the allowed options.".to_string()]
    }
}

/// Checks every selected entry against the option set.
fn validate_multi_choice(value: &Value, constraints: &FieldConstraints<'_>) -> Vec<String> {
    let Value::Array(items) = value else {
        return vec!["Must be a list of options.".to_string()];
    };
    let options = resolve_options(constraints.schema, constraints.hint);
    if options.is_empty() || items.iter().all(|item| is_allowed(item, &options)) {
        Vec::new()
    } else {
        vec!["Contains an option that is not allowed.".to_string()]
    }
}

/// Parses `YYYY-MM-DD` into a calendar date.
#[must_use]
pub fn parse_date(text: &str) -> Option<Date> {
    let mut parts = text.trim().splitn(3, '-');
    let year = parse_fixed::<i32>(parts.next()?, 4)?;
    let month = Month::try_from(parse_fixed::<u8>(parts.next()?, 2)?).ok()?;
    let day = parse_fixed::<u8>(parts.next()?, 2)?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Parses `HH:MM` or `HH:MM:SS` into a wall-clock time.
fn parse_local_time(text: &str) -> Option<Time> {
    let mut parts = text.split(':');
    let hour = parse_fixed::<u8>(parts.next()?, 2)?;
    let minute = parse_fixed::<u8>(parts.next()?, 2)?;
    let second = match parts.next() {
        Some(second) => parse_fixed::<u8>(second, 2)?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Time::from_hms(hour, minute, second).ok()
}

/// Parses an all-digit segment of exactly `width` characters.
fn parse_fixed<T: std::str::FromStr>(segment: &str, width: usize) -> Option<T> {
    if segment.len() != width || !segment.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Accepts RFC 3339 timestamps and `YYYY-MM-DDTHH:MM[:SS]` local times.
#[must_use]
pub fn is_valid_datetime(text: &str) -> bool {
    let text = text.trim();
    if OffsetDateTime::parse(text, &Rfc3339).is_ok() {
        return true;
    }
    text.split_once('T').is_some_and(|(date, time)| {
        parse_date(date)
            .zip(parse_local_time(time))
            .map(|(date, time)| PrimitiveDateTime::new(date, time))
            .is_some()
    })
}

/// Checks date format.
fn validate_date(value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    match value {
        Value::String(text) if parse_date(text).is_some() => Vec::new(),
        _ => vec!["Must be a valid date (YYYY-MM-DD).".to_string()],
    }
}

/// Checks datetime format.
fn validate_datetime(value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    match value {
        Value::String(text) if is_valid_datetime(text) => Vec::new(),
        _ => vec!["Must be a valid date and time.".to_string()],
    }
}

/// Returns true for `#rgb` or `#rrggbb`.
#[must_use]
pub fn is_hex_color(text: &str) -> bool {
    static HEX_COLOR: OnceLock<Option<Regex>> = OnceLock::new();
    HEX_COLOR
        .get_or_init(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(text))
}

/// Checks hex color shape.
fn validate_color(value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    match value {
        Value::String(text) if is_hex_color(text) => Vec::new(),
        _ => vec!["Must be a hex color like #1a2b3c.".to_string()],
    }
}

/// Checks that JSON text parses; structured values are accepted as-is.
fn validate_json(value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    match value {
        Value::String(text) if serde_json::from_str::<Value>(text).is_err() => {
            vec!["Must be valid JSON.".to_string()]
        }
        _ => Vec::new(),
    }
}

/// Checks list shape and size.
fn validate_array(value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    match value {
        Value::Array(items) if items.len() > ARRAY_MAX_ITEMS => {
            vec![format!("Must contain at most {ARRAY_MAX_ITEMS} items.")]
        }
        Value::Array(_) => Vec::new(),
        _ => vec!["Must be a list.".to_string()],
    }
}

/// Checks map shape and size.
fn validate_key_value(value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    match value {
        Value::Object(entries) if entries.len() > KEY_VALUE_MAX_ENTRIES => {
            vec![format!("Must contain at most {KEY_VALUE_MAX_ENTRIES} entries.")]
        }
        Value::Object(_) => Vec::new(),
        _ => vec!["Must be a map of keys to values.".to_string()],
    }
}

/// Checks row shape and count.
fn validate_table(value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    let Value::Array(rows) = value else {
        return vec!["Must be a list of rows.".to_string()];
    };
    let mut errors = Vec::new();
    if rows.len() > TABLE_MAX_ROWS {
        errors.push(format!("Must contain at most {TABLE_MAX_ROWS} rows."));
    }
    if rows.iter().any(|row| !row.is_object()) {
        errors.push("Every row must be an object.".to_string());
    }
    errors
}

/// Checks nested object shape.
fn validate_group(value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    if value.is_object() { Vec::new() } else { vec!["Must be an object.".to_string()] }
}

/// Accepts everything.
fn validate_nothing(_value: &Value, _constraints: &FieldConstraints<'_>) -> Vec<String> {
    Vec::new()
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Field type decision table with per-type validators.
///
/// # Invariants
/// - `text` is always present so fallback resolution has a target.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    /// Entries keyed by field type.
    entries: BTreeMap<FieldType, CatalogEntry>,
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl FieldCatalog {
    /// Catalog with every built-in field type.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_types(ALL_FIELD_TYPES)
    }

    /// Catalog restricted to the given types (`text` is always added).
    #[must_use]
    pub fn with_types(types: impl IntoIterator<Item = FieldType>) -> Self {
        let mut entries = BTreeMap::new();
        for field_type in types.into_iter().chain(std::iter::once(FieldType::Text)) {
            entries.insert(
                field_type,
                CatalogEntry {
                    field_type,
                    description: field_type.description(),
                    validator: builtin_validator(field_type),
                },
            );
        }
        Self {
            entries,
        }
    }

    /// Replaces the validator for one type; ignored for types not in the catalog.
    #[must_use]
    pub fn with_validator(mut self, field_type: FieldType, validator: FieldValidator) -> Self {
        if let Some(entry) = self.entries.get_mut(&field_type) {
            entry.validator = validator;
        }
        self
    }

    /// Returns true when the catalog carries the type.
    #[must_use]
    pub fn supports(&self, field_type: FieldType) -> bool {
        self.entries.contains_key(&field_type)
    }

    /// Iterates catalog entries in type order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Decides the field type for a property.
    ///
    /// Precedence: explicit `hint.fieldType`; boolean; closed value set;
    /// format (`uri`/`url`, `email`, `date`, `date-time`, `color`); `sensitive`;
    /// numeric; long string; array (enum items → multiselect); object
    /// (properties → group, otherwise keyvalue); text. Unsupported results and
    /// unknown explicit names fall back to `text`.
    #[must_use]
    pub fn resolve_field_type(&self, schema: &PropertySchema, hint: &UiHint) -> FieldType {
        let resolved = match hint.field_type.as_deref() {
            Some(name) => FieldType::parse(name).unwrap_or(FieldType::Text),
            None => derive_field_type(schema, hint),
        };
        if self.supports(resolved) { resolved } else { FieldType::Text }
    }

    /// Runs the structural validator for a field type.
    ///
    /// Empty values are not checked here; required-ness is a separate stage.
    #[must_use]
    pub fn validate(
        &self,
        field_type: FieldType,
        value: &Value,
        constraints: &FieldConstraints<'_>,
    ) -> Vec<String> {
        let validator = self
            .entries
            .get(&field_type)
            .map_or_else(|| builtin_validator(FieldType::Text), |entry| entry.validator);
        validator(value, constraints)
    }

    /// Plain-text description of the catalog for authoring assistants.
    #[must_use]
    pub fn prompt(&self) -> String {
        let mut prompt = String::from(
            "Plugin configuration is described by a JSON schema plus per-property UI hints.\n\
             Available field types (set hint.fieldType to force one):\n",
        );
        for entry in self.entries.values() {
            let _ = writeln!(prompt, "- {}: {}", entry.field_type.as_str(), entry.description);
        }
        prompt.push_str(
            "Hint keys: label, help, placeholder, sensitive, order, group, \
             width (full|half|third), advanced, hidden, readonly, pattern, patternError, \
             min, max, step, unit, rows, \
             component, options [{value,label,description}], on {event: action|{action,params}}, \
             visible (and/or/not over equals/notEquals/in/truthy with {path} operands), \
             showIf {field,op,value}, validation [{type: required|regex|range|length|email|url|\
             matches|custom, ...}].\n",
        );
        prompt
    }
}

/// Schema-driven part of the decision table.
fn derive_field_type(schema: &PropertySchema, hint: &UiHint) -> FieldType {
    if schema.kind == Some(SchemaType::Boolean) {
        return FieldType::Boolean;
    }
    let has_hint_options = hint.options.as_ref().is_some_and(|options| !options.is_empty());
    if schema.kind != Some(SchemaType::Array)
        && (has_hint_options || !schema.closed_values().is_empty())
    {
        return FieldType::Select;
    }
    match schema.format.as_deref() {
        Some("uri" | "url") => return FieldType::Url,
        Some("email") => return FieldType::Email,
        Some("date") => return FieldType::Date,
        Some("date-time") => return FieldType::Datetime,
        Some("color") => return FieldType::Color,
        _ => {}
    }
    if hint.sensitive {
        return FieldType::Password;
    }
    match schema.kind {
        Some(kind) if kind.is_numeric() => FieldType::Number,
        Some(SchemaType::Array) => {
            if schema.item_enum().is_some() || hint.options.is_some() {
                FieldType::Multiselect
            } else {
                FieldType::Array
            }
        }
        Some(SchemaType::Object) => {
            if schema.properties.is_empty() {
                FieldType::Keyvalue
            } else {
                FieldType::Group
            }
        }
        _ if schema.max_length.is_some_and(|max| max > TEXTAREA_MIN_LENGTH)
            || hint.rows.is_some_and(|rows| rows > 1) =>
        {
            FieldType::Textarea
        }
        _ => FieldType::Text,
    }
}
