// crates/milady-config-core/src/schema.rs
// ============================================================================
// Module: Config Schema Model
// Description: Pragmatic JSON-Schema subset describing plugin configuration.
// Purpose: Parse host/plugin schemas into typed properties with declared order.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ConfigSchema`] is an object schema whose properties keep the order in
//! which they were declared. Only the subset of JSON Schema that drives form
//! rendering is modeled; unknown keywords are ignored rather than rejected,
//! and keywords of the wrong shape are dropped from their property only.
//! Security posture: schemas come from plugin configuration and are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::DeserializeOwned;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;
use serde_json::Map;
use serde_json::Value;

use crate::error::SchemaError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum number of properties accepted in a single object schema.
pub const MAX_SCHEMA_PROPERTIES: usize = 512;
/// Maximum nesting depth for object schemas.
pub const MAX_SCHEMA_DEPTH: usize = 8;

// ============================================================================
// SECTION: Value Aliases
// ============================================================================

/// Current (possibly uncommitted) configuration values keyed by property name.
pub type ConfigValues = Map<String, Value>;

// ============================================================================
// SECTION: Schema Types
// ============================================================================

/// Primitive type declared by a schema property.
///
/// # Invariants
/// - Variants are stable for serialization (`lowercase`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// UTF-8 string.
    String,
    /// Floating point number.
    Number,
    /// Whole number.
    Integer,
    /// Boolean flag.
    Boolean,
    /// Ordered list.
    Array,
    /// Nested object or free-form map.
    Object,
    /// Explicit null.
    Null,
}

impl SchemaType {
    /// Returns the JSON Schema keyword for the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }

    /// Returns true for `number` and `integer`.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }
}

/// One entry of a `oneOf` closed value set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OneOfOption {
    /// Constant value selected by this option.
    #[serde(rename = "const")]
    pub constant: Option<Value>,
    /// Human-readable title.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

/// Schema for a single configuration property.
///
/// # Invariants
/// - `properties` preserves declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertySchema {
    /// Declared primitive type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaType>,
    /// Optional title used as a label fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional description used as help text fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Closed value set.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Closed value set with titles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<OneOfOption>>,
    /// Format annotation (`uri`, `date`, `date-time`, `email`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Inclusive numeric minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive numeric maximum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Minimum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Schema-level regex pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Read-only marker.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    /// Item schema for arrays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertySchema>>,
    /// Nested properties for objects.
    #[serde(skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
    /// Required nested property names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl PropertySchema {
    /// Returns the closed value set from `enum` or `oneOf` as `(value, title)` pairs.
    #[must_use]
    pub fn closed_values(&self) -> Vec<(Value, Option<String>)> {
        if let Some(values) = &self.enum_values
            && !values.is_empty()
        {
            return values.iter().map(|value| (value.clone(), None)).collect();
        }
        if let Some(options) = &self.one_of {
            return options
                .iter()
                .filter_map(|option| {
                    option.constant.clone().map(|constant| (constant, option.title.clone()))
                })
                .collect();
        }
        Vec::new()
    }

    /// Returns the enum declared on array items, if any.
    #[must_use]
    pub fn item_enum(&self) -> Option<&[Value]> {
        self.items
            .as_ref()
            .and_then(|items| items.enum_values.as_deref())
            .filter(|values| !values.is_empty())
    }
}

// ============================================================================
// SECTION: Ordered Property Map
// ============================================================================

/// Ordered mapping of property name to schema.
///
/// # Invariants
/// - Iteration order equals declaration order.
/// - Keys are unique; a repeated key keeps its first position and last schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyMap(Vec<(String, PropertySchema)>);

impl PropertyMap {
    /// Builds a map from ordered entries.
    #[must_use]
    pub fn from_entries(entries: Vec<(String, PropertySchema)>) -> Self {
        let mut map = Self::default();
        for (key, schema) in entries {
            map.insert(key, schema);
        }
        map
    }

    /// Inserts or replaces a property while keeping its original position.
    pub fn insert(&mut self, key: String, schema: PropertySchema) {
        if let Some(slot) = self.0.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = schema;
        } else {
            self.0.push((key, schema));
        }
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertySchema> {
        self.0.iter().find(|(existing, _)| existing == key).map(|(_, schema)| schema)
    }

    /// Iterates properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertySchema)> {
        self.0.iter().map(|(key, schema)| (key.as_str(), schema))
    }

    /// Number of properties.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no properties are declared.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PropertyMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, schema) in &self.0 {
            map.serialize_entry(key, schema)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertyMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        /// Visitor collecting entries in document order.
        struct PropertyMapVisitor;

        impl<'de> Visitor<'de> for PropertyMapVisitor {
            type Value = PropertyMap;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an object of property schemas")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = PropertyMap::default();
                while let Some((key, schema)) = access.next_entry::<String, PropertySchema>()? {
                    if map.len() >= MAX_SCHEMA_PROPERTIES {
                        return Err(serde::de::Error::custom("schema declares too many properties"));
                    }
                    map.insert(key, schema);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(PropertyMapVisitor)
    }
}

// ============================================================================
// SECTION: Root Schema
// ============================================================================

/// Root configuration schema supplied by the host view.
///
/// # Invariants
/// - Immutable for the duration of a render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConfigSchema {
    /// Declared root type (normally `object`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaType>,
    /// Optional schema title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Top-level properties in declaration order.
    pub properties: PropertyMap,
    /// Names of required top-level properties.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ConfigSchema {
    /// Parses a schema document strictly.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the document is unusable or when any
    /// keyword had to be dropped.
    pub fn parse_document(document: &Value) -> Result<Self, SchemaError> {
        let (schema, mut issues) = Self::parse_lenient(document)?;
        if issues.is_empty() { Ok(schema) } else { Err(issues.remove(0)) }
    }

    /// Parses a schema document, degrading per property.
    ///
    /// Keywords outside the supported subset are dropped from the property
    /// that declared them and reported as [`SchemaError::Malformed`]; the rest
    /// of the property and every sibling property survive. A property that is
    /// not an object degrades to [`PropertySchema::default`].
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the document is not an object, declares a
    /// non-object root type, or exceeds the size or nesting limits.
    pub fn parse_lenient(document: &Value) -> Result<(Self, Vec<SchemaError>), SchemaError> {
        let Value::Object(entries) = document else {
            return Err(SchemaError::NotAnObject);
        };
        let mut entries = entries.clone();
        let properties = entries.remove("properties");
        normalize_type(&mut entries);
        let (mut schema, dropped) = parse_keywords::<Self>(&entries);
        if let Some(kind) = schema.kind
            && kind != SchemaType::Object
        {
            return Err(SchemaError::UnsupportedRootType(kind));
        }
        let mut issues: Vec<SchemaError> = dropped
            .into_iter()
            .map(|(keyword, message)| malformed(None, &keyword, &message))
            .collect();
        if let Some(properties) = properties {
            schema.properties = parse_properties("", &properties, &mut issues, 1)?;
        }
        Ok((schema, issues))
    }

    /// Lenient variant used by renderers: unusable documents yield `None`.
    #[must_use]
    pub fn from_value(document: &Value) -> Option<Self> {
        Self::parse_lenient(document).ok().map(|(schema, _)| schema)
    }

    /// Returns true when the named property is listed in `required`.
    #[must_use]
    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|required| required == key)
    }
}

// ============================================================================
// SECTION: Lenient Parsing
// ============================================================================

/// Deserializes an object keyword by keyword.
///
/// When the whole object parses, it is returned as is. Otherwise every keyword
/// that fails on its own is dropped and reported as `(keyword, message)`.
pub(crate) fn parse_keywords<T>(entries: &Map<String, Value>) -> (T, Vec<(String, String)>)
where
    T: DeserializeOwned + Default,
{
    if let Ok(parsed) = serde_json::from_value::<T>(Value::Object(entries.clone())) {
        return (parsed, Vec::new());
    }
    let mut kept = Map::new();
    let mut dropped = Vec::new();
    for (keyword, value) in entries {
        let mut single = Map::new();
        single.insert(keyword.clone(), value.clone());
        match serde_json::from_value::<T>(Value::Object(single)) {
            Ok(_) => {
                kept.insert(keyword.clone(), value.clone());
            }
            Err(err) => dropped.push((keyword.clone(), err.to_string())),
        }
    }
    let parsed = serde_json::from_value::<T>(Value::Object(kept)).unwrap_or_default();
    (parsed, dropped)
}

/// Collapses a `type` union such as `["string", "null"]` to its first
/// non-null member.
fn normalize_type(entries: &mut Map<String, Value>) {
    let Some(Value::Array(types)) = entries.get("type") else {
        return;
    };
    let names: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
    let chosen = names.iter().find(|name| **name != "null").or_else(|| names.first()).copied();
    if let Some(chosen) = chosen {
        let chosen = Value::String(chosen.to_string());
        entries.insert("type".to_string(), chosen);
    }
}

/// Builds a [`SchemaError::Malformed`] for one dropped keyword.
fn malformed(key: Option<&str>, keyword: &str, message: &str) -> SchemaError {
    SchemaError::Malformed {
        key: key.map(str::to_string),
        message: format!("dropped `{keyword}`: {message}"),
    }
}

/// Parses a `properties` object entry by entry.
fn parse_properties(
    parent: &str,
    raw: &Value,
    issues: &mut Vec<SchemaError>,
    depth: usize,
) -> Result<PropertyMap, SchemaError> {
    if depth > MAX_SCHEMA_DEPTH {
        return Err(SchemaError::TooDeep {
            max_depth: MAX_SCHEMA_DEPTH,
        });
    }
    let Value::Object(entries) = raw else {
        let owner = (!parent.is_empty()).then_some(parent);
        issues.push(malformed(owner, "properties", "expected an object"));
        return Ok(PropertyMap::default());
    };
    if entries.len() > MAX_SCHEMA_PROPERTIES {
        return Err(SchemaError::TooManyProperties {
            max: MAX_SCHEMA_PROPERTIES,
        });
    }
    let mut map = PropertyMap::default();
    for (key, value) in entries {
        let path = if parent.is_empty() { key.clone() } else { format!("{parent}.{key}") };
        map.insert(key.clone(), parse_property(&path, value, issues, depth)?);
    }
    Ok(map)
}

/// Parses one property schema, keeping every keyword that parses.
fn parse_property(
    path: &str,
    raw: &Value,
    issues: &mut Vec<SchemaError>,
    depth: usize,
) -> Result<PropertySchema, SchemaError> {
    let Value::Object(entries) = raw else {
        issues.push(SchemaError::Malformed {
            key: Some(path.to_string()),
            message: "property schema must be an object".to_string(),
        });
        return Ok(PropertySchema::default());
    };
    let mut entries = entries.clone();
    let nested = entries.remove("properties");
    let items = entries.remove("items");
    normalize_type(&mut entries);
    let (mut property, dropped) = parse_keywords::<PropertySchema>(&entries);
    issues.extend(
        dropped.into_iter().map(|(keyword, message)| malformed(Some(path), &keyword, &message)),
    );
    if let Some(nested) = nested {
        property.properties = parse_properties(path, &nested, issues, depth + 1)?;
    }
    match items {
        None => {}
        Some(items @ Value::Object(_)) => {
            let item_path = format!("{path}[]");
            property.items = Some(Box::new(parse_property(&item_path, &items, issues, depth + 1)?));
        }
        Some(_) => {
            issues.push(malformed(Some(path), "items", "only a single item schema is supported"));
        }
    }
    Ok(property)
}

// ============================================================================
// SECTION: Value Helpers
// ============================================================================

/// Returns true when a value counts as "not provided".
///
/// Missing, `null`, blank strings, and empty arrays are empty. `false` and `0`
/// are real values.
#[must_use]
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Renders a scalar JSON value as display text; strings are not quoted.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
