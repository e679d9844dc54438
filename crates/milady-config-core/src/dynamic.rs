// crates/milady-config-core/src/dynamic.rs
// ============================================================================
// Module: Dynamic Value Resolver
// Description: Literal-or-path expressions evaluated against form state.
// Purpose: Let hints reference "the current value of field X" without code.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`DynamicValue`] is either a literal JSON value or a `{ "path": "a.b.c" }`
//! reference. References are looked up in the current values map using dotted
//! segments; any missing segment resolves to `None` rather than failing, and
//! callers treat `None` as "no value".

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;

use crate::schema::ConfigValues;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum number of dotted segments followed during lookup.
pub const MAX_PATH_SEGMENTS: usize = 32;

/// Object key marking a path reference.
const PATH_MARKER: &str = "path";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Literal value or reference into the current form state.
///
/// # Invariants
/// - `Path` holds a non-empty dotted path.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    /// Literal value returned as-is.
    Literal(Value),
    /// Dotted path into the form state.
    Path(String),
}

impl DynamicValue {
    /// Classifies a raw JSON value.
    ///
    /// Only objects whose `path` member is a non-empty string are references;
    /// every other shape (including objects without the marker) is a literal.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        if let Value::Object(object) = value
            && let Some(Value::String(path)) = object.get(PATH_MARKER)
            && !path.is_empty()
        {
            return Self::Path(path.clone());
        }
        Self::Literal(value.clone())
    }

    /// Creates a path reference.
    #[must_use]
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// Converts the expression back to its JSON form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Path(path) => {
                let mut object = Map::new();
                object.insert(PATH_MARKER.to_string(), Value::String(path.clone()));
                Value::Object(object)
            }
        }
    }
}

impl Serialize for DynamicValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&raw))
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves a dynamic value against the current state.
///
/// Returns `None` when a path segment is missing.
#[must_use]
pub fn resolve_dynamic(value: &DynamicValue, state: &ConfigValues) -> Option<Value> {
    match value {
        DynamicValue::Literal(literal) => Some(literal.clone()),
        DynamicValue::Path(path) => lookup_path(state, path).cloned(),
    }
}

/// Looks up a dotted path in a values map.
///
/// Numeric segments index into arrays. Empty segments, overlong paths, and
/// traversal through scalars all resolve to `None`.
#[must_use]
pub fn lookup_path<'a>(state: &'a ConfigValues, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    if first.is_empty() {
        return None;
    }
    let mut current = state.get(first)?;
    for (index, segment) in segments.enumerate() {
        if segment.is_empty() || index + 1 >= MAX_PATH_SEGMENTS {
            return None;
        }
        current = match current {
            Value::Object(object) => object.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolves a named parameter table, dropping parameters that resolve to nothing.
#[must_use]
pub fn resolve_params(
    params: &BTreeMap<String, DynamicValue>,
    state: &ConfigValues,
) -> Map<String, Value> {
    params
        .iter()
        .filter_map(|(name, value)| {
            resolve_dynamic(value, state).map(|resolved| (name.clone(), resolved))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap for clarity."
    )]

    use std::collections::BTreeMap;

    use serde_json::json;

    use super::DynamicValue;
    use super::lookup_path;
    use super::resolve_dynamic;
    use super::resolve_params;
    use crate::schema::ConfigValues;

    fn state() -> ConfigValues {
        json!({
            "mode": "cloud",
            "server": { "port": 8080, "hosts": ["a", "b"] }
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn literals_pass_through_untouched() {
        let literal = DynamicValue::from_value(&json!({"kind": "plain"}));
        assert_eq!(resolve_dynamic(&literal, &state()), Some(json!({"kind": "plain"})));
    }

    #[test]
    fn dotted_paths_walk_objects_and_arrays() {
        let values = state();
        assert_eq!(lookup_path(&values, "server.port"), Some(&json!(8080)));
        assert_eq!(lookup_path(&values, "server.hosts.1"), Some(&json!("b")));
        assert_eq!(lookup_path(&values, "server.hosts.9"), None);
        assert_eq!(lookup_path(&values, "mode.length"), None);
        assert_eq!(lookup_path(&values, "server..port"), None);
    }

    #[test]
    fn missing_params_are_dropped() {
        let mut params = BTreeMap::new();
        params.insert("mode".to_string(), DynamicValue::path("mode"));
        params.insert("ghost".to_string(), DynamicValue::path("nope.never"));
        params.insert("fixed".to_string(), DynamicValue::Literal(json!(3)));
        let resolved = resolve_params(&params, &state());
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.get("mode"), Some(&json!("cloud")));
        assert!(!resolved.contains_key("ghost"));
    }
}
