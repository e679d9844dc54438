// crates/milady-config-core/src/hint.rs
// ============================================================================
// Module: UI Hints
// Description: Per-property rendering and behavior metadata.
// Purpose: Parse, merge, and expose hints keyed by schema property name.
// Dependencies: serde, serde_json, crate::{dynamic, validation, visibility}
// ============================================================================

//! ## Overview
//! Hints describe how a property is presented (label, placeholder, width,
//! grouping) and how it behaves (visibility rules, validation checks, action
//! bindings). Hints arrive from two sources: the plugin's server-declared hints
//! and the host view's own hints. [`merge_hint_documents`] combines them with
//! host keys winning on conflict.
//!
//! Each property hint is parsed independently and key by key. A malformed key
//! degrades to its default and is reported back to the caller instead of
//! failing the hint or the whole document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::dynamic::DynamicValue;
use crate::error::HintError;
use crate::schema::parse_keywords;
use crate::validation::ValidationCheck;
use crate::visibility::ShowIf;
use crate::visibility::VisibilityExpr;

// ============================================================================
// SECTION: Hint Types
// ============================================================================

/// Rich option entry overriding schema enums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintOption {
    /// Stored value.
    pub value: Value,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional description shown beside the option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Event to action binding declared under `hint.on.<event>`.
///
/// Accepts either a bare action name or `{ action, params }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionBinding {
    /// Registered action name.
    pub action: String,
    /// Declared parameters, resolved against form state at dispatch time.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, DynamicValue>,
}

impl<'de> Deserialize<'de> for ActionBinding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        /// Object form of a binding.
        #[derive(Deserialize)]
        struct FullBinding {
            /// Action name.
            action: String,
            /// Parameters.
            #[serde(default)]
            params: BTreeMap<String, DynamicValue>,
        }

        /// Accepted binding shapes.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawBinding {
            /// Bare action name.
            Name(String),
            /// Action with parameters.
            Full(FullBinding),
        }

        Ok(match RawBinding::deserialize(deserializer)? {
            RawBinding::Name(action) => Self {
                action,
                params: BTreeMap::new(),
            },
            RawBinding::Full(full) => Self {
                action: full.action,
                params: full.params,
            },
        })
    }
}

/// Rendering and behavior metadata for one property.
///
/// # Invariants
/// - Defaults describe a plain, visible, general-group, full-width field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UiHint {
    /// Explicit field type override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Display label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Masks the value and renders a password control.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    /// Placeholder text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Sort key; unordered fields sort last.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Group name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Layout width: `full`, `half`, or `third`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// Collapses the field into the advanced section.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub advanced: bool,
    /// Permanently excludes the field.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    /// Read-only control.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub readonly: bool,
    /// Regex the value must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Message shown when `pattern` does not match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_error: Option<String>,
    /// Numeric minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Numeric maximum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Stepper increment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Unit label shown after numeric inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Textarea/markdown row count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    /// Component name for `custom` fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Rich options overriding schema enums.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<HintOption>>,
    /// Event bindings (`change`, `blur`, `click`, ...).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub on: BTreeMap<String, ActionBinding>,
    /// Rich visibility expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<VisibilityExpr>,
    /// Legacy single-condition visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_if: Option<ShowIf>,
    /// Declarative validation checks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationCheck>,
}

// ============================================================================
// SECTION: Hint Collections
// ============================================================================

/// Hints keyed by property name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct UiHints(BTreeMap<String, UiHint>);

impl UiHints {
    /// Parses a hint document leniently.
    ///
    /// Each property hint is parsed key by key: a malformed key falls back to
    /// its default and is reported as a [`HintError`], while its siblings are
    /// kept. A malformed `sensitive` key still masks the field. A non-object
    /// document yields no hints.
    #[must_use]
    pub fn from_value(document: &Value) -> (Self, Vec<HintError>) {
        let Value::Object(entries) = document else {
            let errors = if document.is_null() { Vec::new() } else { vec![HintError::NotAnObject] };
            return (Self::default(), errors);
        };
        let mut hints = BTreeMap::new();
        let mut errors = Vec::new();
        for (key, raw) in entries {
            let Value::Object(fields) = raw else {
                errors.push(HintError::Malformed {
                    key: key.clone(),
                    message: "hint must be an object".to_string(),
                });
                hints.insert(key.clone(), UiHint::default());
                continue;
            };
            let (mut hint, dropped) = parse_keywords::<UiHint>(fields);
            if dropped.iter().any(|(keyword, _)| keyword == "sensitive") {
                hint.sensitive = true;
            }
            errors.extend(dropped.into_iter().map(|(keyword, message)| HintError::Malformed {
                key: key.clone(),
                message: format!("dropped `{keyword}`: {message}"),
            }));
            hints.insert(key.clone(), hint);
        }
        (Self(hints), errors)
    }

    /// Parses a hint document strictly.
    ///
    /// # Errors
    ///
    /// Returns the first [`HintError`] encountered.
    pub fn parse_document(document: &Value) -> Result<Self, HintError> {
        let (hints, mut errors) = Self::from_value(document);
        if errors.is_empty() { Ok(hints) } else { Err(errors.remove(0)) }
    }

    /// Returns the hint for a property, if declared.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&UiHint> {
        self.0.get(key)
    }

    /// Inserts a hint.
    pub fn insert(&mut self, key: impl Into<String>, hint: UiHint) {
        self.0.insert(key.into(), hint);
    }

    /// Number of hinted properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no hints are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, UiHint)> for UiHints {
    fn from_iter<T: IntoIterator<Item = (String, UiHint)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Merges server-declared hints with host-declared hints.
///
/// Both documents are objects keyed by property name. For properties present
/// in both, the two hint objects are merged key by key with host keys taking
/// precedence. Non-object inputs are treated as empty.
#[must_use]
pub fn merge_hint_documents(server: &Value, host: &Value) -> Value {
    let mut merged: Map<String, Value> = server.as_object().cloned().unwrap_or_default();
    let Some(host) = host.as_object() else {
        return Value::Object(merged);
    };
    for (key, host_hint) in host {
        match (merged.get_mut(key), host_hint) {
            (Some(Value::Object(server_hint)), Value::Object(host_hint)) => {
                for (hint_key, hint_value) in host_hint {
                    server_hint.insert(hint_key.clone(), hint_value.clone());
                }
            }
            _ => {
                merged.insert(key.clone(), host_hint.clone());
            }
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap for clarity."
    )]

    use serde_json::json;

    use super::UiHints;
    use super::merge_hint_documents;
    use crate::dynamic::DynamicValue;
    use crate::error::HintError;

    #[test]
    fn host_keys_win_during_merge() {
        let server = json!({
            "apiKey": { "label": "Server Label", "sensitive": true },
            "model": { "group": "Models" }
        });
        let host = json!({
            "apiKey": { "label": "API Key" },
            "region": { "advanced": true }
        });
        let merged = merge_hint_documents(&server, &host);
        assert_eq!(merged["apiKey"]["label"], json!("API Key"));
        assert_eq!(merged["apiKey"]["sensitive"], json!(true));
        assert_eq!(merged["model"]["group"], json!("Models"));
        assert_eq!(merged["region"]["advanced"], json!(true));
    }

    #[test]
    fn malformed_hints_degrade_to_defaults() {
        let (hints, errors) = UiHints::from_value(&json!({
            "good": { "label": "Good", "order": 2 },
            "bad": { "order": "first" }
        }));
        assert_eq!(hints.get("good").and_then(|hint| hint.order), Some(2));
        assert_eq!(hints.get("bad"), Some(&super::UiHint::default()));
        assert!(matches!(&errors[..], [HintError::Malformed { key, .. }] if key == "bad"));
    }

    #[test]
    fn malformed_keys_keep_their_siblings() {
        let (hints, errors) = UiHints::from_value(&json!({
            "apiKey": { "sensitive": true, "order": "1", "label": "API Key" },
            "internal": { "hidden": true, "width": 3 },
            "token": { "sensitive": "yes" },
            "broken": 5
        }));
        let api_key = hints.get("apiKey").unwrap();
        assert!(api_key.sensitive);
        assert_eq!(api_key.order, None);
        assert_eq!(api_key.label.as_deref(), Some("API Key"));
        let internal = hints.get("internal").unwrap();
        assert!(internal.hidden);
        assert_eq!(internal.width, None);
        assert!(hints.get("token").unwrap().sensitive);
        assert_eq!(hints.get("broken"), Some(&super::UiHint::default()));
        let keys: Vec<&str> = errors
            .iter()
            .filter_map(|err| match err {
                HintError::Malformed {
                    key, ..
                } => Some(key.as_str()),
                HintError::NotAnObject => None,
            })
            .collect();
        assert_eq!(keys, vec!["apiKey", "internal", "token", "broken"]);
    }

    #[test]
    fn action_bindings_accept_both_shapes() {
        let (hints, errors) = UiHints::from_value(&json!({
            "provider": {
                "on": {
                    "change": "refreshModels",
                    "blur": { "action": "probe", "params": { "target": { "path": "baseUrl" } } }
                }
            }
        }));
        assert!(errors.is_empty());
        let hint = hints.get("provider").unwrap();
        assert_eq!(hint.on["change"].action, "refreshModels");
        assert_eq!(hint.on["blur"].params["target"], DynamicValue::path("baseUrl"));
    }
}
