// crates/milady-config-core/src/validation.rs
// ============================================================================
// Module: Declarative Validation
// Description: Check descriptors, host function table, and the check runner.
// Purpose: Turn hint `validation` lists into ordered error messages.
// Dependencies: regex, serde, serde_json, crate::{catalog, dynamic, visibility}
// ============================================================================

//! ## Overview
//! A hint's `validation` list is a closed set of check descriptors. The runner
//! evaluates every check independently (no short-circuit) so a field can
//! report several violations at once. Unrecognized descriptors are kept as
//! [`CheckRule::Unknown`] and pass, matching the fail-open posture used for
//! visibility.
//!
//! Regex patterns come from untrusted plugin metadata. [`is_safe_pattern`]
//! rejects overlong patterns and nested quantifiers before compilation; a
//! rejected or invalid pattern is skipped rather than reported as an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::RegexBuilder;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;

use crate::catalog::is_plausible_email;
use crate::catalog::is_well_formed_url;
use crate::catalog::numeric_value;
use crate::dynamic::DynamicValue;
use crate::dynamic::lookup_path;
use crate::dynamic::resolve_params;
use crate::schema::ConfigValues;
use crate::schema::display_value;
use crate::schema::is_empty_value;
use crate::visibility::loose_equals;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Longest pattern accepted from hints.
pub const MAX_PATTERN_LENGTH: usize = 200;
/// Compiled regex size cap in bytes.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Message used by the required stage and `required` checks.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

// ============================================================================
// SECTION: Check Descriptors
// ============================================================================

/// Rule carried by a check descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckRule {
    /// Value must be non-empty.
    Required,
    /// Value must match a regex.
    Regex {
        /// Pattern source.
        pattern: String,
    },
    /// Numeric value must lie within bounds.
    Range {
        /// Inclusive minimum.
        min: Option<f64>,
        /// Inclusive maximum.
        max: Option<f64>,
    },
    /// Text length (or item count) must lie within bounds.
    Length {
        /// Minimum length.
        min: Option<u64>,
        /// Maximum length.
        max: Option<u64>,
    },
    /// Value must look like an email address.
    Email,
    /// Value must be a well-formed URL.
    Url,
    /// Value must equal another field's value.
    Matches {
        /// Dotted path of the other field.
        field: String,
    },
    /// Host-supplied function keyed by name.
    Custom {
        /// Function name in [`ValidationFunctions`].
        function: String,
        /// Declared parameters resolved against form state.
        params: BTreeMap<String, DynamicValue>,
    },
    /// Unrecognized descriptor; always passes.
    Unknown(Value),
}

/// One declarative check with an optional custom message.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationCheck {
    /// Rule to evaluate.
    pub rule: CheckRule,
    /// Message overriding the rule's default.
    pub message: Option<String>,
}

impl ValidationCheck {
    /// Builds a check with the default message.
    #[must_use]
    pub const fn new(rule: CheckRule) -> Self {
        Self {
            rule,
            message: None,
        }
    }

    /// Replaces the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Parses a raw descriptor; never fails.
    #[must_use]
    pub fn from_value(raw: &Value) -> Self {
        let Value::Object(object) = raw else {
            return Self::new(CheckRule::Unknown(raw.clone()));
        };
        let message = object.get("message").and_then(Value::as_str).map(str::to_string);
        let rule = object
            .get("type")
            .and_then(Value::as_str)
            .and_then(|kind| parse_rule(kind, object))
            .unwrap_or_else(|| CheckRule::Unknown(raw.clone()));
        Self {
            rule,
            message,
        }
    }

    /// Converts the check back to its descriptor form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        let kind = match &self.rule {
            CheckRule::Unknown(raw) => return raw.clone(),
            CheckRule::Required => "required",
            CheckRule::Regex {
                pattern,
            } => {
                object.insert("pattern".to_string(), Value::String(pattern.clone()));
                "regex"
            }
            CheckRule::Range {
                min,
                max,
            } => {
                insert_bound(&mut object, "min", min.map(Value::from));
                insert_bound(&mut object, "max", max.map(Value::from));
                "range"
            }
            CheckRule::Length {
                min,
                max,
            } => {
                insert_bound(&mut object, "min", min.map(Value::from));
                insert_bound(&mut object, "max", max.map(Value::from));
                "length"
            }
            CheckRule::Email => "email",
            CheckRule::Url => "url",
            CheckRule::Matches {
                field,
            } => {
                object.insert("field".to_string(), Value::String(field.clone()));
                "matches"
            }
            CheckRule::Custom {
                function,
                params,
            } => {
                object.insert("fn".to_string(), Value::String(function.clone()));
                if !params.is_empty() {
                    let params =
                        params.iter().map(|(name, value)| (name.clone(), value.to_value()));
                    object.insert("params".to_string(), Value::Object(params.collect()));
                }
                "custom"
            }
        };
        object.insert("type".to_string(), Value::String(kind.to_string()));
        if let Some(message) = &self.message {
            object.insert("message".to_string(), Value::String(message.clone()));
        }
        Value::Object(object)
    }
}

/// Inserts an optional bound.
fn insert_bound(object: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        object.insert(key.to_string(), value);
    }
}

/// Parses a known rule; `None` marks the descriptor as unknown.
fn parse_rule(kind: &str, object: &Map<String, Value>) -> Option<CheckRule> {
    let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
    let float = |key: &str| object.get(key).and_then(Value::as_f64);
    let count = |key: &str| object.get(key).and_then(Value::as_u64);
    let rule = match kind {
        "required" => CheckRule::Required,
        "regex" | "pattern" => CheckRule::Regex {
            pattern: text("pattern")?,
        },
        "range" => CheckRule::Range {
            min: float("min"),
            max: float("max"),
        },
        "length" => CheckRule::Length {
            min: count("min"),
            max: count("max"),
        },
        "email" => CheckRule::Email,
        "url" => CheckRule::Url,
        "matches" => CheckRule::Matches {
            field: text("field")?,
        },
        "custom" => CheckRule::Custom {
            function: text("fn").or_else(|| text("name"))?,
            params: object
                .get("params")
                .and_then(Value::as_object)
                .map(|params| {
                    params
                        .iter()
                        .map(|(name, raw)| (name.clone(), DynamicValue::from_value(raw)))
                        .collect()
                })
                .unwrap_or_default(),
        },
        _ => return None,
    };
    Some(rule)
}

impl Serialize for ValidationCheck {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValidationCheck {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&raw))
    }
}

// ============================================================================
// SECTION: Host Functions
// ============================================================================

/// Inputs handed to a host validation function.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Value under validation.
    pub value: &'a Value,
    /// Declared parameters after path resolution.
    pub params: &'a Map<String, Value>,
    /// Full form state.
    pub values: &'a ConfigValues,
}

/// Host validation function; returns true when the value is acceptable.
pub type ValidationFn = Arc<dyn Fn(&ValidationContext<'_>) -> bool + Send + Sync>;

/// Named table of host validation functions.
#[derive(Clone, Default)]
pub struct ValidationFunctions {
    /// Functions keyed by name.
    functions: BTreeMap<String, ValidationFn>,
}

impl ValidationFunctions {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function, replacing any previous one with the same name.
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&ValidationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Looks up a function.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ValidationFn> {
        self.functions.get(name)
    }

    /// Registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl fmt::Debug for ValidationFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Outcome of running a check list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    /// True when no check failed.
    pub valid: bool,
    /// One message per failing check, in check order.
    pub errors: Vec<String>,
    /// Custom functions referenced but not registered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_functions: Vec<String>,
    /// Regex patterns skipped as unsafe or invalid.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_patterns: Vec<String>,
}

/// Runs every check against a value.
///
/// Empty values only fail `required`; every other rule passes on empty input
/// so optional fields are not flagged before the user types anything.
#[must_use]
pub fn run_validation(
    checks: &[ValidationCheck],
    value: Option<&Value>,
    values: &ConfigValues,
    functions: &ValidationFunctions,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let empty = is_empty_value(value);
    for check in checks {
        let outcome = match (&check.rule, value) {
            (CheckRule::Required, _) => (!empty).then_some(()).ok_or(REQUIRED_MESSAGE),
            (CheckRule::Unknown(_), _) | (_, None) => Ok(()),
            _ if empty => Ok(()),
            (rule, Some(value)) => evaluate_rule(rule, value, values, functions, &mut report),
        };
        if let Err(default_message) = outcome {
            let message = check.message.clone().unwrap_or_else(|| default_message.to_string());
            report.errors.push(message);
        }
    }
    report.valid = report.errors.is_empty();
    report
}

/// Evaluates one non-empty rule; `Err` carries the default message.
fn evaluate_rule(
    rule: &CheckRule,
    value: &Value,
    values: &ConfigValues,
    functions: &ValidationFunctions,
    report: &mut ValidationReport,
) -> Result<(), &'static str> {
    match rule {
        CheckRule::Required | CheckRule::Unknown(_) => Ok(()),
        CheckRule::Regex {
            pattern,
        } => match pattern_matches(pattern, value) {
            PatternOutcome::Matched => Ok(()),
            PatternOutcome::Mismatched => Err("Invalid format."),
            PatternOutcome::Skipped => {
                report.skipped_patterns.push(pattern.clone());
                Ok(())
            }
        },
        CheckRule::Range {
            min,
            max,
        } => {
            let number = numeric_value(value).ok_or("Must be a number.")?;
            if min.is_some_and(|min| number < min) || max.is_some_and(|max| number > max) {
                Err("Value is out of range.")
            } else {
                Ok(())
            }
        }
        CheckRule::Length {
            min,
            max,
        } => {
            let length = value_length(value);
            if min.is_some_and(|min| length < min) || max.is_some_and(|max| length > max) {
                Err("Length is out of range.")
            } else {
                Ok(())
            }
        }
        CheckRule::Email => match value {
            Value::String(text) if is_plausible_email(text) => Ok(()),
            _ => Err("Must be a valid email address."),
        },
        CheckRule::Url => match value {
            Value::String(text) if is_well_formed_url(text) => Ok(()),
            _ => Err("Must be a valid URL."),
        },
        CheckRule::Matches {
            field,
        } => match lookup_path(values, field) {
            Some(other) if loose_equals(value, other) => Ok(()),
            _ => Err("Values do not match."),
        },
        CheckRule::Custom {
            function,
            params,
        } => {
            let Some(host_fn) = functions.get(function) else {
                report.missing_functions.push(function.clone());
                return Ok(());
            };
            let params = resolve_params(params, values);
            let context = ValidationContext {
                value,
                params: &params,
                values,
            };
            if host_fn(&context) { Ok(()) } else { Err("Invalid value.") }
        }
    }
}

/// Length of text in characters, arrays in items, objects in entries.
fn value_length(value: &Value) -> u64 {
    let length = match value {
        Value::String(text) => text.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(entries) => entries.len(),
        other => other.to_string().chars().count(),
    };
    u64::try_from(length).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Pattern Guard
// ============================================================================

/// Result of matching an untrusted pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOutcome {
    /// Pattern compiled and matched.
    Matched,
    /// Pattern compiled and did not match.
    Mismatched,
    /// Pattern was unsafe or invalid and was not evaluated.
    Skipped,
}

/// Returns false for overlong patterns and nested quantifiers such as `(a+)+`.
#[must_use]
pub fn is_safe_pattern(pattern: &str) -> bool {
    pattern.len() <= MAX_PATTERN_LENGTH && !has_nested_quantifier(pattern)
}

/// Detects a quantified group whose body already contains a quantifier.
fn has_nested_quantifier(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    let mut group_has_quantifier: Vec<bool> = Vec::new();
    let mut escaped = false;
    let mut in_class = false;
    for (index, ch) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            _ if in_class => {}
            '(' => group_has_quantifier.push(false),
            ')' => {
                let inner = group_has_quantifier.pop().unwrap_or(false);
                let quantified = matches!(chars.get(index + 1), Some('+' | '*' | '{'));
                if inner && quantified {
                    return true;
                }
                if let Some(outer) = group_has_quantifier.last_mut() {
                    *outer |= inner || quantified;
                }
            }
            '+' | '*' | '{' => {
                if let Some(current) = group_has_quantifier.last_mut() {
                    *current = true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Matches a value's display text against an untrusted pattern.
///
/// Matching is unanchored; authors anchor with `^`/`$` when they need to.
#[must_use]
pub fn pattern_matches(pattern: &str, value: &Value) -> PatternOutcome {
    if !is_safe_pattern(pattern) {
        return PatternOutcome::Skipped;
    }
    let Ok(regex) = RegexBuilder::new(pattern).size_limit(REGEX_SIZE_LIMIT).build() else {
        return PatternOutcome::Skipped;
    };
    let text = match value {
        Value::String(text) => text.clone(),
        other => display_value(other),
    };
    if regex.is_match(&text) { PatternOutcome::Matched } else { PatternOutcome::Mismatched }
}
