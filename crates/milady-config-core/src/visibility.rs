// crates/milady-config-core/src/visibility.rs
// ============================================================================
// Module: Visibility Evaluator
// Description: Declarative logic expressions deciding field visibility.
// Purpose: Evaluate and/or/not trees over path comparisons, failing open.
// Dependencies: serde, serde_json, smallvec, crate::dynamic
// ============================================================================

//! ## Overview
//! Visibility rules form a closed tagged tree: comparison leaves (`equals`,
//! `notEquals`, `in`, `truthy`) combined by `and`, `or`, and `not`. Parsing
//! never fails; unrecognized shapes become [`VisibilityExpr::Unknown`].
//!
//! Evaluation is tri-state with strong Kleene tables. Unknown nodes and
//! malformed comparisons produce [`TriState::Unknown`], which the root maps to
//! "visible" so bad plugin metadata never silently hides configuration.
//!
//! The legacy single-condition [`ShowIf`] form is kept for older hints. When a
//! field carries both forms, `visible` wins and `showIf` is never consulted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;
use smallvec::SmallVec;

use crate::dynamic::DynamicValue;
use crate::dynamic::lookup_path;
use crate::dynamic::resolve_dynamic;
use crate::schema::ConfigValues;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum expression nesting evaluated before failing open.
pub const MAX_VISIBILITY_DEPTH: usize = 32;

// ============================================================================
// SECTION: Tri-State Value
// ============================================================================

/// Tri-state truth value used during evaluation.
///
/// # Invariants
/// - Represents a closed set of truth values: true, false, or unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriState {
    /// Definitively true.
    True,
    /// Definitively false.
    False,
    /// Indeterminate because the expression was malformed.
    Unknown,
}

impl TriState {
    /// Strong Kleene conjunction.
    #[must_use]
    pub const fn and(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Unknown,
        }
    }

    /// Strong Kleene disjunction.
    #[must_use]
    pub const fn or(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Unknown,
        }
    }

    /// Strong Kleene negation.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }

    /// Collapses to a visibility decision; only `False` hides.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::False)
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

// ============================================================================
// SECTION: Expression Tree
// ============================================================================

/// Leaf comparison over dynamic values.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// `{ "equals": lhs, "value": rhs }`
    Equals {
        /// Left operand, usually a path.
        left: DynamicValue,
        /// Right operand.
        right: DynamicValue,
    },
    /// `{ "notEquals": lhs, "value": rhs }`
    NotEquals {
        /// Left operand, usually a path.
        left: DynamicValue,
        /// Right operand.
        right: DynamicValue,
    },
    /// `{ "in": needle, "value": [..] }`
    In {
        /// Value searched for.
        needle: DynamicValue,
        /// Array literal or path to an array.
        haystack: DynamicValue,
    },
    /// `{ "truthy": operand }`
    Truthy(DynamicValue),
}

/// Visibility expression tree.
///
/// # Invariants
/// - `Unknown` retains the raw JSON so serialization is lossless.
#[derive(Debug, Clone, PartialEq)]
pub enum VisibilityExpr {
    /// Literal `true` or `false`.
    Const(bool),
    /// All children must hold. Empty `and` is visible.
    And(SmallVec<[Box<Self>; 4]>),
    /// At least one child must hold. Empty `or` is treated as malformed.
    Or(SmallVec<[Box<Self>; 4]>),
    /// Inverts the child.
    Not(Box<Self>),
    /// Comparison leaf.
    Compare(Comparison),
    /// Unrecognized node; evaluates to unknown (visible).
    Unknown(Value),
}

impl VisibilityExpr {
    /// Parses a raw JSON expression; never fails.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(flag) => Self::Const(*flag),
            Value::Object(object) => {
                parse_object(object).unwrap_or_else(|| Self::Unknown(value.clone()))
            }
            _ => Self::Unknown(value.clone()),
        }
    }

    /// Converts the expression back to JSON.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Const(flag) => Value::Bool(*flag),
            Self::And(children) => single("and", children_to_value(children)),
            Self::Or(children) => single("or", children_to_value(children)),
            Self::Not(child) => single("not", child.to_value()),
            Self::Compare(comparison) => comparison_to_value(comparison),
            Self::Unknown(raw) => raw.clone(),
        }
    }

    /// Builds an `and` node.
    #[must_use]
    pub fn and(children: Vec<Self>) -> Self {
        Self::And(children.into_iter().map(Box::new).collect())
    }

    /// Builds an `or` node.
    #[must_use]
    pub fn or(children: Vec<Self>) -> Self {
        Self::Or(children.into_iter().map(Box::new).collect())
    }

    /// Builds a `not` node.
    #[must_use]
    pub fn negate(child: Self) -> Self {
        Self::Not(Box::new(child))
    }

    /// Builds an `equals` leaf comparing a path against a literal.
    #[must_use]
    pub fn path_equals(path: &str, value: Value) -> Self {
        Self::Compare(Comparison::Equals {
            left: DynamicValue::path(path),
            right: DynamicValue::Literal(value),
        })
    }

    /// Evaluates the expression to a tri-state result.
    #[must_use]
    pub fn evaluate(&self, values: &ConfigValues) -> TriState {
        eval_node(self, values, 0)
    }
}

impl Serialize for VisibilityExpr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VisibilityExpr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&raw))
    }
}

/// Operator keys recognized on expression objects.
const OPERATOR_KEYS: [&str; 7] = ["and", "or", "not", "equals", "notEquals", "in", "truthy"];

/// Parses an object node; `None` marks the node as unknown.
fn parse_object(object: &Map<String, Value>) -> Option<VisibilityExpr> {
    let mut operators = OPERATOR_KEYS.iter().filter(|key| object.contains_key(**key));
    let operator = *operators.next()?;
    if operators.next().is_some() {
        return None;
    }
    let operand = object.get(operator)?;
    let right = object.get("value").map(DynamicValue::from_value);
    let node = match operator {
        "and" => VisibilityExpr::And(parse_children(operand)?),
        "or" => VisibilityExpr::Or(parse_children(operand)?),
        "not" => VisibilityExpr::Not(Box::new(VisibilityExpr::from_value(operand))),
        "equals" => VisibilityExpr::Compare(Comparison::Equals {
            left: DynamicValue::from_value(operand),
            right: right?,
        }),
        "notEquals" => VisibilityExpr::Compare(Comparison::NotEquals {
            left: DynamicValue::from_value(operand),
            right: right?,
        }),
        "in" => VisibilityExpr::Compare(Comparison::In {
            needle: DynamicValue::from_value(operand),
            haystack: right?,
        }),
        "truthy" => VisibilityExpr::Compare(Comparison::Truthy(DynamicValue::from_value(operand))),
        _ => return None,
    };
    Some(node)
}

/// Parses the child list of an `and`/`or` node.
fn parse_children(value: &Value) -> Option<SmallVec<[Box<VisibilityExpr>; 4]>> {
    let Value::Array(items) = value else {
        return None;
    };
    Some(items.iter().map(|item| Box::new(VisibilityExpr::from_value(item))).collect())
}

/// Builds a single-key JSON object.
fn single(key: &str, value: Value) -> Value {
    let mut object = Map::new();
    object.insert(key.to_string(), value);
    Value::Object(object)
}

/// Serializes child expressions.
fn children_to_value(children: &[Box<VisibilityExpr>]) -> Value {
    Value::Array(children.iter().map(|child| child.to_value()).collect())
}

/// Serializes a comparison leaf.
fn comparison_to_value(comparison: &Comparison) -> Value {
    let (key, left, right) = match comparison {
        Comparison::Equals {
            left,
            right,
        } => ("equals", left, Some(right)),
        Comparison::NotEquals {
            left,
            right,
        } => ("notEquals", left, Some(right)),
        Comparison::In {
            needle,
            haystack,
        } => ("in", needle, Some(haystack)),
        Comparison::Truthy(operand) => ("truthy", operand, None),
    };
    let mut object = Map::new();
    object.insert(key.to_string(), left.to_value());
    if let Some(right) = right {
        object.insert("value".to_string(), right.to_value());
    }
    Value::Object(object)
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Recursive evaluator with a depth guard.
fn eval_node(expr: &VisibilityExpr, values: &ConfigValues, depth: usize) -> TriState {
    if depth >= MAX_VISIBILITY_DEPTH {
        return TriState::Unknown;
    }
    match expr {
        VisibilityExpr::Const(flag) => TriState::from(*flag),
        VisibilityExpr::And(children) => {
            let mut result = TriState::True;
            for child in children {
                result = result.and(eval_node(child, values, depth + 1));
                if result == TriState::False {
                    break;
                }
            }
            result
        }
        VisibilityExpr::Or(children) => {
            if children.is_empty() {
                return TriState::Unknown;
            }
            let mut result = TriState::False;
            for child in children {
                result = result.or(eval_node(child, values, depth + 1));
                if result == TriState::True {
                    break;
                }
            }
            result
        }
        VisibilityExpr::Not(child) => eval_node(child, values, depth + 1).negate(),
        VisibilityExpr::Compare(comparison) => eval_comparison(comparison, values),
        VisibilityExpr::Unknown(_) => TriState::Unknown,
    }
}

/// Evaluates a comparison leaf.
fn eval_comparison(comparison: &Comparison, values: &ConfigValues) -> TriState {
    match comparison {
        Comparison::Equals {
            left,
            right,
        } => TriState::from(optional_equals(
            resolve_dynamic(left, values).as_ref(),
            resolve_dynamic(right, values).as_ref(),
        )),
        Comparison::NotEquals {
            left,
            right,
        } => TriState::from(!optional_equals(
            resolve_dynamic(left, values).as_ref(),
            resolve_dynamic(right, values).as_ref(),
        )),
        Comparison::In {
            needle,
            haystack,
        } => {
            let needle = resolve_dynamic(needle, values);
            match resolve_dynamic(haystack, values) {
                Some(Value::Array(items)) => TriState::from(needle.is_some_and(|needle| {
                    items.iter().any(|item| loose_equals(&needle, item))
                })),
                None => TriState::False,
                Some(_) => TriState::Unknown,
            }
        }
        Comparison::Truthy(operand) => {
            TriState::from(is_truthy(resolve_dynamic(operand, values).as_ref()))
        }
    }
}

/// Equality where two missing operands are equal and one missing operand is not.
fn optional_equals(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(left), Some(right)) => loose_equals(left, right),
        _ => false,
    }
}

/// Compares JSON values, treating numerically equal numbers as equal.
#[must_use]
pub fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => match (left.as_f64(), right.as_f64()) {
            (Some(left), Some(right)) => (left - right).abs() <= f64::EPSILON * left.abs().max(1.0),
            _ => left == right,
        },
        _ => left == right,
    }
}

/// Truthiness matching the host UI: missing, null, false, zero, NaN, and the
/// empty string are falsy; everything else (including empty arrays) is truthy.
#[must_use]
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Evaluates an optional rich expression; absent means visible.
#[must_use]
pub fn evaluate_visibility(expr: &VisibilityExpr, values: &ConfigValues) -> bool {
    expr.evaluate(values).is_visible()
}

// ============================================================================
// SECTION: Legacy ShowIf
// ============================================================================

/// Legacy single-condition visibility rule: `{ field, op, value }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShowIf {
    /// Field key (dotted paths allowed).
    pub field: String,
    /// Operator: `eq` (default), `neq`, `in`, `truthy`, `falsy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    /// Comparison operand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Evaluates a legacy `showIf` rule. Unknown operators and empty field names
/// leave the field visible.
#[must_use]
pub fn evaluate_show_if(show_if: &ShowIf, values: &ConfigValues) -> bool {
    if show_if.field.is_empty() {
        return true;
    }
    let current = lookup_path(values, &show_if.field);
    match show_if.op.as_deref().unwrap_or("eq") {
        "eq" | "equals" => optional_equals(current, show_if.value.as_ref()),
        "neq" | "notEquals" => !optional_equals(current, show_if.value.as_ref()),
        "in" => match (&show_if.value, current) {
            (Some(Value::Array(items)), Some(current)) => {
                items.iter().any(|item| loose_equals(current, item))
            }
            (Some(Value::Array(_)), None) => false,
            _ => true,
        },
        "truthy" => is_truthy(current),
        "falsy" => !is_truthy(current),
        _ => true,
    }
}

/// Applies the visibility precedence: `visible` wins; `show_if` is only
/// consulted when no rich expression exists; neither means visible.
#[must_use]
pub fn is_field_visible(
    visible: Option<&VisibilityExpr>,
    show_if: Option<&ShowIf>,
    values: &ConfigValues,
) -> bool {
    match (visible, show_if) {
        (Some(expr), _) => evaluate_visibility(expr, values),
        (None, Some(show_if)) => evaluate_show_if(show_if, values),
        (None, None) => true,
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

    use super::ShowIf;
    use super::TriState;
    use super::VisibilityExpr;
    use super::evaluate_visibility;
    use super::is_field_visible;
    use crate::schema::ConfigValues;

    fn values(raw: serde_json::Value) -> ConfigValues {
        raw.as_object().cloned().unwrap()
    }

    #[test]
    fn and_of_equals_tracks_mode() {
        let expr = VisibilityExpr::from_value(&json!({
            "and": [{ "equals": { "path": "mode" }, "value": "cloud" }]
        }));
        assert!(!evaluate_visibility(&expr, &values(json!({"mode": "local"}))));
        assert!(evaluate_visibility(&expr, &values(json!({"mode": "cloud"}))));
    }

    #[test]
    fn unknown_nodes_fail_open_even_under_not() {
        let expr = VisibilityExpr::from_value(&json!({"not": {"matches": "???"}}));
        assert_eq!(expr.evaluate(&ConfigValues::new()), TriState::Unknown);
        assert!(evaluate_visibility(&expr, &ConfigValues::new()));
    }

    #[test]
    fn ambiguous_operator_objects_are_unknown() {
        let raw = json!({"and": [], "or": []});
        let expr = VisibilityExpr::from_value(&raw);
        assert_eq!(expr, VisibilityExpr::Unknown(raw));
    }

    #[test]
    fn visible_takes_priority_over_show_if() {
        let expr = VisibilityExpr::Const(true);
        let show_if = ShowIf {
            field: "mode".to_string(),
            op: None,
            value: Some(json!("never")),
        };
        let state = values(json!({"mode": "cloud"}));
        assert!(is_field_visible(Some(&expr), Some(&show_if), &state));
        assert!(!is_field_visible(None, Some(&show_if), &state));
    }

    #[test]
    fn expressions_round_trip_through_json() {
        let raw = json!({
            "or": [
                { "in": { "path": "provider" }, "value": ["openai", "anthropic"] },
                { "not": { "truthy": { "path": "local" } } }
            ]
        });
        let expr = VisibilityExpr::from_value(&raw);
        assert_eq!(expr.to_value(), raw);
    }
}
