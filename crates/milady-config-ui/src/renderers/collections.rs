// crates/milady-config-ui/src/renderers/collections.rs
// ============================================================================
// Module: Collection Renderers
// Description: List, key-value map, and table editors.
// Purpose: Edit array and object values under fixed size caps.
// Dependencies: serde_json, milady-config-core
// ============================================================================

//! ## Overview
//! Collection editors rebuild the whole value on every edit and report it as a
//! replacement. Each editor enforces its cap: adding past the cap is refused,
//! and wholesale replacements that exceed it are ignored.
//!
//! | Editor    | Value shape        | Cap |
//! |-----------|--------------------|-----|
//! | list      | array of scalars   | 100 |
//! | key-value | object of strings  | 100 |
//! | table     | array of objects   | 50  |

use milady_config_core::ARRAY_MAX_ITEMS;
use milady_config_core::KEY_VALUE_MAX_ENTRIES;
use milady_config_core::PropertySchema;
use milady_config_core::SchemaType;
use milady_config_core::TABLE_MAX_ROWS;
use milady_config_core::schema::display_value;
use serde_json::Map;
use serde_json::Value;

use super::coerce_text;
use super::common_edit;
use crate::node::Control;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderProps;
use crate::props::FieldRenderer;
use crate::props::FieldUiState;

// ============================================================================
// SECTION: List
// ============================================================================

/// Editor for arrays of scalar items.
#[derive(Debug, Clone, Copy)]
pub struct ArrayRenderer;

/// Current items; non-arrays read as empty.
fn array_items(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

impl FieldRenderer for ArrayRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, _ui: &FieldUiState) -> Control {
        let items: Vec<String> = array_items(props.value).iter().map(display_value).collect();
        Control::List {
            can_add: !props.readonly && items.len() < ARRAY_MAX_ITEMS,
            items,
            max: ARRAY_MAX_ITEMS,
        }
    }

    fn apply(
        &self,
        props: &FieldRenderProps<'_>,
        _ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        let item_schema = props.schema().items.as_deref();
        let mut items = array_items(props.value);
        match edit {
            FieldEdit::AddItem(text) => {
                if items.len() >= ARRAY_MAX_ITEMS {
                    return EditOutcome::Unchanged;
                }
                items.push(coerce_text(item_schema, &text));
            }
            FieldEdit::SetItem {
                index,
                text,
            } => {
                let Some(slot) = items.get_mut(index) else {
                    return EditOutcome::Unchanged;
                };
                *slot = coerce_text(item_schema, &text);
            }
            FieldEdit::RemoveItem(index) => {
                if index >= items.len() {
                    return EditOutcome::Unchanged;
                }
                items.remove(index);
            }
            FieldEdit::SetValue(Value::Array(next)) if next.len() > ARRAY_MAX_ITEMS => {
                return EditOutcome::Unchanged;
            }
            other => return common_edit(other),
        }
        EditOutcome::Changed(Value::Array(items))
    }
}

// ============================================================================
// SECTION: Key-Value
// ============================================================================

/// Editor for string maps.
#[derive(Debug, Clone, Copy)]
pub struct KeyValueRenderer;

/// Current entries in insertion order; non-objects read as empty.
fn map_entries(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

impl FieldRenderer for KeyValueRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, _ui: &FieldUiState) -> Control {
        let entries: Vec<(String, String)> = map_entries(props.value)
            .iter()
            .map(|(key, value)| (key.clone(), display_value(value)))
            .collect();
        Control::KeyValue {
            can_add: !props.readonly && entries.len() < KEY_VALUE_MAX_ENTRIES,
            entries,
            max: KEY_VALUE_MAX_ENTRIES,
        }
    }

    fn apply(
        &self,
        props: &FieldRenderProps<'_>,
        _ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        let mut map = map_entries(props.value);
        match edit {
            FieldEdit::AddEntry {
                key,
                value,
            } => {
                let key = key.trim().to_string();
                let full = map.len() >= KEY_VALUE_MAX_ENTRIES;
                if key.is_empty() || map.contains_key(&key) || full {
                    return EditOutcome::Unchanged;
                }
                map.insert(key, Value::String(value));
            }
            FieldEdit::SetEntry {
                key,
                value,
            } => {
                let Some(slot) = map.get_mut(&key) else {
                    return EditOutcome::Unchanged;
                };
                *slot = Value::String(value);
            }
            FieldEdit::RenameEntry {
                from,
                to,
            } => {
                let to = to.trim().to_string();
                let taken = to != from && map.contains_key(&to);
                if to.is_empty() || !map.contains_key(&from) || taken {
                    return EditOutcome::Unchanged;
                }
                map = map
                    .into_iter()
                    .map(|(key, value)| {
                        let key = if key == from { to.clone() } else { key };
                        (key, value)
                    })
                    .collect();
            }
            FieldEdit::RemoveEntry(key) => {
                if !map.contains_key(&key) {
                    return EditOutcome::Unchanged;
                }
                map = map.into_iter().filter(|(entry, _)| *entry != key).collect();
            }
            FieldEdit::SetValue(Value::Object(next)) if next.len() > KEY_VALUE_MAX_ENTRIES => {
                return EditOutcome::Unchanged;
            }
            other => return common_edit(other),
        }
        EditOutcome::Changed(Value::Object(map))
    }
}

// ============================================================================
// SECTION: Table
// ============================================================================

/// Editor for arrays of objects, one column per `items.properties` key.
#[derive(Debug, Clone, Copy)]
pub struct TableRenderer;

/// Column schema map of the row type.
fn row_schema<'a>(props: &FieldRenderProps<'a>) -> Option<&'a PropertySchema> {
    props.schema().items.as_deref()
}

/// Current rows; non-object entries read as empty rows.
fn table_rows(value: Option<&Value>) -> Vec<Map<String, Value>> {
    match value {
        Some(Value::Array(rows)) => rows
            .iter()
            .map(|row| match row {
                Value::Object(map) => map.clone(),
                _ => Map::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Empty cell value for a column type.
fn default_cell(schema: &PropertySchema) -> Value {
    if let Some(default) = &schema.default {
        return default.clone();
    }
    match schema.kind {
        Some(SchemaType::Boolean) => Value::Bool(false),
        Some(SchemaType::Number | SchemaType::Integer) => Value::Null,
        _ => Value::String(String::new()),
    }
}

impl FieldRenderer for TableRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, _ui: &FieldUiState) -> Control {
        let columns = row_schema(props)
            .map(|row| row.properties.iter().map(|(key, _)| key.to_string()).collect())
            .unwrap_or_default();
        let rows = table_rows(props.value);
        Control::Table {
            columns,
            can_add: !props.readonly && rows.len() < TABLE_MAX_ROWS,
            rows,
            max: TABLE_MAX_ROWS,
        }
    }

    fn apply(
        &self,
        props: &FieldRenderProps<'_>,
        _ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        let row_type = row_schema(props);
        let mut rows = table_rows(props.value);
        match edit {
            FieldEdit::AddRow => {
                if rows.len() >= TABLE_MAX_ROWS {
                    return EditOutcome::Unchanged;
                }
                let row = row_type
                    .map(|row| {
                        row.properties
                            .iter()
                            .map(|(key, column)| (key.to_string(), default_cell(column)))
                            .collect()
                    })
                    .unwrap_or_default();
                rows.push(row);
            }
            FieldEdit::SetCell {
                row,
                column,
                text,
            } => {
                let column_schema = row_type.and_then(|row| row.properties.get(&column));
                let Some(target) = rows.get_mut(row) else {
                    return EditOutcome::Unchanged;
                };
                target.insert(column, coerce_text(column_schema, &text));
            }
            FieldEdit::RemoveRow(index) => {
                if index >= rows.len() {
                    return EditOutcome::Unchanged;
                }
                rows.remove(index);
            }
            FieldEdit::SetValue(Value::Array(next)) if next.len() > TABLE_MAX_ROWS => {
                return EditOutcome::Unchanged;
            }
            other => return common_edit(other),
        }
        EditOutcome::Changed(Value::Array(rows.into_iter().map(Value::Object).collect()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::panic,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap/panic for clarity."
    )]

    use serde_json::Value;
    use serde_json::json;

    use super::ArrayRenderer;
    use super::KeyValueRenderer;
    use super::TableRenderer;
    use crate::props::EditOutcome;
    use crate::props::FieldEdit;
    use crate::props::FieldRenderer;
    use crate::props::FieldUiState;
    use crate::registry::standard_registry;
    use crate::renderers::testing::field;
    use crate::renderers::testing::props;

    #[test]
    fn array_at_cap_edits_but_does_not_grow() {
        let registry = standard_registry();
        let field = field("tags", json!({"type": "array", "items": {"type": "string"}}), json!({}));
        let full = Value::Array((0 .. 100).map(|index| json!(format!("t{index}"))).collect());
        let props = props(&field, Some(&full), &registry);
        let mut ui = FieldUiState::default();
        assert_eq!(
            ArrayRenderer.apply(&props, &mut ui, FieldEdit::AddItem("extra".to_string())),
            EditOutcome::Unchanged
        );
        let edit = FieldEdit::SetItem {
            index: 99,
            text: "last".to_string(),
        };
        let EditOutcome::Changed(Value::Array(items)) = ArrayRenderer.apply(&props, &mut ui, edit)
        else {
            panic!("expected an updated array");
        };
        assert_eq!(items.len(), 100);
        assert_eq!(items[99], json!("last"));
    }

    #[test]
    fn key_value_rename_keeps_position() {
        let registry = standard_registry();
        let field = field("env", json!({"type": "object"}), json!({"fieldType": "keyvalue"}));
        let current = json!({"A": "1", "B": "2", "C": "3"});
        let props = props(&field, Some(&current), &registry);
        let mut ui = FieldUiState::default();
        let edit = FieldEdit::RenameEntry {
            from: "B".to_string(),
            to: "Z".to_string(),
        };
        let EditOutcome::Changed(Value::Object(map)) =
            KeyValueRenderer.apply(&props, &mut ui, edit)
        else {
            panic!("expected an updated map");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "Z", "C"]);
        let duplicate = FieldEdit::AddEntry {
            key: "A".to_string(),
            value: "x".to_string(),
        };
        assert_eq!(KeyValueRenderer.apply(&props, &mut ui, duplicate), EditOutcome::Unchanged);
    }

    #[test]
    fn table_rows_use_column_types() {
        let registry = standard_registry();
        let field = field(
            "routes",
            json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "path": {"type": "string"},
                        "weight": {"type": "number"},
                        "enabled": {"type": "boolean"}
                    }
                }
            }),
            json!({"fieldType": "table"}),
        );
        let props = props(&field, None, &registry);
        let mut ui = FieldUiState::default();
        let outcome = TableRenderer.apply(&props, &mut ui, FieldEdit::AddRow);
        assert_eq!(
            outcome,
            EditOutcome::Changed(json!([{"path": "", "weight": null, "enabled": false}]))
        );
        let row = json!([{"path": "/", "weight": null, "enabled": false}]);
        let props = crate::renderers::testing::props(&field, Some(&row), &registry);
        let edit = FieldEdit::SetCell {
            row: 0,
            column: "weight".to_string(),
            text: "2.5".to_string(),
        };
        assert_eq!(
            TableRenderer.apply(&props, &mut ui, edit),
            EditOutcome::Changed(json!([{"path": "/", "weight": 2.5, "enabled": false}]))
        );
    }
}
