// crates/milady-config-ui/tests/proptest_collections.rs
// ============================================================================
// Module: Collection Cap Property-Based Tests
// Description: Property tests for list and table size caps.
// Purpose: Ensure no edit sequence grows a collection past its cap.
// ============================================================================

//! Property-based tests for collection caps.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod support;

use milady_config_core::ARRAY_MAX_ITEMS;
use milady_config_core::ConfigValues;
use milady_config_core::SetKeys;
use milady_config_core::TABLE_MAX_ROWS;
use milady_config_ui::ConfigRenderer;
use milady_config_ui::FieldEdit;
use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;

/// Applies edits in order, feeding each change back as the host would.
fn drive(renderer: &mut ConfigRenderer, key: &str, edits: Vec<FieldEdit>) -> ConfigValues {
    let mut values = ConfigValues::new();
    let keys = SetKeys::new();
    for edit in edits {
        let result = renderer.handle_edit(key, edit, &values, &keys, |_, _| {});
        if let Some(next) = result.changed {
            values.insert(key.to_string(), next);
        }
    }
    values
}

/// List edits biased toward additions.
fn list_edit() -> impl Strategy<Value = FieldEdit> {
    prop_oneof![
        8 => "[a-z]{1,4}".prop_map(FieldEdit::AddItem),
        1 => (0usize .. 120, "[a-z]{1,4}")
            .prop_map(|(index, text)| FieldEdit::SetItem { index, text }),
        1 => (0usize .. 120).prop_map(FieldEdit::RemoveItem),
    ]
}

/// Table edits biased toward additions.
fn table_edit() -> impl Strategy<Value = FieldEdit> {
    prop_oneof![
        8 => Just(FieldEdit::AddRow),
        1 => (0usize .. 60, "[a-z]{1,4}").prop_map(|(row, text)| FieldEdit::SetCell {
            row,
            column: "name".to_string(),
            text,
        }),
        1 => (0usize .. 60).prop_map(FieldEdit::RemoveRow),
    ]
}

/// Length of an array value, zero when absent.
fn len(values: &ConfigValues, key: &str) -> usize {
    values.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn lists_never_exceed_cap(edits in prop::collection::vec(list_edit(), 0 .. 160)) {
        let schema = json!({
            "type": "object",
            "properties": { "tags": { "type": "array", "items": { "type": "string" } } }
        });
        let (mut renderer, _) = support::renderer(&schema, &Value::Null);
        let values = drive(&mut renderer, "tags", edits);
        prop_assert!(len(&values, "tags") <= ARRAY_MAX_ITEMS);
    }

    #[test]
    fn tables_never_exceed_cap(edits in prop::collection::vec(table_edit(), 0 .. 90)) {
        let schema = json!({
            "type": "object",
            "properties": {
                "rows": {
                    "type": "array",
                    "items": { "type": "object", "properties": { "name": { "type": "string" } } }
                }
            }
        });
        let hints = json!({ "rows": { "fieldType": "table" } });
        let (mut renderer, _) = support::renderer(&schema, &hints);
        let values = drive(&mut renderer, "rows", edits);
        prop_assert!(len(&values, "rows") <= TABLE_MAX_ROWS);
    }
}
