// crates/milady-config-ui/src/renderers/json.rs
// ============================================================================
// Module: JSON Renderer
// Description: Free-form JSON editor committed on blur.
// Purpose: Accept structured values while rejecting malformed or unsafe input.
// Dependencies: serde_json, milady-config-core
// ============================================================================

//! ## Overview
//! Typing only updates a local draft. On blur the draft is parsed; parse errors
//! and documents containing prototype-polluting keys stay local and are shown
//! under the editor. Successful commits emit the parsed value for object and
//! array schemas and the normalized text otherwise.

use milady_config_core::SchemaType;
use serde_json::Value;

use super::common_edit;
use crate::node::Control;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderProps;
use crate::props::FieldRenderer;
use crate::props::FieldUiState;

/// Keys refused anywhere in a committed document.
pub const UNSAFE_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// JSON editor.
#[derive(Debug, Clone, Copy)]
pub struct JsonRenderer;

/// Returns the first unsafe key found at any depth.
#[must_use]
pub fn find_unsafe_key(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map.iter().find_map(|(key, child)| {
            if UNSAFE_KEYS.contains(&key.as_str()) {
                Some(key.as_str())
            } else {
                find_unsafe_key(child)
            }
        }),
        Value::Array(items) => items.iter().find_map(find_unsafe_key),
        _ => None,
    }
}

/// Text shown in the editor when no draft is pending.
fn committed_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

impl FieldRenderer for JsonRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, ui: &FieldUiState) -> Control {
        Control::Json {
            draft: ui.json_draft.clone().unwrap_or_else(|| committed_text(props.value)),
            error: ui.json_error.clone(),
        }
    }

    fn apply(
        &self,
        props: &FieldRenderProps<'_>,
        ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        match edit {
            FieldEdit::SetText(text) => {
                ui.json_draft = Some(text);
                ui.json_error = None;
                EditOutcome::Unchanged
            }
            FieldEdit::Blur => {
                let Some(draft) = ui.json_draft.clone() else {
                    return EditOutcome::Unchanged;
                };
                if draft.trim().is_empty() {
                    ui.json_draft = None;
                    ui.json_error = None;
                    return EditOutcome::Changed(Value::Null);
                }
                let parsed = match serde_json::from_str::<Value>(&draft) {
                    Ok(parsed) => parsed,
                    Err(err) => {
                        ui.json_error = Some(format!("Invalid JSON: {err}"));
                        return EditOutcome::Unchanged;
                    }
                };
                if let Some(key) = find_unsafe_key(&parsed) {
                    ui.json_error = Some(format!("Unsafe JSON: key \"{key}\" is not allowed."));
                    return EditOutcome::Unchanged;
                }
                ui.json_draft = None;
                ui.json_error = None;
                let structured =
                    matches!(props.schema().kind, Some(SchemaType::Object | SchemaType::Array));
                if structured {
                    EditOutcome::Changed(parsed)
                } else {
                    EditOutcome::Changed(Value::String(draft))
                }
            }
            other => {
                ui.json_draft = None;
                ui.json_error = None;
                common_edit(other)
            }
        }
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

    use super::JsonRenderer;
    use super::find_unsafe_key;
    use crate::props::EditOutcome;
    use crate::props::FieldEdit;
    use crate::props::FieldRenderer;
    use crate::props::FieldUiState;
    use crate::registry::standard_registry;
    use crate::renderers::testing::field;
    use crate::renderers::testing::props;

    #[test]
    fn typing_never_emits_until_blur() {
        let registry = standard_registry();
        let field = field("extra", json!({"type": "string"}), json!({"fieldType": "json"}));
        let props = props(&field, None, &registry);
        let mut ui = FieldUiState::default();
        let typed = FieldEdit::SetText("{\"a\":1}".to_string());
        assert_eq!(JsonRenderer.apply(&props, &mut ui, typed), EditOutcome::Unchanged);
        assert_eq!(
            JsonRenderer.apply(&props, &mut ui, FieldEdit::Blur),
            EditOutcome::Changed(json!("{\"a\":1}"))
        );
        assert_eq!(ui.json_error, None);
    }

    #[test]
    fn syntax_errors_stay_local() {
        let registry = standard_registry();
        let field = field("extra", json!({"type": "object"}), json!({"fieldType": "json"}));
        let previous = json!({"ok": true});
        let props = props(&field, Some(&previous), &registry);
        let mut ui = FieldUiState::default();
        let _ = JsonRenderer.apply(&props, &mut ui, FieldEdit::SetText("{oops".to_string()));
        assert_eq!(JsonRenderer.apply(&props, &mut ui, FieldEdit::Blur), EditOutcome::Unchanged);
        assert!(ui.json_error.as_deref().is_some_and(|error| error.starts_with("Invalid JSON")));
        assert_eq!(ui.json_draft.as_deref(), Some("{oops"));
    }

    #[test]
    fn nested_unsafe_keys_are_found() {
        assert_eq!(find_unsafe_key(&json!({"a": [{"constructor": 1}]})), Some("constructor"));
        assert_eq!(find_unsafe_key(&json!({"proto": {"x": 1}})), None);
    }
}
