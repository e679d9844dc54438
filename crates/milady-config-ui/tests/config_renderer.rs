// crates/milady-config-ui/tests/config_renderer.rs
// ============================================================================
// Module: Config Renderer Tests
// Description: Host-level scenarios for rendering, editing, and validation.
// Purpose: Exercise the orchestrator the way a settings view drives it.
// ============================================================================
//! ## Overview
//! Integration tests for the config renderer: empty states, layout, the
//! validation pipeline, and renderer-specific edit contracts.

mod support;

use milady_config_core::ConfigValues;
use milady_config_core::EventKind;
use milady_config_core::FieldType;
use milady_config_core::SetKeys;
use milady_config_ui::Control;
use milady_config_ui::FieldEdit;
use milady_config_ui::RenderNode;
use serde_json::Value;
use serde_json::json;
use support::TestResult;
use support::ensure;
use support::field_nodes;
use support::form_children;
use support::renderer;
use support::values;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Schema with one required secret.
fn api_key_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "apiKey": { "type": "string" } },
        "required": ["apiKey"]
    })
}

/// Schema with a select of `count` options.
fn select_schema(count: usize) -> Value {
    let options: Vec<Value> = (0 .. count).map(|index| json!(format!("option-{index}"))).collect();
    json!({
        "type": "object",
        "properties": { "model": { "type": "string", "enum": options } }
    })
}

// ============================================================================
// SECTION: Empty States
// ============================================================================

#[test]
fn missing_schema_renders_empty_state() -> TestResult {
    let (renderer, sink) = renderer(&Value::Null, &Value::Null);
    let node = renderer.render(&values(&json!({}))?, &SetKeys::new());
    ensure(matches!(node, RenderNode::EmptyState { .. }), "expected empty state")?;
    ensure(sink.events().is_empty(), "null schema is not malformed")?;
    Ok(())
}

#[test]
fn malformed_schema_is_reported_and_renders_empty_state() -> TestResult {
    let (renderer, sink) = renderer(&json!("not a schema"), &Value::Null);
    let node = renderer.render(&values(&json!({}))?, &SetKeys::new());
    ensure(matches!(node, RenderNode::EmptyState { .. }), "expected empty state")?;
    ensure(sink.kinds() == vec![EventKind::MalformedSchema], "expected malformed_schema")?;
    Ok(())
}

#[test]
fn malformed_hint_degrades_to_defaults() -> TestResult {
    let (renderer, sink) = renderer(&api_key_schema(), &json!({ "apiKey": { "order": "first" } }));
    let field = renderer.field("apiKey").ok_or("apiKey missing")?;
    ensure(field.order == 999, "expected default order")?;
    ensure(field.field_type == FieldType::Text, "expected default text type")?;
    ensure(sink.kinds() == vec![EventKind::MalformedHint], "expected malformed_hint")?;
    Ok(())
}

#[test]
fn malformed_properties_keep_the_rest_of_the_form() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": {
            "apiKey": { "type": "string" },
            "proxy": { "type": ["string", "null"] },
            "port": { "type": "integer", "minimum": "1", "maximum": 65535 },
            "servers": { "type": "array", "items": [{ "type": "string" }] }
        }
    });
    let (renderer, sink) = renderer(&schema, &Value::Null);
    let node = renderer.render(&values(&json!({}))?, &SetKeys::new());
    let keys: Vec<&str> = field_nodes(&node).iter().map(|field| field.key.as_str()).collect();
    ensure(keys == ["apiKey", "proxy", "port", "servers"], "every property rendered")?;
    let proxy = renderer.field("proxy").ok_or("proxy missing")?;
    ensure(proxy.field_type == FieldType::Text, "nullable string renders as text")?;
    let port = renderer.field("port").ok_or("port missing")?;
    ensure(port.field_type == FieldType::Number, "port keeps its type")?;
    let flagged: Vec<Option<String>> = sink
        .events()
        .into_iter()
        .filter(|event| event.kind == EventKind::MalformedSchema)
        .map(|event| event.field)
        .collect();
    ensure(
        flagged == [Some("port".to_string()), Some("servers".to_string())],
        "each malformed property reported with its key",
    )?;
    Ok(())
}

#[test]
fn malformed_hint_keys_keep_masking_and_exclusion() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": { "apiKey": { "type": "string" }, "internal": { "type": "string" } }
    });
    let hints = json!({
        "apiKey": { "sensitive": true, "order": "1" },
        "internal": { "hidden": true, "width": 3 }
    });
    let (renderer, sink) = renderer(&schema, &hints);
    let current = values(&json!({ "apiKey": "sk-live-secret", "internal": "x" }))?;
    let node = renderer.render(&current, &SetKeys::new());
    let fields = field_nodes(&node);
    ensure(fields.len() == 1 && fields[0].key == "apiKey", "hidden field stays excluded")?;
    ensure(
        matches!(fields[0].control, Control::Password { masked: true, text: None, .. }),
        "secret stays masked",
    )?;
    ensure(!serde_json::to_string(&node)?.contains("sk-live-secret"), "secret not in output")?;
    ensure(
        sink.kinds() == vec![EventKind::MalformedHint, EventKind::MalformedHint],
        "one event per dropped key",
    )?;
    Ok(())
}

#[test]
fn reloading_identical_documents_is_memoized() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": { "x": { "type": "string" }, "y": { "type": "string" } }
    });
    let hints = json!({ "x": { "hidden": true }, "y": { "hidden": true } });
    let (mut renderer, sink) = renderer(&schema, &hints);
    renderer.load_documents(&schema, &hints);
    ensure(renderer.fields().is_empty(), "all fields excluded")?;
    ensure(sink.events().is_empty(), "nothing reported")?;

    let typed = json!({ "x": { "fieldType": "hologram" } });
    renderer.load_documents(&schema, &typed);
    renderer.load_documents(&schema, &typed);
    ensure(sink.kinds() == vec![EventKind::UnknownFieldType], "fallback reported once")?;
    Ok(())
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn required_secret_blocks_save_until_set() -> TestResult {
    let hints = json!({ "apiKey": { "sensitive": true } });
    let (mut renderer, _) = renderer(&api_key_schema(), &hints);
    let empty = values(&json!({}))?;
    let field = renderer.field("apiKey").ok_or("apiKey missing")?;
    ensure(field.field_type == FieldType::Password, "expected password")?;
    ensure(field.required, "expected required")?;
    ensure(!renderer.validate_all(&empty), "validate_all should fail")?;
    ensure(
        renderer.errors_for("apiKey") == ["This field is required.".to_string()],
        "expected required message",
    )?;
    let node = renderer.render(&empty, &SetKeys::new());
    let fields = field_nodes(&node);
    ensure(fields.len() == 1 && !fields[0].is_set, "expected unset secret field")?;
    ensure(renderer.validate_all(&values(&json!({ "apiKey": "sk-1" }))?), "set key is valid")?;
    ensure(renderer.field_errors().is_empty(), "error map should be cleared")?;
    Ok(())
}

#[test]
fn edits_revalidate_only_the_edited_field() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "port": { "type": "integer", "minimum": 1 }
        },
        "required": ["name", "port"]
    });
    let (mut renderer, _) = renderer(&schema, &Value::Null);
    let current = values(&json!({}))?;
    let mut changes = Vec::new();
    let result = renderer.handle_edit(
        "port",
        FieldEdit::SetText("0".to_string()),
        &current,
        &SetKeys::new(),
        |key, value| changes.push((key.to_string(), value.clone())),
    );
    ensure(result.changed == Some(json!(0)), "expected numeric change")?;
    ensure(changes == vec![("port".to_string(), json!(0))], "on_change not called once")?;
    ensure(renderer.errors_for("port") == ["Must be at least 1.".to_string()], "range error")?;
    ensure(renderer.errors_for("name").is_empty(), "untouched field was validated")?;
    Ok(())
}

#[test]
fn readonly_fields_ignore_value_edits() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": { "id": { "type": "string", "readOnly": true } }
    });
    let (mut renderer, _) = renderer(&schema, &Value::Null);
    let mut called = false;
    let result = renderer.handle_edit(
        "id",
        FieldEdit::SetText("changed".to_string()),
        &values(&json!({ "id": "fixed" }))?,
        &SetKeys::new(),
        |_, _| called = true,
    );
    ensure(result.changed.is_none() && !called, "readonly field changed")?;
    Ok(())
}

// ============================================================================
// SECTION: Visibility
// ============================================================================

#[test]
fn mode_switch_shows_cloud_fields_on_next_evaluation() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": { "mode": { "type": "string" }, "region": { "type": "string" } }
    });
    let hints = json!({
        "region": { "visible": { "and": [{ "equals": { "path": "mode" }, "value": "cloud" }] } }
    });
    let (renderer, _) = renderer(&schema, &hints);
    let local = values(&json!({ "mode": "local" }))?;
    let cloud = values(&json!({ "mode": "cloud" }))?;
    let keys = |values: &ConfigValues| -> Vec<String> {
        renderer.visible_fields(values).iter().map(|field| field.key.clone()).collect()
    };
    ensure(keys(&local) == vec!["mode".to_string()], "region visible in local mode")?;
    ensure(keys(&cloud) == vec!["mode".to_string(), "region".to_string()], "region hidden")?;
    Ok(())
}

#[test]
fn hidden_fields_never_render() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": { "a": { "type": "string" }, "secret": { "type": "string" } }
    });
    let (renderer, _) = renderer(&schema, &json!({ "secret": { "hidden": true } }));
    let node = renderer.render(&values(&json!({ "secret": "x" }))?, &SetKeys::new());
    ensure(field_nodes(&node).iter().all(|field| field.key != "secret"), "hidden rendered")?;
    Ok(())
}

// ============================================================================
// SECTION: Layout
// ============================================================================

#[test]
fn required_unconfigured_fields_sort_first() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": {
            "alpha": { "type": "string" },
            "beta": { "type": "string" },
            "gamma": { "type": "string" }
        },
        "required": ["gamma"]
    });
    let hints = json!({ "alpha": { "order": 1 }, "beta": { "order": 2 } });
    let (renderer, _) = renderer(&schema, &hints);
    let node = renderer.render(&values(&json!({}))?, &SetKeys::new());
    let order: Vec<&str> = field_nodes(&node).iter().map(|field| field.key.as_str()).collect();
    ensure(order == vec!["gamma", "alpha", "beta"], "unexpected order")?;
    let mut set = SetKeys::new();
    set.insert("gamma".to_string());
    let node = renderer.render(&values(&json!({}))?, &set);
    let order: Vec<&str> = field_nodes(&node).iter().map(|field| field.key.as_str()).collect();
    ensure(order == vec!["alpha", "beta", "gamma"], "configured field should sort by order")?;
    Ok(())
}

#[test]
fn group_headers_appear_only_with_multiple_groups() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": { "a": { "type": "string" }, "b": { "type": "string" } }
    });
    let (flat, _) = renderer(&schema, &Value::Null);
    let node = flat.render(&values(&json!({}))?, &SetKeys::new());
    let children = form_children(&node)?;
    ensure(children.iter().all(|child| matches!(child, RenderNode::Field(_))), "headers shown")?;

    let (grouped, _) = renderer(&schema, &json!({ "b": { "group": "Network" } }));
    let node = grouped.render(&values(&json!({}))?, &SetKeys::new());
    let names: Vec<&str> = form_children(&node)?
        .iter()
        .filter_map(|child| match child {
            RenderNode::Group {
                name, ..
            } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    ensure(names == vec!["General", "Network"], "expected two group headers")?;
    Ok(())
}

#[test]
fn advanced_fields_collapse_until_toggled() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": { "a": { "type": "string" }, "debug": { "type": "boolean" } }
    });
    let (mut renderer, _) = renderer(&schema, &json!({ "debug": { "advanced": true } }));
    let empty = values(&json!({}))?;
    let node = renderer.render(&empty, &SetKeys::new());
    ensure(field_nodes(&node).len() == 1, "advanced field rendered while closed")?;
    ensure(
        form_children(&node)?.iter().any(|child| matches!(
            child,
            RenderNode::Disclosure { count: 1, open: false, .. }
        )),
        "expected closed disclosure",
    )?;
    renderer.toggle_advanced();
    let node = renderer.render(&empty, &SetKeys::new());
    ensure(field_nodes(&node).len() == 2, "advanced field hidden while open")?;
    Ok(())
}

#[test]
fn progress_and_summary_track_required_fields() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": { "a": { "type": "string" }, "b": { "type": "string" } },
        "required": ["a", "b"]
    });
    let (mut renderer, _) = renderer(&schema, &Value::Null);
    let partial = values(&json!({ "a": "set" }))?;
    ensure(!renderer.validate_all(&partial), "b is missing")?;
    let node = renderer.render(&partial, &SetKeys::new());
    let children = form_children(&node)?;
    ensure(
        matches!(children.first(), Some(RenderNode::ProgressBar { configured: 1, total: 2 })),
        "expected progress 1/2",
    )?;
    let summary = children.iter().find_map(|child| match child {
        RenderNode::ErrorSummary {
            entries,
        } => Some(entries),
        _ => None,
    });
    let entries = summary.ok_or("expected error summary")?;
    ensure(entries.len() == 1 && entries[0].target_id == "field-demo-b", "bad summary target")?;

    let complete = values(&json!({ "a": "set", "b": "set" }))?;
    ensure(renderer.progress(&complete, &SetKeys::new()).is_none(), "progress when complete")?;
    Ok(())
}

#[test]
fn unknown_field_type_falls_back_to_text() -> TestResult {
    let schema = json!({ "type": "object", "properties": { "x": { "type": "string" } } });
    let (renderer, sink) = renderer(&schema, &json!({ "x": { "fieldType": "hologram" } }));
    let node = renderer.render(&values(&json!({}))?, &SetKeys::new());
    let fields = field_nodes(&node);
    ensure(matches!(fields[0].control, Control::TextInput { .. }), "expected text input")?;
    ensure(sink.kinds() == vec![EventKind::UnknownFieldType], "expected unknown_field_type")?;
    Ok(())
}

// ============================================================================
// SECTION: Renderer Contracts
// ============================================================================

#[test]
fn select_becomes_searchable_at_five_options() -> TestResult {
    let empty = values(&json!({}))?;
    let (five, _) = renderer(&select_schema(5), &Value::Null);
    let node = five.render(&empty, &SetKeys::new());
    ensure(matches!(field_nodes(&node)[0].control, Control::Combobox { .. }), "5 -> combobox")?;
    let (four, _) = renderer(&select_schema(4), &Value::Null);
    let node = four.render(&empty, &SetKeys::new());
    ensure(matches!(field_nodes(&node)[0].control, Control::Select { .. }), "4 -> select")?;
    Ok(())
}

#[test]
fn json_blur_commits_valid_and_rejects_unsafe_documents() -> TestResult {
    let schema = json!({ "type": "object", "properties": { "extra": { "type": "string" } } });
    let (mut renderer, _) = renderer(&schema, &json!({ "extra": { "fieldType": "json" } }));
    let mut current = values(&json!({}))?;
    let keys = SetKeys::new();
    let mut changes: Vec<Value> = Vec::new();

    let _ = renderer.handle_edit(
        "extra",
        FieldEdit::SetText("{\"a\":1}".to_string()),
        &current,
        &keys,
        |_, value| changes.push(value.clone()),
    );
    ensure(changes.is_empty(), "typing emitted a change")?;
    let _ = renderer.handle_edit("extra", FieldEdit::Blur, &current, &keys, |_, value| {
        changes.push(value.clone());
    });
    ensure(changes == vec![json!("{\"a\":1}")], "valid JSON not forwarded")?;
    ensure(renderer.errors_for("extra").is_empty(), "valid JSON reported errors")?;
    current.insert("extra".to_string(), json!("{\"a\":1}"));

    let _ = renderer.handle_edit(
        "extra",
        FieldEdit::SetText("{\"__proto__\":1}".to_string()),
        &current,
        &keys,
        |_, value| changes.push(value.clone()),
    );
    let _ = renderer.handle_edit("extra", FieldEdit::Blur, &current, &keys, |_, value| {
        changes.push(value.clone());
    });
    ensure(changes.len() == 1, "unsafe JSON was forwarded")?;
    let error = renderer.ui_state("extra").and_then(|ui| ui.json_error.clone());
    ensure(error.is_some_and(|error| error.starts_with("Unsafe JSON")), "missing unsafe error")?;
    Ok(())
}

#[test]
fn group_fields_edit_nested_objects() -> TestResult {
    let schema = json!({
        "type": "object",
        "properties": {
            "proxy": {
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer", "maximum": 65535 }
                },
                "required": ["host"]
            }
        }
    });
    let (mut renderer, _) = renderer(&schema, &Value::Null);
    let current = values(&json!({ "proxy": { "host": "localhost" } }))?;
    let edit = FieldEdit::Nested {
        key: "port".to_string(),
        edit: Box::new(FieldEdit::SetText("70000".to_string())),
    };
    let result = renderer.handle_edit("proxy", edit, &current, &SetKeys::new(), |_, _| {});
    let next = result.changed.ok_or("group edit produced no change")?;
    ensure(next == json!({ "host": "localhost", "port": 70000 }), "unexpected nested object")?;

    let updated = values(&json!({ "proxy": next }))?;
    let node = renderer.render(&updated, &SetKeys::new());
    let fields = field_nodes(&node);
    let Control::Group {
        children,
    } = &fields[0].control
    else {
        return Err("expected group control".into());
    };
    let port = children.iter().find_map(|child| match child {
        RenderNode::Field(field) if field.key == "port" => Some(field),
        _ => None,
    });
    let port = port.ok_or("port child missing")?;
    ensure(port.id == "field-demo-proxy-port", "child id not scoped")?;
    ensure(port.errors == vec!["Must be at most 65535.".to_string()], "child errors missing")?;
    Ok(())
}
