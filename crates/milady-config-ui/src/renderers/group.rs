// crates/milady-config-ui/src/renderers/group.rs
// ============================================================================
// Module: Group Renderer
// Description: Nested object editor built from the property's own schema.
// Purpose: Render child fields recursively through the same registry.
// Dependencies: serde_json, milady-config-core
// ============================================================================

//! ## Overview
//! A group resolves its children from `properties`/`required` of the nested
//! schema, evaluates their visibility against the group's own object, and
//! renders each child through the field wrapper. Child element ids are scoped
//! by the parent key so they stay unique in the page.
//!
//! Child edits arrive as [`FieldEdit::Nested`]. The child renderer produces the
//! child's next value and the group reports the whole updated object.

use milady_config_core::ConfigValues;
use milady_config_core::ResolvedField;
use milady_config_core::UiHints;
use milady_config_core::fields::nested_schema;
use milady_config_core::is_empty_value;
use milady_config_core::resolve_fields;
use milady_config_core::validate_field;
use serde_json::Value;

use super::common_edit;
use crate::field::render_field;
use crate::node::Control;
use crate::node::RenderNode;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderProps;
use crate::props::FieldRenderer;
use crate::props::FieldUiState;

/// Nested object editor.
#[derive(Debug, Clone, Copy)]
pub struct GroupRenderer;

/// Resolves the group's children.
fn children(props: &FieldRenderProps<'_>) -> Vec<ResolvedField> {
    let schema = nested_schema(props.schema());
    resolve_fields(&schema, &UiHints::default(), props.registry.catalog())
}

/// The group's current object; non-objects read as empty.
fn object(value: Option<&Value>) -> ConfigValues {
    match value {
        Some(Value::Object(map)) => map.clone(),
        _ => ConfigValues::new(),
    }
}

/// Element-id scope for the children.
fn child_scope(props: &FieldRenderProps<'_>) -> String {
    format!("{}-{}", props.plugin_id, props.key())
}

impl FieldRenderer for GroupRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, ui: &FieldUiState) -> Control {
        let values = object(props.value);
        let scope = child_scope(props);
        let default_ui = FieldUiState::default();
        let nodes = children(props)
            .iter()
            .filter(|child| child.is_visible(&values))
            .map(|child| {
                let value = values.get(&child.key);
                let errors = if is_empty_value(value) {
                    Vec::new()
                } else {
                    validate_field(
                        child,
                        &values,
                        props.registry.catalog(),
                        props.registry.validation_functions(),
                    )
                    .errors
                };
                let child_props = FieldRenderProps {
                    plugin_id: &scope,
                    field: child,
                    value,
                    is_set: false,
                    errors: &errors,
                    readonly: props.readonly || child.readonly,
                    can_reveal: false,
                    registry: props.registry,
                };
                let child_ui = ui.nested.get(&child.key).unwrap_or(&default_ui);
                let renderer = props.registry.renderer(child.field_type);
                RenderNode::Field(Box::new(render_field(&child_props, renderer, child_ui)))
            })
            .collect();
        Control::Group {
            children: nodes,
        }
    }

    fn apply(
        &self,
        props: &FieldRenderProps<'_>,
        ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        let FieldEdit::Nested {
            key,
            edit,
        } = edit
        else {
            return common_edit(edit);
        };
        let mut values = object(props.value);
        let fields = children(props);
        let Some(child) = fields.iter().find(|child| child.key == key) else {
            return EditOutcome::Unchanged;
        };
        let readonly = props.readonly || child.readonly;
        if readonly && !edit.is_ui_only() {
            return EditOutcome::Unchanged;
        }
        let scope = child_scope(props);
        let child_props = FieldRenderProps {
            plugin_id: &scope,
            field: child,
            value: values.get(&key),
            is_set: false,
            errors: &[],
            readonly,
            can_reveal: false,
            registry: props.registry,
        };
        let renderer = props.registry.renderer(child.field_type);
        let child_ui = ui.nested.entry(key.clone()).or_default();
        match renderer.apply(&child_props, child_ui, *edit) {
            EditOutcome::Changed(next) => {
                if next.is_null() {
                    values.remove(&key);
                } else {
                    values.insert(key, next);
                }
                EditOutcome::Changed(Value::Object(values))
            }
            EditOutcome::Unchanged => EditOutcome::Unchanged,
        }
    }
}
