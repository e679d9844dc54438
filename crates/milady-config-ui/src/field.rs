// crates/milady-config-ui/src/field.rs
// ============================================================================
// Module: Config Field
// Description: Wrapper that frames a renderer's control with label and status.
// Purpose: Give every field the same id, label, help, and error layout.
// Dependencies: milady-config-core
// ============================================================================

//! ## Overview
//! [`render_field`] is the only place a [`FieldNode`] is assembled. It stamps
//! the stable element id `field-{pluginId}-{key}` used by the error summary,
//! copies the display metadata from the resolved field, and delegates the
//! control itself to the type's renderer.

use crate::node::FieldNode;
use crate::node::field_element_id;
use crate::props::FieldRenderProps;
use crate::props::FieldRenderer;
use crate::props::FieldUiState;

/// Renders one field through its renderer.
#[must_use]
pub fn render_field(
    props: &FieldRenderProps<'_>,
    renderer: &dyn FieldRenderer,
    ui: &FieldUiState,
) -> FieldNode {
    let field = props.field;
    FieldNode {
        id: field_element_id(props.plugin_id, &field.key),
        key: field.key.clone(),
        label: field.label.clone(),
        help: field.help.clone(),
        field_type: field.field_type,
        width: field.width,
        required: field.required,
        is_set: props.is_set,
        readonly: props.readonly,
        errors: props.errors.to_vec(),
        control: renderer.render(props, ui),
    }
}
