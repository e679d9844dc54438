// crates/milady-config-ui/src/renderers/custom.rs
// ============================================================================
// Module: Custom Renderer
// Description: Placeholder for host-provided components.
// Purpose: Pass the value through untouched to a component named by the hint.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Hosts that ship their own widget register a renderer for
//! [`milady_config_core::FieldType::Custom`]. Without one, this renderer emits
//! a placeholder naming `hint.component` and accepts wholesale replacements.

use serde_json::Value;

use super::common_edit;
use crate::node::Control;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderProps;
use crate::props::FieldRenderer;
use crate::props::FieldUiState;

/// Host component placeholder.
#[derive(Debug, Clone, Copy)]
pub struct CustomRenderer;

impl FieldRenderer for CustomRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, _ui: &FieldUiState) -> Control {
        Control::Custom {
            component: props.hint().component.clone(),
            value: props.value.cloned().unwrap_or(Value::Null),
        }
    }

    fn apply(
        &self,
        _props: &FieldRenderProps<'_>,
        _ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        common_edit(edit)
    }
}
