// crates/milady-config-ui/src/renderers/boolean.rs
// ============================================================================
// Module: Boolean Renderer
// Description: On/off switch.
// Purpose: Render boolean fields, falling back to the schema default.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Boolean fields render as a switch. A missing value shows the schema default
//! without writing it back.

use serde_json::Value;

use super::common_edit;
use crate::node::Control;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderProps;
use crate::props::FieldRenderer;
use crate::props::FieldUiState;

/// On/off switch.
#[derive(Debug, Clone, Copy)]
pub struct BooleanRenderer;

/// Current state: the value, else the schema default, else off.
fn current(props: &FieldRenderProps<'_>) -> bool {
    props
        .value
        .and_then(Value::as_bool)
        .or_else(|| props.schema().default.as_ref().and_then(Value::as_bool))
        .unwrap_or(false)
}

impl FieldRenderer for BooleanRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, _ui: &FieldUiState) -> Control {
        Control::Toggle {
            on: current(props),
        }
    }

    fn apply(
        &self,
        props: &FieldRenderProps<'_>,
        _ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        match edit {
            FieldEdit::SetBool(on) => EditOutcome::Changed(Value::Bool(on)),
            FieldEdit::Toggle => EditOutcome::Changed(Value::Bool(!current(props))),
            other => common_edit(other),
        }
    }
}
