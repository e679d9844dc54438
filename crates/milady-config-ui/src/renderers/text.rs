// crates/milady-config-ui/src/renderers/text.rs
// ============================================================================
// Module: Text Renderers
// Description: Single-line and multi-line text inputs.
// Purpose: Render text, url, email, date, datetime, color, and textarea fields.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Text-like inputs forward the typed text to `onChange` on every edit. Format
//! checks (URL shape, date parsing) belong to the catalog validators, not here.

use serde_json::Value;

use super::common_edit;
use crate::node::Control;
use crate::node::InputKind;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderProps;
use crate::props::FieldRenderer;
use crate::props::FieldUiState;

/// Default textarea height.
const DEFAULT_TEXTAREA_ROWS: u32 = 4;

/// Single-line input of a given flavor.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    /// Input flavor.
    kind: InputKind,
}

impl TextRenderer {
    /// Creates a renderer for the flavor.
    #[must_use]
    pub const fn new(kind: InputKind) -> Self {
        Self {
            kind,
        }
    }
}

impl FieldRenderer for TextRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, _ui: &FieldUiState) -> Control {
        Control::TextInput {
            kind: self.kind,
            value: props.text_value(),
            placeholder: props.hint().placeholder.clone(),
        }
    }

    fn apply(
        &self,
        _props: &FieldRenderProps<'_>,
        _ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        match edit {
            FieldEdit::SetText(text) => EditOutcome::Changed(Value::String(text)),
            other => common_edit(other),
        }
    }
}

/// Multi-line text input.
#[derive(Debug, Clone, Copy)]
pub struct TextAreaRenderer;

impl FieldRenderer for TextAreaRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, _ui: &FieldUiState) -> Control {
        Control::TextArea {
            value: props.text_value(),
            rows: props.hint().rows.unwrap_or(DEFAULT_TEXTAREA_ROWS),
            placeholder: props.hint().placeholder.clone(),
        }
    }

    fn apply(
        &self,
        _props: &FieldRenderProps<'_>,
        _ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        match edit {
            FieldEdit::SetText(text) => EditOutcome::Changed(Value::String(text)),
            other => common_edit(other),
        }
    }
}
