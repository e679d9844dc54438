// crates/milady-config-ui/src/renderers/password.rs
// ============================================================================
// Module: Password Renderer
// Description: Masked secret input with optional host reveal.
// Purpose: Keep stored secrets out of the view tree until explicitly shown.
// Dependencies: serde_json, milady-config-core
// ============================================================================

//! ## Overview
//! Secrets render masked. The control carries no text while masked; after the
//! user unmasks, it shows either the value fetched by a reveal or the value the
//! user typed. Typing a new secret discards any previously revealed value.

use milady_config_core::is_empty_value;
use serde_json::Value;

use super::common_edit;
use crate::node::Control;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderProps;
use crate::props::FieldRenderer;
use crate::props::FieldUiState;

/// Masked secret input.
#[derive(Debug, Clone, Copy)]
pub struct PasswordRenderer;

impl FieldRenderer for PasswordRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, ui: &FieldUiState) -> Control {
        let masked = !ui.unmasked;
        let text = if masked {
            None
        } else {
            ui.revealed.clone().or_else(|| props.value.map(|_| props.text_value()))
        };
        Control::Password {
            masked,
            text,
            has_value: props.is_set || !is_empty_value(props.value) || ui.revealed.is_some(),
            can_reveal: props.can_reveal && props.is_set,
            placeholder: props.hint().placeholder.clone(),
        }
    }

    fn apply(
        &self,
        _props: &FieldRenderProps<'_>,
        ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        match edit {
            FieldEdit::SetText(text) => {
                ui.revealed = None;
                EditOutcome::Changed(Value::String(text))
            }
            FieldEdit::ToggleMask => {
                ui.unmasked = !ui.unmasked;
                EditOutcome::Unchanged
            }
            other => {
                ui.revealed = None;
                common_edit(other)
            }
        }
    }
}
