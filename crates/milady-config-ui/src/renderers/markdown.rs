// crates/milady-config-ui/src/renderers/markdown.rs
// ============================================================================
// Module: Markdown Renderer
// Description: Markdown source editor with a safe preview.
// Purpose: Render markdown fields in edit or preview mode.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The edit mode forwards raw markdown. The preview mode parses a safe subset
//! into text-only blocks.

use serde_json::Value;

use super::common_edit;
use crate::markdown::parse_markdown;
use crate::node::Control;
use crate::node::MarkdownMode;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderProps;
use crate::props::FieldRenderer;
use crate::props::FieldUiState;

/// Default editor height.
const DEFAULT_MARKDOWN_ROWS: u32 = 8;

/// Markdown editor.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer;

impl FieldRenderer for MarkdownRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, ui: &FieldUiState) -> Control {
        let source = props.text_value();
        let preview = match ui.markdown_mode {
            MarkdownMode::Preview => parse_markdown(&source),
            MarkdownMode::Edit => Vec::new(),
        };
        Control::Markdown {
            mode: ui.markdown_mode,
            source,
            preview,
            rows: props.hint().rows.unwrap_or(DEFAULT_MARKDOWN_ROWS),
        }
    }

    fn apply(
        &self,
        _props: &FieldRenderProps<'_>,
        ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        match edit {
            FieldEdit::SetMode(mode) => {
                ui.markdown_mode = mode;
                EditOutcome::Unchanged
            }
            FieldEdit::SetText(text) => EditOutcome::Changed(Value::String(text)),
            other => common_edit(other),
        }
    }
}
