// crates/milady-config-ui/src/renderers/choice.rs
// ============================================================================
// Module: Choice Renderers
// Description: Select, combobox, radio, multiselect, and checkbox groups.
// Purpose: Render closed-option fields and keep selections inside the option set.
// Dependencies: serde_json, milady-config-core
// ============================================================================

//! ## Overview
//! Options come from `hint.options`, then schema `enum`/`oneOf`, then
//! `items.enum`. A select with [`SEARCHABLE_THRESHOLD`] or more options becomes
//! a searchable combobox; the search text is renderer-local and never reaches
//! the values map. Values are compared by display text so `1` and `"1"` pick
//! the same option, matching how option values round-trip through form inputs.

use milady_config_core::FieldOption;
use milady_config_core::schema::display_value;
use serde_json::Value;

use super::common_edit;
use crate::node::Control;
use crate::node::MultiStyle;
use crate::node::OptionView;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderProps;
use crate::props::FieldRenderer;
use crate::props::FieldUiState;

/// Option count at which a select becomes searchable.
pub const SEARCHABLE_THRESHOLD: usize = 5;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Finds the option whose value displays like `value`.
fn find_option<'a>(options: &'a [FieldOption], value: &Value) -> Option<&'a FieldOption> {
    let wanted = display_value(value);
    options.iter().find(|option| display_value(&option.value) == wanted)
}

/// Display texts of the current selection.
fn selected_set(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(display_value).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![display_value(other)],
    }
}

/// Builds option views with selection flags.
fn option_views(options: Vec<FieldOption>, selected: &[String]) -> Vec<OptionView> {
    options
        .into_iter()
        .map(|option| {
            let is_selected = selected.contains(&display_value(&option.value));
            OptionView {
                value: option.value,
                label: option.label,
                description: option.description,
                selected: is_selected,
            }
        })
        .collect()
}

/// Case-insensitive match on label or value.
fn matches_search(option: &OptionView, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    needle.is_empty()
        || option.label.to_lowercase().contains(&needle)
        || display_value(&option.value).to_lowercase().contains(&needle)
}

/// Applies a single-choice selection; values outside the option set are ignored.
fn select(props: &FieldRenderProps<'_>, value: &Value) -> EditOutcome {
    if value.is_null() {
        return EditOutcome::Changed(Value::Null);
    }
    find_option(&props.options(), value)
        .map_or(EditOutcome::Unchanged, |option| EditOutcome::Changed(option.value.clone()))
}

// ============================================================================
// SECTION: Select
// ============================================================================

/// Dropdown, or combobox once the option count reaches the threshold.
#[derive(Debug, Clone, Copy)]
pub struct SelectRenderer;

impl FieldRenderer for SelectRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, ui: &FieldUiState) -> Control {
        let options = option_views(props.options(), &selected_set(props.value));
        if options.len() >= SEARCHABLE_THRESHOLD {
            let total = options.len();
            let options =
                options.into_iter().filter(|option| matches_search(option, &ui.search)).collect();
            return Control::Combobox {
                search: ui.search.clone(),
                options,
                total,
            };
        }
        Control::Select {
            options,
            placeholder: props.hint().placeholder.clone(),
        }
    }

    fn apply(
        &self,
        props: &FieldRenderProps<'_>,
        ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        match edit {
            FieldEdit::Search(text) => {
                ui.search = text;
                EditOutcome::Unchanged
            }
            FieldEdit::Select(value) => {
                let outcome = select(props, &value);
                if matches!(outcome, EditOutcome::Changed(_)) {
                    ui.search.clear();
                }
                outcome
            }
            other => common_edit(other),
        }
    }
}

// ============================================================================
// SECTION: Radio
// ============================================================================

/// Radio group.
#[derive(Debug, Clone, Copy)]
pub struct RadioRenderer;

impl FieldRenderer for RadioRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, _ui: &FieldUiState) -> Control {
        Control::Radio {
            options: option_views(props.options(), &selected_set(props.value)),
        }
    }

    fn apply(
        &self,
        props: &FieldRenderProps<'_>,
        _ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        match edit {
            FieldEdit::Select(value) => select(props, &value),
            other => common_edit(other),
        }
    }
}

// ============================================================================
// SECTION: Multi-Choice
// ============================================================================

/// Multi-choice control: dropdown with chips or a checkbox list.
#[derive(Debug, Clone, Copy)]
pub struct MultiSelectRenderer {
    /// Presentation.
    style: MultiStyle,
}

impl MultiSelectRenderer {
    /// Creates a renderer with the given presentation.
    #[must_use]
    pub const fn new(style: MultiStyle) -> Self {
        Self {
            style,
        }
    }
}

impl FieldRenderer for MultiSelectRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, _ui: &FieldUiState) -> Control {
        Control::MultiSelect {
            style: self.style,
            options: option_views(props.options(), &selected_set(props.value)),
        }
    }

    fn apply(
        &self,
        props: &FieldRenderProps<'_>,
        _ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        match edit {
            FieldEdit::ToggleOption(value) => {
                let options = props.options();
                let Some(target) = find_option(&options, &value) else {
                    return EditOutcome::Unchanged;
                };
                let target = display_value(&target.value);
                let mut selected = selected_set(props.value);
                if let Some(position) = selected.iter().position(|item| *item == target) {
                    selected.remove(position);
                } else {
                    selected.push(target);
                }
                let next = options
                    .into_iter()
                    .filter(|option| selected.contains(&display_value(&option.value)))
                    .map(|option| option.value)
                    .collect();
                EditOutcome::Changed(Value::Array(next))
            }
            other => common_edit(other),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::panic,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap/panic for clarity."
    )]

    use serde_json::json;

    use super::MultiSelectRenderer;
    use super::SelectRenderer;
    use crate::node::Control;
    use crate::node::MultiStyle;
    use crate::props::EditOutcome;
    use crate::props::FieldEdit;
    use crate::props::FieldRenderer;
    use crate::props::FieldUiState;
    use crate::registry::standard_registry;
    use crate::renderers::testing::field;
    use crate::renderers::testing::props;

    #[test]
    fn combobox_filters_by_label_or_value() {
        let registry = standard_registry();
        let field = field(
            "model",
            json!({"type": "string", "enum": ["gpt-4o", "claude", "llama", "mistral", "qwen"]}),
            json!({}),
        );
        let mut ui = FieldUiState::default();
        let props = props(&field, None, &registry);
        let outcome = SelectRenderer.apply(&props, &mut ui, FieldEdit::Search("CLA".to_string()));
        assert_eq!(outcome, EditOutcome::Unchanged);
        let Control::Combobox {
            options,
            total,
            ..
        } = SelectRenderer.render(&props, &ui)
        else {
            panic!("expected combobox");
        };
        assert_eq!(total, 5);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value, json!("claude"));
    }

    #[test]
    fn select_ignores_values_outside_the_options() {
        let registry = standard_registry();
        let field = field("mode", json!({"enum": ["local", "cloud"]}), json!({}));
        let props = props(&field, None, &registry);
        let mut ui = FieldUiState::default();
        assert_eq!(
            SelectRenderer.apply(&props, &mut ui, FieldEdit::Select(json!("remote"))),
            EditOutcome::Unchanged
        );
        assert_eq!(
            SelectRenderer.apply(&props, &mut ui, FieldEdit::Select(json!("cloud"))),
            EditOutcome::Changed(json!("cloud"))
        );
    }

    #[test]
    fn multiselect_toggles_in_option_order() {
        let registry = standard_registry();
        let field = field(
            "tools",
            json!({"type": "array", "items": {"enum": ["search", "shell", "browser"]}}),
            json!({}),
        );
        let renderer = MultiSelectRenderer::new(MultiStyle::Checkboxes);
        let current = json!(["browser"]);
        let props = props(&field, Some(&current), &registry);
        let mut ui = FieldUiState::default();
        let outcome = renderer.apply(&props, &mut ui, FieldEdit::ToggleOption(json!("search")));
        assert_eq!(outcome, EditOutcome::Changed(json!(["search", "browser"])));
        let outcome = renderer.apply(&props, &mut ui, FieldEdit::ToggleOption(json!("browser")));
        assert_eq!(outcome, EditOutcome::Changed(json!([])));
    }
}
