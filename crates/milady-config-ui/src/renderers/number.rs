// crates/milady-config-ui/src/renderers/number.rs
// ============================================================================
// Module: Number Renderer
// Description: Numeric input with a clamped stepper.
// Purpose: Render number fields honoring min, max, step, and unit hints.
// Dependencies: serde_json, milady-config-core
// ============================================================================

//! ## Overview
//! Typed text is forwarded as a number when it parses and as raw text when it
//! does not, so the catalog validator can report "Must be a number." Stepper
//! edits clamp into `[min, max]`; typed values are not clamped.

use milady_config_core::SchemaType;
use milady_config_core::catalog::numeric_value;
use serde_json::Value;

use super::common_edit;
use super::number_value;
use crate::node::Control;
use crate::props::EditOutcome;
use crate::props::FieldEdit;
use crate::props::FieldRenderProps;
use crate::props::FieldRenderer;
use crate::props::FieldUiState;

/// Stepper increment when the hint declares none.
const DEFAULT_STEP: f64 = 1.0;

/// Numeric input with stepper.
#[derive(Debug, Clone, Copy)]
pub struct NumberRenderer;

/// Effective bounds and step for a field.
struct Bounds {
    /// Minimum.
    min: Option<f64>,
    /// Maximum.
    max: Option<f64>,
    /// Step.
    step: f64,
    /// Integer schema.
    integer: bool,
}

impl Bounds {
    /// Reads bounds from hint (preferred) and schema.
    fn of(props: &FieldRenderProps<'_>) -> Self {
        let hint = props.hint();
        let schema = props.schema();
        Self {
            min: hint.min.or(schema.minimum),
            max: hint.max.or(schema.maximum),
            step: hint.step.filter(|step| step.is_finite() && *step > 0.0).unwrap_or(DEFAULT_STEP),
            integer: schema.kind == Some(SchemaType::Integer),
        }
    }

    /// Clamps and, for integer schemas, rounds.
    fn clamp(&self, number: f64) -> f64 {
        let mut number = if self.integer { number.round() } else { number };
        if let Some(min) = self.min {
            number = number.max(min);
        }
        if let Some(max) = self.max {
            number = number.min(max);
        }
        number
    }
}

impl FieldRenderer for NumberRenderer {
    fn render(&self, props: &FieldRenderProps<'_>, _ui: &FieldUiState) -> Control {
        let bounds = Bounds::of(props);
        Control::Number {
            value: props.value.and_then(numeric_value),
            text: props.text_value(),
            min: bounds.min,
            max: bounds.max,
            step: bounds.step,
            unit: props.hint().unit.clone(),
        }
    }

    fn apply(
        &self,
        props: &FieldRenderProps<'_>,
        _ui: &mut FieldUiState,
        edit: FieldEdit,
    ) -> EditOutcome {
        let bounds = Bounds::of(props);
        match edit {
            FieldEdit::SetText(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return EditOutcome::Changed(Value::Null);
                }
                let parsed = trimmed.parse::<f64>().ok().filter(|number| number.is_finite());
                EditOutcome::Changed(parsed.map_or(Value::String(text), number_value))
            }
            FieldEdit::SetNumber(number) if number.is_finite() => {
                EditOutcome::Changed(number_value(number))
            }
            FieldEdit::Increment | FieldEdit::Decrement => {
                let current = props
                    .value
                    .and_then(numeric_value)
                    .or(bounds.min)
                    .unwrap_or(0.0);
                let delta = if edit == FieldEdit::Increment { bounds.step } else { -bounds.step };
                EditOutcome::Changed(number_value(bounds.clamp(current + delta)))
            }
            other => common_edit(other),
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

    use super::NumberRenderer;
    use crate::props::EditOutcome;
    use crate::props::FieldEdit;
    use crate::props::FieldRenderer;
    use crate::props::FieldUiState;
    use crate::registry::standard_registry;
    use crate::renderers::testing::field;
    use crate::renderers::testing::props;

    #[test]
    fn stepper_clamps_to_bounds() {
        let registry = standard_registry();
        let field = field(
            "temperature",
            json!({"type": "number", "minimum": 0, "maximum": 1}),
            json!({"step": 0.5}),
        );
        let current = json!(1);
        let props = props(&field, Some(&current), &registry);
        let mut ui = FieldUiState::default();
        assert_eq!(
            NumberRenderer.apply(&props, &mut ui, FieldEdit::Increment),
            EditOutcome::Changed(json!(1))
        );
        assert_eq!(
            NumberRenderer.apply(&props, &mut ui, FieldEdit::Decrement),
            EditOutcome::Changed(json!(0.5))
        );
    }

    #[test]
    fn typed_text_keeps_unparseable_input_for_validation() {
        let registry = standard_registry();
        let field = field("port", json!({"type": "integer"}), json!({}));
        let props = props(&field, None, &registry);
        let mut ui = FieldUiState::default();
        let typed = |text: &str| FieldEdit::SetText(text.to_string());
        assert_eq!(
            NumberRenderer.apply(&props, &mut ui, typed("8080")),
            EditOutcome::Changed(json!(8080))
        );
        assert_eq!(
            NumberRenderer.apply(&props, &mut ui, typed("80a")),
            EditOutcome::Changed(json!("80a"))
        );
        assert_eq!(
            NumberRenderer.apply(&props, &mut ui, typed("  ")),
            EditOutcome::Changed(json!(null))
        );
    }
}
