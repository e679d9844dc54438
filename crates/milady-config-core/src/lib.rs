// crates/milady-config-core/src/lib.rs
// ============================================================================
// Module: Milady Config Core
// Description: Schema-driven configuration model for plugin settings forms.
// Purpose: Resolve schema + hint pairs into typed, validated form fields.
// Dependencies: regex, serde, serde_json, smallvec, thiserror, time, url
// ============================================================================

//! ## Overview
//! Milady config core is the UI-agnostic half of the settings engine. Plugins
//! describe their configuration as a JSON-Schema subset plus per-property UI
//! hints; this crate turns that description into [`ResolvedField`] records,
//! decides visibility, and runs the validation pipeline. It performs no I/O
//! and never mutates the caller's values.
//!
//! Bad metadata degrades instead of failing: unknown field types render as
//! text, malformed hints fall back to defaults, and malformed visibility rules
//! leave fields visible. Those degradations are reported through
//! [`EngineEventSink`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod dynamic;
pub mod error;
pub mod events;
pub mod fields;
pub mod hint;
pub mod schema;
pub mod validation;
pub mod visibility;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::ALL_FIELD_TYPES;
pub use catalog::ARRAY_MAX_ITEMS;
pub use catalog::FieldCatalog;
pub use catalog::FieldConstraints;
pub use catalog::FieldOption;
pub use catalog::FieldType;
pub use catalog::FieldValidator;
pub use catalog::KEY_VALUE_MAX_ENTRIES;
pub use catalog::TABLE_MAX_ROWS;
pub use catalog::resolve_options;
pub use dynamic::DynamicValue;
pub use dynamic::lookup_path;
pub use dynamic::resolve_dynamic;
pub use dynamic::resolve_params;
pub use error::HintError;
pub use error::SchemaError;
pub use events::EngineEvent;
pub use events::EngineEventSink;
pub use events::EventKind;
pub use events::EventLevel;
pub use events::FileEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::StderrEventSink;
pub use fields::DEFAULT_GROUP;
pub use fields::DEFAULT_ORDER;
pub use fields::FieldWidth;
pub use fields::ResolvedField;
pub use fields::SetKeys;
pub use fields::coerce_input;
pub use fields::resolve_fields;
pub use fields::validate_field;
pub use hint::ActionBinding;
pub use hint::HintOption;
pub use hint::UiHint;
pub use hint::UiHints;
pub use hint::merge_hint_documents;
pub use schema::ConfigSchema;
pub use schema::ConfigValues;
pub use schema::PropertySchema;
pub use schema::SchemaType;
pub use schema::is_empty_value;
pub use validation::CheckRule;
pub use validation::ValidationCheck;
pub use validation::ValidationContext;
pub use validation::ValidationFunctions;
pub use validation::ValidationReport;
pub use validation::run_validation;
pub use visibility::ShowIf;
pub use visibility::TriState;
pub use visibility::VisibilityExpr;
pub use visibility::evaluate_show_if;
pub use visibility::evaluate_visibility;
pub use visibility::is_field_visible;
