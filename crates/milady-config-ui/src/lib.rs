// crates/milady-config-ui/src/lib.rs
// ============================================================================
// Module: Milady Config UI
// Description: Field renderers, registry, and the config renderer orchestrator.
// Purpose: Turn resolved fields into an interactive, toolkit-agnostic form.
// Dependencies: async-trait, milady-config-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate is the rendering half of the settings engine. A
//! [`FieldRegistry`] binds the core field catalog to [`FieldRenderer`]
//! implementations and host action handlers. [`ConfigRenderer`] owns the
//! resolved fields, error map, and per-field UI state for one plugin, and
//! renders them into a serializable [`RenderNode`] tree that any front end can
//! draw.
//!
//! The crate performs no I/O. Secret reveals and bound actions go through the
//! [`SecretRevealer`] and [`ActionHandler`] seams implemented by the host.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod actions;
pub mod field;
pub mod markdown;
pub mod node;
pub mod props;
pub mod registry;
pub mod renderer;
pub mod renderers;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use actions::ActionError;
pub use actions::ActionHandler;
pub use actions::ActionRequest;
pub use actions::FnActionHandler;
pub use actions::PendingAction;
pub use actions::RevealError;
pub use actions::SecretRevealer;
pub use field::render_field;
pub use node::Control;
pub use node::FieldNode;
pub use node::RenderNode;
pub use node::SummaryEntry;
pub use node::field_element_id;
pub use props::EditOutcome;
pub use props::FieldEdit;
pub use props::FieldRenderProps;
pub use props::FieldRenderer;
pub use props::FieldUiState;
pub use registry::FieldRegistry;
pub use registry::define_registry;
pub use registry::standard_registry;
pub use renderer::ConfigRenderer;
pub use renderer::EditResult;
pub use renderer::Progress;
pub use renderers::standard_renderers;
