// crates/milady-config-ui/src/registry.rs
// ============================================================================
// Module: Field Registry
// Description: Catalog bound to renderers, action handlers, and validators.
// Purpose: Route rendering by field type and actions by name.
// Dependencies: milady-config-core
// ============================================================================

//! ## Overview
//! A [`FieldRegistry`] is an explicitly constructed value passed to each
//! [`crate::ConfigRenderer`]; there is no global instance, so panels with
//! different capability sets coexist. New field types are added by
//! registering a renderer, not by subclassing.
//!
//! Lookups never fail: a field type without a renderer uses the text
//! renderer, and a missing action handler is reported by the orchestrator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use milady_config_core::FieldCatalog;
use milady_config_core::FieldType;
use milady_config_core::ValidationFunctions;

use crate::actions::ActionHandler;
use crate::node::InputKind;
use crate::props::FieldRenderer;
use crate::renderers::TextRenderer;
use crate::renderers::standard_renderers;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Field catalog bound to concrete renderers and handlers.
///
/// # Invariants
/// - Renderer lookups always return a renderer; `text` is the fallback.
/// - Action names are unique; registering a name again replaces the handler.
#[derive(Clone)]
pub struct FieldRegistry {
    /// Type decision table and validators.
    catalog: FieldCatalog,
    /// Renderers keyed by field type.
    renderers: BTreeMap<FieldType, Arc<dyn FieldRenderer>>,
    /// Fallback for types without a renderer.
    fallback: Arc<dyn FieldRenderer>,
    /// Action handlers keyed by action name.
    actions: BTreeMap<String, Arc<dyn ActionHandler>>,
    /// Host functions for `custom` validation checks.
    functions: ValidationFunctions,
}

/// Composes a registry from a catalog and renderer table. Pure; no I/O.
#[must_use]
pub fn define_registry(
    catalog: FieldCatalog,
    renderers: impl IntoIterator<Item = (FieldType, Arc<dyn FieldRenderer>)>,
) -> FieldRegistry {
    FieldRegistry {
        catalog,
        renderers: renderers.into_iter().collect(),
        fallback: Arc::new(TextRenderer::new(InputKind::Text)),
        actions: BTreeMap::new(),
        functions: ValidationFunctions::new(),
    }
}

/// Registry with every built-in field type and renderer.
#[must_use]
pub fn standard_registry() -> FieldRegistry {
    define_registry(FieldCatalog::standard(), standard_renderers())
}

impl Default for FieldRegistry {
    fn default() -> Self {
        standard_registry()
    }
}

impl fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("renderers", &self.renderers.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("functions", &self.functions)
            .finish_non_exhaustive()
    }
}

impl FieldRegistry {
    /// Field catalog.
    #[must_use]
    pub const fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Renderer for a field type, falling back to plain text.
    #[must_use]
    pub fn renderer(&self, field_type: FieldType) -> &dyn FieldRenderer {
        self.renderers.get(&field_type).unwrap_or(&self.fallback).as_ref()
    }

    /// Returns true when a renderer is registered for the type.
    #[must_use]
    pub fn has_renderer(&self, field_type: FieldType) -> bool {
        self.renderers.contains_key(&field_type)
    }

    /// Registers or replaces the renderer for a type.
    #[must_use]
    pub fn with_renderer(
        mut self,
        field_type: FieldType,
        renderer: impl FieldRenderer + 'static,
    ) -> Self {
        self.renderers.insert(field_type, Arc::new(renderer));
        self
    }

    /// Registers or replaces an action handler.
    #[must_use]
    pub fn with_action(
        mut self,
        name: impl Into<String>,
        handler: impl ActionHandler + 'static,
    ) -> Self {
        self.actions.insert(name.into(), Arc::new(handler));
        self
    }

    /// Looks up an action handler.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<Arc<dyn ActionHandler>> {
        self.actions.get(name).cloned()
    }

    /// Replaces the `custom` validation function table.
    #[must_use]
    pub fn with_validation_functions(mut self, functions: ValidationFunctions) -> Self {
        self.functions = functions;
        self
    }

    /// `custom` validation function table.
    #[must_use]
    pub const fn validation_functions(&self) -> &ValidationFunctions {
        &self.functions
    }
}
