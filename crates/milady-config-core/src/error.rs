// crates/milady-config-core/src/error.rs
// ============================================================================
// Module: Config Engine Errors
// Description: Structured errors for strict schema and hint parsing.
// Purpose: Give hosts actionable diagnostics while renderers degrade silently.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Strict parsing entry points (used by hosts loading documents from disk or
//! the backend) surface these errors. Render-time paths never return them;
//! they fall back to defaults and report through the event sink instead.

use thiserror::Error;

use crate::schema::SchemaType;

/// Errors raised while parsing a configuration schema document.
///
/// # Invariants
/// - Messages never include property values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The document was not a JSON object.
    #[error("schema document must be an object")]
    NotAnObject,
    /// The root schema declared a non-object type.
    #[error("schema root type must be object, got {}", .0.as_str())]
    UnsupportedRootType(SchemaType),
    /// The schema exceeded the nesting limit.
    #[error("schema nesting exceeds {max_depth} levels")]
    TooDeep {
        /// Maximum supported nesting.
        max_depth: usize,
    },
    /// A property declared more entries than supported.
    #[error("schema declares more than {max} properties")]
    TooManyProperties {
        /// Maximum supported property count.
        max: usize,
    },
    /// A keyword or property was dropped while parsing.
    #[error("schema for `{}` is malformed: {message}", .key.as_deref().unwrap_or("(root)"))]
    Malformed {
        /// Dotted property path, or `None` for the root.
        key: Option<String>,
        /// Parser message.
        message: String,
    },
}

/// Errors raised while parsing a hint document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HintError {
    /// The document was not a JSON object keyed by property name.
    #[error("hint document must be an object keyed by property name")]
    NotAnObject,
    /// A single property hint failed to parse.
    #[error("hint for `{key}` is malformed: {message}")]
    Malformed {
        /// Property key owning the hint.
        key: String,
        /// Parser message.
        message: String,
    },
}
