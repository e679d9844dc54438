// crates/milady-config-core/src/events.rs
// ============================================================================
// Module: Engine Events
// Description: Structured diagnostic events for the config engine.
// Purpose: Report recoverable problems without failing the form.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The engine never fails a render for bad plugin metadata. Instead it emits
//! an [`EngineEvent`] through an injected [`EngineEventSink`] and carries on
//! with a fallback. Events carry keys and labels only; field values are never
//! included so secrets cannot leak into logs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Severity of an engine event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    /// Degraded behavior the author should fix.
    Warn,
    /// Informational note.
    Info,
}

/// Classification of engine events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A hint binds an event to an action with no registered handler.
    MissingActionHandler,
    /// A property hint failed to parse and fell back to defaults.
    MalformedHint,
    /// A `hint.fieldType` is unknown or not in the catalog.
    UnknownFieldType,
    /// A regex pattern was skipped as unsafe or invalid.
    PatternSkipped,
    /// A custom check names a function that is not registered.
    MissingValidationFunction,
    /// A secret reveal failed; the field stays masked.
    RevealFailed,
    /// An action handler reported an error.
    ActionFailed,
    /// The schema document could not be used.
    MalformedSchema,
}

impl EventKind {
    /// Default severity for the kind.
    #[must_use]
    pub const fn level(self) -> EventLevel {
        match self {
            Self::PatternSkipped => EventLevel::Info,
            _ => EventLevel::Warn,
        }
    }
}

/// Engine diagnostic event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Severity.
    pub level: EventLevel,
    /// Event classification.
    pub kind: EventKind,
    /// Plugin whose form produced the event.
    pub plugin_id: Option<String>,
    /// Field key when the event concerns one field.
    pub field: Option<String>,
    /// Human-readable detail.
    pub message: String,
}

impl EngineEvent {
    /// Creates an event with a consistent timestamp.
    #[must_use]
    pub fn new(
        kind: EventKind,
        plugin_id: Option<&str>,
        field: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "config_engine",
            timestamp_ms,
            level: kind.level(),
            kind,
            plugin_id: plugin_id.map(str::to_string),
            field: field.map(str::to_string),
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Engine event sink.
pub trait EngineEventSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: &EngineEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl EngineEventSink for StderrEventSink {
    fn record(&self, event: &EngineEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EngineEventSink for FileEventSink {
    fn record(&self, event: &EngineEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that keeps events in memory for inspection.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Recorded events.
    events: Mutex<Vec<EngineEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Returns the kinds of the recorded events in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().into_iter().map(|event| event.kind).collect()
    }
}

impl EngineEventSink for MemoryEventSink {
    fn record(&self, event: &EngineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// No-op sink.
pub struct NoopEventSink;

impl EngineEventSink for NoopEventSink {
    fn record(&self, _event: &EngineEvent) {}
}
