//! Port for the structured audit trail.
//!
//! Defines the [`AuditLogger`] trait for recording consensus events (round
//! start, each vote, discarded votes, verdicts, degradations, executions) to
//! a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures a
//! machine-readable record of every round (JSONL).

use serde_json::Value;

/// A structured audit event.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. The adapter adds the timestamp when the event is written.
pub struct AuditEvent {
    /// Event type identifier (e.g., "round_started", "vote_recorded").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging audit events.
///
/// `log` is synchronous and non-fallible; a failing sink must never change
/// the outcome of a round.
pub trait AuditLogger: Send + Sync {
    /// Record an audit event.
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLogger;

impl AuditLogger for NoAuditLogger {
    fn log(&self, _event: AuditEvent) {}
}
