//! Port for structured conversation logging.
//!
//! Every event of a turn (tool selection, model responses, tool results) is
//! tagged with its conversation id, so one log can hold many conversations.
//! `tracing` carries the human-readable diagnostics; this port is the
//! machine-readable transcript.

use serde_json::Value;

/// One turn event.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    pub conversation_id: String,
    /// Event type identifier (e.g., "turn_started", "tool_result").
    pub event_type: &'static str,
    /// Event-specific fields.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(conversation_id: impl Into<String>, event_type: &'static str, payload: Value) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            event_type,
            payload,
        }
    }
}

/// Sink for turn events.
///
/// `log` is synchronous and infallible; a logger that cannot write drops
/// the event.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
