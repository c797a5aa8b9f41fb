//! Human-readable progress events.
//!
//! Status events are advisory. Nothing may depend on them for correctness,
//! and observers must neither block nor panic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse kind of a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Start,
    Thinking,
    ToolCall,
    ToolResult,
    Completion,
    Error,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Start => "start",
            StatusKind::Thinking => "thinking",
            StatusKind::ToolCall => "tool_call",
            StatusKind::ToolResult => "tool_result",
            StatusKind::Completion => "completion",
            StatusKind::Error => "error",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A progress event from one agent session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub kind: StatusKind,
    /// Task label of the emitting session.
    pub agent: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new(kind: StatusKind, agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            agent: agent.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.agent, self.kind, self.message)
    }
}

/// Sink for status events.
///
/// Shared across a session tree, so emissions from nested sessions may
/// interleave. Order is only preserved within one session.
pub trait StatusObserver: Send + Sync {
    fn observe(&self, event: StatusEvent);
}
