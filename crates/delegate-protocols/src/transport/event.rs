//! Turn event types.

use serde::{Deserialize, Serialize};

use crate::types::ToolCall;

/// One event in a turn's stream.
///
/// Content fragments and tool calls may interleave in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnEvent {
    /// Text content fragment.
    Content(String),

    /// A complete tool-call request.
    ToolCall(ToolCall),
}

impl TurnEvent {
    pub fn content(text: impl Into<String>) -> Self {
        TurnEvent::Content(text.into())
    }

    pub fn tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        TurnEvent::ToolCall(ToolCall::new(id, name, arguments))
    }
}
