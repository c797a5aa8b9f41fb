//! Turn request types.

use serde::{Deserialize, Serialize};

use crate::tool::ToolDefinition;
use crate::types::{Message, Metadata};

/// Everything a transport needs to run one turn.
///
/// `messages` is the session's full history, already including the new
/// outbound input as its trailing messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    /// Session the turn belongs to.
    pub session_id: String,

    /// System instructions for the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Messages in the conversation.
    pub messages: Vec<Message>,

    /// Tools the model may call this turn.
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,

    /// Additional metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl TurnRequest {
    /// Create a new turn request.
    pub fn new(session_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            session_id: session_id.into(),
            system: None,
            messages,
            tools: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Set the system instructions.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the tools.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// The most recent message, usually the outbound input.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_request_new() {
        let request = TurnRequest::new("s1", vec![Message::user("Hello")]);
        assert_eq!(request.session_id, "s1");
        assert_eq!(request.messages.len(), 1);
        assert!(request.system.is_none());
        assert!(request.tools.is_empty());
    }

    #[test]
    fn test_turn_request_builders() {
        let request = TurnRequest::new("s1", vec![])
            .with_system("You are a task agent")
            .with_tools(vec![ToolDefinition::new("finish", "Finish", "Return")]);
        assert_eq!(request.system.as_deref(), Some("You are a task agent"));
        assert_eq!(request.tools.len(), 1);
        assert!(request.last_message().is_none());
    }

    #[test]
    fn test_last_message() {
        let request = TurnRequest::new("s1", vec![Message::user("a"), Message::user("b")]);
        assert_eq!(request.last_message().unwrap().content, "b");
    }
}
