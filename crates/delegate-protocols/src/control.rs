//! Control messages carried inside tool-result payloads.
//!
//! Two messages ride on ordinary tool output:
//!
//! - a **spawn request** (`"type": "spawn_agent"`), emitted by the
//!   `spawn_agent` tool and picked up by the host, which then runs a
//!   sub-agent session;
//! - an **agent return** (`"type": "agent_return"`), emitted by the `finish`
//!   tool inside a sub-agent and picked up by the session runner, which ends
//!   the session with it.
//!
//! Decoding fails closed. Anything that is not exactly one of these shapes,
//! including truncated JSON, an unknown tag, missing fields and zero budgets,
//! parses as [`ControlMessage::Unrecognized`]. Plain tool output is never
//! mistaken for a control message and never causes an error.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tool id of the spawn capability. Never present in a sub-agent registry.
pub const SPAWN_TOOL_ID: &str = "spawn_agent";

/// Tool id of the return capability. Present exactly once in every
/// sub-agent registry.
pub const FINISH_TOOL_ID: &str = "finish";

/// A request to run a bounded sub-agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTaskRequest {
    /// Short label, used in status events and the formatted result.
    pub task: String,
    /// Detailed instructions, sent as the sub-agent's first message.
    pub instructions: String,
    /// Turn budget. Must be positive.
    pub max_turns: u32,
    /// Wall-clock budget in milliseconds. Must be positive.
    pub timeout_ms: u64,
}

impl AgentTaskRequest {
    pub fn new(
        task: impl Into<String>,
        instructions: impl Into<String>,
        max_turns: u32,
        timeout_ms: u64,
    ) -> Self {
        Self {
            task: task.into(),
            instructions: instructions.into(),
            max_turns,
            timeout_ms,
        }
    }

    /// Check the budgets.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_turns == 0 {
            return Err("max_turns must be greater than zero".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Encode as a spawn-request payload.
    pub fn encode(&self) -> String {
        serde_json::json!({
            "type": "spawn_agent",
            "task": self.task,
            "instructions": self.instructions,
            "maxTurns": self.max_turns,
            "timeoutMs": self.timeout_ms,
        })
        .to_string()
    }
}

/// The terminal value of a sub-agent session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReturnSignal {
    pub success: bool,
    pub description: String,
    pub result: String,
}

impl AgentReturnSignal {
    pub fn new(success: bool, description: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            success,
            description: description.into(),
            result: result.into(),
        }
    }

    /// A failed signal with an empty result.
    pub fn failure(description: impl Into<String>) -> Self {
        Self::new(false, description, "")
    }

    /// Encode as an agent-return payload.
    pub fn encode(&self) -> String {
        serde_json::json!({
            "type": "agent_return",
            "success": self.success,
            "description": self.description,
            "result": self.result,
        })
        .to_string()
    }
}

/// A decoded tool payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    SpawnAgent(AgentTaskRequest),
    AgentReturn(AgentReturnSignal),
    /// Anything else. Ordinary tool output lands here.
    #[serde(skip)]
    Unrecognized,
}

impl ControlMessage {
    /// Classify a payload. Never fails.
    pub fn parse(payload: &str) -> Self {
        let trimmed = payload.trim();
        if !trimmed.starts_with('{') {
            return ControlMessage::Unrecognized;
        }
        match serde_json::from_str::<ControlMessage>(trimmed) {
            Ok(ControlMessage::SpawnAgent(request)) if request.validate().is_err() => {
                ControlMessage::Unrecognized
            }
            Ok(message) => message,
            Err(_) => ControlMessage::Unrecognized,
        }
    }

    pub fn is_control(&self) -> bool {
        !matches!(self, ControlMessage::Unrecognized)
    }
}

pub fn encode_spawn_request(request: &AgentTaskRequest) -> String {
    request.encode()
}

pub fn decode_spawn_request(payload: &str) -> Option<AgentTaskRequest> {
    match ControlMessage::parse(payload) {
        ControlMessage::SpawnAgent(request) => Some(request),
        _ => None,
    }
}

pub fn encode_return_signal(signal: &AgentReturnSignal) -> String {
    signal.encode()
}

pub fn decode_return_signal(payload: &str) -> Option<AgentReturnSignal> {
    match ControlMessage::parse(payload) {
        ControlMessage::AgentReturn(signal) => Some(signal),
        _ => None,
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
