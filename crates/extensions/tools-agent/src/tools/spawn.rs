//! Sub-agent spawn tool.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use delegate_protocols::control::{AgentTaskRequest, SPAWN_TOOL_ID};
use delegate_protocols::error::ToolError;
use delegate_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};

/// Budgets used when the caller leaves them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnDefaults {
    pub max_turns: u32,
    pub timeout_ms: u64,
}

impl Default for SpawnDefaults {
    fn default() -> Self {
        Self {
            max_turns: 20,
            timeout_ms: 300_000,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SpawnAgentParams {
    /// Short label for the task.
    pub task: String,
    /// Detailed instructions for the sub-agent.
    pub instructions: String,
    /// Turn budget override.
    pub max_turns: Option<u32>,
    /// Time budget override in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Asks the host to run a sub-agent. Does no work itself: the result is a
/// spawn-request payload the host recognizes.
pub struct SpawnAgentTool {
    definition: ToolDefinition,
    defaults: SpawnDefaults,
}

impl SpawnAgentTool {
    pub fn new(defaults: SpawnDefaults) -> Self {
        let definition = ToolDefinition::new(
            SPAWN_TOOL_ID,
            "Spawn Agent",
            "Delegate a self-contained task to a sub-agent with its own copy of the \
             conversation and a limited turn and time budget. The sub-agent's result \
             is returned as this tool's output.",
        )
        .with_parameters_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": "Short label for the task, shown in progress updates"
                },
                "instructions": {
                    "type": "string",
                    "description": "Detailed instructions for the sub-agent"
                },
                "max_turns": {
                    "type": "integer",
                    "minimum": 1,
                    "description": format!("Turn budget (default: {})", defaults.max_turns)
                },
                "timeout_ms": {
                    "type": "integer",
                    "minimum": 1,
                    "description": format!("Time budget in milliseconds (default: {})", defaults.timeout_ms)
                }
            },
            "required": ["task", "instructions"]
        }));

        Self {
            definition,
            defaults,
        }
    }

    pub fn defaults(&self) -> SpawnDefaults {
        self.defaults
    }

    fn build_request(&self, params: SpawnAgentParams) -> Result<AgentTaskRequest, ToolError> {
        let request = AgentTaskRequest::new(
            params.task,
            params.instructions,
            params.max_turns.unwrap_or(self.defaults.max_turns),
            params.timeout_ms.unwrap_or(self.defaults.timeout_ms),
        );
        request.validate().map_err(ToolError::InvalidParameters)?;
        Ok(request)
    }
}

#[async_trait]
impl Tool for SpawnAgentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: SpawnAgentParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;
        let request = self.build_request(params)?;

        debug!(
            task = %request.task,
            max_turns = request.max_turns,
            timeout_ms = request.timeout_ms,
            "Spawn requested"
        );
        Ok(ToolResult::success(request.encode()))
    }
}
