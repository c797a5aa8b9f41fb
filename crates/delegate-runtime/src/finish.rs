//! Return tool exposed only inside sub-agent registries.

use async_trait::async_trait;
use serde::Deserialize;

use delegate_protocols::control::{AgentReturnSignal, FINISH_TOOL_ID};
use delegate_protocols::error::ToolError;
use delegate_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};

#[derive(Debug, Deserialize)]
pub struct FinishParams {
    /// Whether the task was fully accomplished.
    pub success: bool,
    /// Summary of what was done.
    pub description: String,
    /// Task output, empty when there is nothing to hand back.
    pub result: String,
}

/// Encodes its arguments as an agent return signal. It has no other effect;
/// the session runner recognizes the payload and ends the session.
pub struct FinishTool {
    definition: ToolDefinition,
}

impl FinishTool {
    pub fn new() -> Self {
        let definition = ToolDefinition::new(
            FINISH_TOOL_ID,
            "Finish",
            "Finish the current task and hand the result back to the agent that \
             delegated it. Call this exactly once, when the task is done or cannot \
             be completed.",
        )
        .with_parameters_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "success": {
                    "type": "boolean",
                    "description": "Whether the task was fully accomplished"
                },
                "description": {
                    "type": "string",
                    "description": "Short summary of what was done or why it failed"
                },
                "result": {
                    "type": "string",
                    "description": "The task output, or an empty string if there is none"
                }
            },
            "required": ["success", "description", "result"]
        }));

        Self { definition }
    }
}

impl Default for FinishTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FinishTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: FinishParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let signal = AgentReturnSignal::new(params.success, params.description, params.result);
        Ok(ToolResult::success(signal.encode()))
    }
}
