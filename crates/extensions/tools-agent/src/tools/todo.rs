//! Session-scoped todo list tool.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use delegate_protocols::error::ToolError;
use delegate_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};

pub const TODO_TOOL_ID: &str = "todo";

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TodoParams {
    Add { text: String },
    Complete { id: u64 },
    List,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoItem {
    pub id: u64,
    pub text: String,
    pub done: bool,
}

/// A todo list owned by one tool instance. Ids start at 1 per instance,
/// so every session that gets a fresh instance gets its own numbering.
pub struct TodoTool {
    definition: ToolDefinition,
    next_id: AtomicU64,
    items: Mutex<Vec<TodoItem>>,
}

impl TodoTool {
    pub fn new() -> Self {
        let definition = ToolDefinition::new(
            TODO_TOOL_ID,
            "Todo",
            "Track the steps of the current task. Actions: `add` a step with `text`, \
             `complete` a step by `id`, or `list` all steps.",
        )
        .with_parameters_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["add", "complete", "list"]
                },
                "text": {
                    "type": "string",
                    "description": "Step description (for add)"
                },
                "id": {
                    "type": "integer",
                    "description": "Step id (for complete)"
                }
            },
            "required": ["action"]
        }));

        Self {
            definition,
            next_id: AtomicU64::new(1),
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn items(&self) -> Vec<TodoItem> {
        self.items.lock().clone()
    }

    fn render(items: &[TodoItem]) -> String {
        if items.is_empty() {
            return "No steps yet.".to_string();
        }
        items
            .iter()
            .map(|item| {
                format!(
                    "[{}] {}. {}",
                    if item.done { "x" } else { " " },
                    item.id,
                    item.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for TodoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for TodoTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: TodoParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        match params {
            TodoParams::Add { text } => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                self.items.lock().push(TodoItem {
                    id,
                    text: text.clone(),
                    done: false,
                });
                Ok(ToolResult::success(format!("Added step {}: {}", id, text))
                    .with_metadata("id", serde_json::json!(id)))
            }
            TodoParams::Complete { id } => {
                let mut items = self.items.lock();
                match items.iter_mut().find(|item| item.id == id) {
                    Some(item) => {
                        item.done = true;
                        Ok(ToolResult::success(format!("Completed step {}", id)))
                    }
                    None => Ok(ToolResult::error(format!("No step with id {}", id))),
                }
            }
            TodoParams::List => {
                let items = self.items.lock();
                Ok(ToolResult::success_json(
                    Self::render(&items),
                    serde_json::json!(*items),
                ))
            }
        }
    }
}
