//! Shared fixtures for runtime tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use delegate_protocols::error::ToolError;
use delegate_protocols::status::{StatusEvent, StatusKind, StatusObserver};
use delegate_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};
use delegate_protocols::transport::TurnEvent;

use crate::observer::StatusEmitter;

/// Observer that keeps every event.
#[derive(Default)]
pub(crate) struct CollectingObserver {
    events: Mutex<Vec<StatusEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn emitter(agent: &str, preview_chars: usize) -> (Arc<Self>, StatusEmitter) {
        let observer = Self::new();
        let shared: Arc<dyn StatusObserver> = observer.clone();
        (observer, StatusEmitter::new(Some(shared), agent, preview_chars))
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<StatusKind> {
        self.events.lock().iter().map(|e| e.kind).collect()
    }

    pub fn messages(&self, kind: StatusKind) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.message.clone())
            .collect()
    }
}

impl StatusObserver for CollectingObserver {
    fn observe(&self, event: StatusEvent) {
        self.events.lock().push(event);
    }
}

macro_rules! fixture_tool {
    ($name:ident, $id:expr) => {
        pub(crate) struct $name {
            definition: ToolDefinition,
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    definition: ToolDefinition::new($id, stringify!($name), "Test fixture"),
                }
            }

            pub fn arc() -> Arc<dyn Tool> {
                Arc::new(Self::new())
            }
        }
    };
}

fixture_tool!(EchoTool, "echo");
fixture_tool!(FailingTool, "failing");
fixture_tool!(PanickingTool, "panicking");
fixture_tool!(SpawnStubTool, "spawn_agent");

#[async_trait]
impl Tool for EchoTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let text = params
            .get("text")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| params.to_string());
        Ok(ToolResult::success(text))
    }
}

#[async_trait]
impl Tool for FailingTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::error("disk on fire"))
    }
}

#[async_trait]
impl Tool for PanickingTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        panic!("kaboom");
    }
}

#[async_trait]
impl Tool for SpawnStubTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::success("spawned"))
    }
}

/// Sleeps, honoring cancellation.
pub(crate) struct SlowTool {
    definition: ToolDefinition,
    delay: Duration,
}

impl SlowTool {
    pub fn arc(delay: Duration) -> Arc<dyn Tool> {
        Arc::new(Self {
            definition: ToolDefinition::new("slow", "Slow", "Test fixture"),
            delay,
        })
    }
}

#[async_trait]
impl Tool for SlowTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        tokio::select! {
            _ = ctx.cancel.cancelled() => Err(ToolError::Cancelled),
            _ = tokio::time::sleep(self.delay) => Ok(ToolResult::success("slow done")),
        }
    }
}

pub(crate) fn call(id: &str, name: &str, arguments: serde_json::Value) -> TurnEvent {
    TurnEvent::tool_call(id, name, arguments)
}

pub(crate) fn finish_call(id: &str, success: bool, description: &str, result: &str) -> TurnEvent {
    call(
        id,
        "finish",
        json!({"success": success, "description": description, "result": result}),
    )
}
