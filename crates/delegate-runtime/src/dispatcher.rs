//! Concurrent tool dispatch with per-call fault containment.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use delegate_core::ToolRegistry;
use delegate_protocols::control::{AgentReturnSignal, decode_return_signal};
use delegate_protocols::error::ToolError;
use delegate_protocols::status::StatusKind;
use delegate_protocols::tool::{Tool, ToolContext, ToolResult};
use delegate_protocols::types::{Message, ToolCall};

use crate::observer::StatusEmitter;

/// Result of one requested tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub request: ToolCall,
    pub ok: bool,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl ToolOutcome {
    pub fn success(request: ToolCall, output: impl Into<String>) -> Self {
        Self {
            request,
            ok: true,
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn failure(request: ToolCall, error: impl Into<String>) -> Self {
        Self {
            request,
            ok: false,
            output: None,
            error: Some(error.into()),
        }
    }

    /// Render as a tool message for the next turn's input.
    pub fn to_message(&self) -> Message {
        let content = if self.ok {
            self.output.clone().unwrap_or_default()
        } else {
            format!("Error: {}", self.error.as_deref().unwrap_or("unknown error"))
        };
        Message::tool(&self.request.id, content)
    }

    /// Decode a return signal from a successful payload.
    pub fn return_signal(&self) -> Option<AgentReturnSignal> {
        if !self.ok {
            return None;
        }
        self.output.as_deref().and_then(decode_return_signal)
    }

    /// Text shown in status previews.
    fn summary(&self) -> &str {
        if self.ok {
            self.output.as_deref().unwrap_or("")
        } else {
            self.error.as_deref().unwrap_or("")
        }
    }
}

/// Executes batches of tool calls against a registry.
pub struct ToolDispatcher {
    session_id: String,
    status: StatusEmitter,
}

impl ToolDispatcher {
    pub fn new(session_id: impl Into<String>, status: StatusEmitter) -> Self {
        Self {
            session_id: session_id.into(),
            status,
        }
    }

    /// Run every request concurrently. Always yields exactly one outcome per
    /// request, in request order. A missing tool, a rejected argument set,
    /// an execution error or a panic only affects its own outcome.
    pub async fn dispatch(
        &self,
        registry: &ToolRegistry,
        requests: &[ToolCall],
        cancel: &CancellationToken,
    ) -> Vec<ToolOutcome> {
        let calls = requests
            .iter()
            .map(|request| self.dispatch_one(registry, request, cancel));
        join_all(calls).await
    }

    async fn dispatch_one(
        &self,
        registry: &ToolRegistry,
        request: &ToolCall,
        cancel: &CancellationToken,
    ) -> ToolOutcome {
        let Some(tool) = registry.get(&request.name) else {
            let err = ToolError::NotFound(request.name.clone());
            warn!(tool = %request.name, "Requested tool is not registered");
            self.status.emit(StatusKind::Error, err.to_string());
            return ToolOutcome::failure(request.clone(), err.to_string());
        };

        self.status.emit(
            StatusKind::ToolCall,
            format!(
                "{} {}",
                request.name,
                self.status.preview(&request.arguments.to_string())
            ),
        );

        let outcome = match self.invoke(tool.as_ref(), request, cancel).await {
            Ok(result) => match result.error_message() {
                None => ToolOutcome::success(request.clone(), result.content),
                Some(error) => ToolOutcome::failure(request.clone(), error),
            },
            Err(e) => ToolOutcome::failure(request.clone(), e.to_string()),
        };

        debug!(tool = %request.name, ok = outcome.ok, "Tool call finished");
        let kind = if outcome.ok {
            StatusKind::ToolResult
        } else {
            StatusKind::Error
        };
        self.status.emit(
            kind,
            format!("{}: {}", request.name, self.status.preview(outcome.summary())),
        );
        outcome
    }

    async fn invoke(
        &self,
        tool: &dyn Tool,
        request: &ToolCall,
        cancel: &CancellationToken,
    ) -> Result<ToolResult, ToolError> {
        tool.validate(&request.arguments)?;

        let ctx = ToolContext::new(&self.session_id, &request.id).with_cancel(cancel.child_token());
        match AssertUnwindSafe(tool.execute(request.arguments.clone(), ctx))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => Err(ToolError::Panicked(panic_message(panic.as_ref()))),
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
