//! Tool execution context.

use tokio_util::sync::CancellationToken;

/// Context for tool execution.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Session the call belongs to.
    pub session_id: String,

    /// ID of the tool call being executed.
    pub call_id: String,

    /// Cancelled when the owning session's deadline wins the race.
    pub cancel: CancellationToken,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(session_id: impl Into<String>, call_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            call_id: call_id.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Share an existing cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Check if the operation should stop.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
