//! Single-turn driver.
//!
//! Sends one turn through a [`ConversationTransport`] and drains the
//! resulting event stream into a [`TurnOutput`].

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use delegate_protocols::error::TransportError;
use delegate_protocols::status::StatusKind;
use delegate_protocols::transport::{ConversationTransport, TurnEvent, TurnRequest};
use delegate_protocols::types::ToolCall;

use crate::observer::StatusEmitter;

/// Everything the agent produced in one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnOutput {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl TurnOutput {
    /// True when the turn produced neither text nor calls.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty() && self.tool_calls.is_empty()
    }
}

/// Drives turns through a transport.
#[derive(Clone)]
pub struct TurnDriver {
    transport: Arc<dyn ConversationTransport>,
}

impl TurnDriver {
    pub fn new(transport: Arc<dyn ConversationTransport>) -> Self {
        Self { transport }
    }

    /// Send `request` and collect the streamed response.
    ///
    /// Content fragments are concatenated in arrival order and tool calls
    /// are kept in arrival order. A `Thinking` event is emitted whenever the
    /// accumulated text's preview changes. Cancellation aborts the drain
    /// with [`TransportError::Cancelled`].
    pub async fn run(
        &self,
        request: TurnRequest,
        cancel: &CancellationToken,
        status: &StatusEmitter,
    ) -> Result<TurnOutput, TransportError> {
        debug!(
            transport = self.transport.id(),
            messages = request.messages.len(),
            "Sending turn"
        );

        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled),
            stream = self.transport.send_turn(request, cancel.clone()) => stream?,
        };

        let mut output = TurnOutput::default();
        let mut last_preview = String::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                next = stream.next() => next,
            };

            match next {
                None => break,
                Some(Err(e)) => return Err(e),
                Some(Ok(TurnEvent::Content(fragment))) => {
                    output.content.push_str(&fragment);
                    let preview = status.preview(output.content.trim());
                    if !preview.is_empty() && preview != last_preview {
                        status.emit(StatusKind::Thinking, preview.clone());
                        last_preview = preview;
                    }
                }
                Some(Ok(TurnEvent::ToolCall(call))) => output.tool_calls.push(call),
            }
        }

        debug!(
            content_len = output.content.len(),
            tool_calls = output.tool_calls.len(),
            "Turn complete"
        );
        Ok(output)
    }
}
