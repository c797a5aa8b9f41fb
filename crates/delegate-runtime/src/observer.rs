//! Status event plumbing.
//!
//! Sessions report progress through a [`StatusEmitter`], which stamps each
//! event with the session's task label and forwards it to an optional
//! [`StatusObserver`]. Observers must not block; the built-in ones either
//! log through `tracing` or push into an unbounded channel.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tracing::{info, warn};

use delegate_protocols::status::{StatusEvent, StatusKind, StatusObserver};
use delegate_protocols::types::truncate_preview;

use crate::dispatcher::panic_message;

/// Emits status events on behalf of one session.
#[derive(Clone)]
pub struct StatusEmitter {
    observer: Option<Arc<dyn StatusObserver>>,
    agent: String,
    preview_chars: usize,
}

impl StatusEmitter {
    pub fn new(
        observer: Option<Arc<dyn StatusObserver>>,
        agent: impl Into<String>,
        preview_chars: usize,
    ) -> Self {
        Self {
            observer,
            agent: agent.into(),
            preview_chars,
        }
    }

    /// Emitter that drops everything.
    pub fn silent() -> Self {
        Self::new(None, "", 0)
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Forward an event to the observer, if any. A panicking observer is
    /// logged and otherwise ignored.
    pub fn emit(&self, kind: StatusKind, message: impl Into<String>) {
        let Some(observer) = &self.observer else {
            return;
        };
        let event = StatusEvent::new(kind, self.agent.clone(), message);
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| observer.observe(event))) {
            warn!(
                agent = %self.agent,
                kind = %kind,
                error = %panic_message(panic.as_ref()),
                "Status observer panicked"
            );
        }
    }

    /// Truncate text to this emitter's preview length.
    pub fn preview(&self, text: &str) -> String {
        truncate_preview(text, self.preview_chars)
    }
}

impl std::fmt::Debug for StatusEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusEmitter")
            .field("agent", &self.agent)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

/// Logs every status event at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusObserver;

impl StatusObserver for TracingStatusObserver {
    fn observe(&self, event: StatusEvent) {
        info!(agent = %event.agent, kind = %event.kind, "{}", event.message);
    }
}

/// Forwards events into a channel consumed as a [`StatusEventStream`].
pub struct ChannelStatusObserver {
    sender: mpsc::UnboundedSender<StatusEvent>,
}

impl ChannelStatusObserver {
    pub fn new() -> (Self, StatusEventStream) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, StatusEventStream { receiver })
    }
}

impl StatusObserver for ChannelStatusObserver {
    fn observe(&self, event: StatusEvent) {
        // Receiver gone means nobody is listening any more.
        let _ = self.sender.send(event);
    }
}

/// Stream of status events.
pub struct StatusEventStream {
    receiver: mpsc::UnboundedReceiver<StatusEvent>,
}

impl Stream for StatusEventStream {
    type Item = StatusEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
