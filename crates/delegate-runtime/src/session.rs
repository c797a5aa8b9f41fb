//! Per-run agent session state.
//!
//! An [`AgentSession`] owns a private copy of the forked conversation, the
//! session-scoped tool registry and the turn/deadline counters. It lives for
//! exactly one runner invocation.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use delegate_core::ToolRegistry;
use delegate_protocols::control::AgentTaskRequest;
use delegate_protocols::transport::TurnRequest;
use delegate_protocols::types::{Message, MessageRole, ToolCall};

use crate::dispatcher::ToolOutcome;
use crate::prompts;
use crate::turn::TurnOutput;

/// Lifecycle of a session. `Returned` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Running,
    Returned,
    Exhausted,
    Summarizing,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Returned | SessionState::Failed)
    }
}

/// Mutable state of one sub-agent run.
#[derive(Debug)]
pub struct AgentSession {
    id: String,
    task: String,
    history: Vec<Message>,
    system_instructions: String,
    registry: ToolRegistry,
    turns_remaining: u32,
    turns_taken: u32,
    started_at: Instant,
    deadline: Instant,
    warning_deadline: Instant,
    pending_input: Vec<Message>,
    awaiting_results: Vec<ToolCall>,
    warning_sent: bool,
    state: SessionState,
}

impl AgentSession {
    /// Build a session starting now. `history` is the caller's fork; the
    /// session only ever appends to its own copy.
    pub fn new(
        request: &AgentTaskRequest,
        history: Vec<Message>,
        system_instructions: impl Into<String>,
        registry: ToolRegistry,
        warning_lead: Duration,
    ) -> Self {
        let started_at = Instant::now();
        let deadline = started_at + request.timeout();
        let warning_deadline = deadline
            .checked_sub(warning_lead)
            .map(|w| w.max(started_at))
            .unwrap_or(started_at);

        Self {
            id: format!("agent-{}", uuid::Uuid::new_v4()),
            task: request.task.clone(),
            history,
            system_instructions: system_instructions.into(),
            registry,
            turns_remaining: request.max_turns,
            turns_taken: 0,
            started_at,
            deadline,
            warning_deadline,
            pending_input: vec![Message::user(request.instructions.clone())],
            awaiting_results: Vec::new(),
            warning_sent: false,
            state: SessionState::Init,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn turns_remaining(&self) -> u32 {
        self.turns_remaining
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn warning_deadline(&self) -> Instant {
        self.warning_deadline
    }

    pub fn warning_sent(&self) -> bool {
        self.warning_sent
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn transition(&mut self, next: SessionState) {
        debug!(session_id = %self.id, from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }

    /// Drain the next outbound input. Once `now` has passed the warning
    /// deadline the time warning is attached, at most once per session.
    pub fn take_outbound(&mut self, now: Instant) -> Vec<Message> {
        let mut input = self.take_pending();
        if !self.warning_sent && now >= self.warning_deadline {
            self.warning_sent = true;
            let warning = prompts::time_warning(self.deadline.saturating_duration_since(now));
            match input.last_mut() {
                Some(last) if last.role == MessageRole::User => {
                    last.content.push_str("\n\n");
                    last.content.push_str(&warning);
                }
                _ => input.push(Message::user(warning)),
            }
        }
        input
    }

    /// Drain pending input without any warning.
    pub fn take_pending(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.pending_input)
    }

    /// Append `input` to the history and build the request for the turn.
    pub fn begin_turn(&mut self, input: Vec<Message>) -> TurnRequest {
        self.history.extend(input);
        TurnRequest::new(self.id.clone(), self.history.clone())
            .with_system(self.system_instructions.clone())
            .with_tools(self.registry.list())
    }

    /// Record the agent's reply. Its tool calls stay outstanding until
    /// [`record_outcomes`](Self::record_outcomes) or
    /// [`close_interrupted_calls`](Self::close_interrupted_calls).
    pub fn record_response(&mut self, output: &TurnOutput) {
        self.history.push(Message::assistant_with_calls(
            output.content.clone(),
            output.tool_calls.clone(),
        ));
        self.awaiting_results = output.tool_calls.clone();
    }

    /// Queue dispatch outcomes as the next turn's input.
    pub fn record_outcomes(&mut self, outcomes: &[ToolOutcome]) {
        self.pending_input
            .extend(outcomes.iter().map(ToolOutcome::to_message));
        self.awaiting_results.clear();
    }

    /// Queue a continuation nudge after a turn with no tool calls.
    pub fn queue_nudge(&mut self, produced_content: bool) {
        let nudge = if produced_content {
            prompts::continue_or_return_nudge()
        } else {
            prompts::CONTINUE_NUDGE.to_string()
        };
        self.pending_input.push(Message::user(nudge));
    }

    pub fn consume_turn(&mut self) {
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
        self.turns_taken += 1;
    }

    /// Answer tool calls whose results never arrived so the conversation
    /// stays well formed.
    pub fn close_interrupted_calls(&mut self) {
        for call in std::mem::take(&mut self.awaiting_results) {
            self.pending_input
                .push(Message::tool(call.id, prompts::INTERRUPTED_CALL_RESULT));
        }
    }
}
