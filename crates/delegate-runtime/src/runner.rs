//! Bounded agent session runner.
//!
//! The runner owns the sub-agent state machine:
//!
//! ```text
//! INIT -> RUNNING -> (RETURNED | EXHAUSTED) -> SUMMARIZING -> (RETURNED | FAILED)
//! ```
//!
//! RUNNING races the turn loop against the hard deadline. When the deadline
//! wins, the running cancellation token is cancelled, the loop is dropped and
//! the session moves straight to SUMMARIZING with whatever history it has.
//! SUMMARIZING runs exactly one more turn on a fresh token with no timeout.
//!
//! [`AgentSessionRunner::run`] never fails: every error, including panics in
//! tools or in the session itself, is folded into a failed
//! [`AgentReturnSignal`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use delegate_core::ToolRegistry;
use delegate_protocols::control::{AgentReturnSignal, AgentTaskRequest, FINISH_TOOL_ID, SPAWN_TOOL_ID};
use delegate_protocols::error::SessionError;
use delegate_protocols::status::{StatusKind, StatusObserver};
use delegate_protocols::tool::{Tool, ToolDefinition};
use delegate_protocols::transport::ConversationTransport;
use delegate_protocols::types::Message;

use crate::dispatcher::{ToolDispatcher, ToolOutcome, panic_message};
use crate::finish::FinishTool;
use crate::observer::StatusEmitter;
use crate::prompts;
use crate::session::{AgentSession, SessionState};
use crate::turn::TurnDriver;

/// Builds tools that must be fresh for every session, such as tools that
/// keep per-session counters.
pub type SessionToolFactory = Arc<dyn Fn() -> Vec<Arc<dyn Tool>> + Send + Sync>;

/// Tunables shared by every session a runner starts.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long before the deadline the agent is told to wrap up.
    pub warning_lead: Duration,
    /// Maximum characters in status previews.
    pub preview_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            warning_lead: Duration::from_secs(30),
            preview_chars: 80,
        }
    }
}

/// Why a session was forced into summarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryReason {
    TurnsExhausted,
    DeadlineReached,
}

/// Outcome of one session run.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub signal: AgentReturnSignal,
    /// Terminal state, `Returned` or `Failed`.
    pub state: SessionState,
    /// Turns consumed by the running phase.
    pub turns_used: u32,
    /// Set when the signal came from (or was missing after) summarization.
    pub summarized: Option<SummaryReason>,
}

impl SessionReport {
    fn failed(description: String) -> Self {
        Self {
            signal: AgentReturnSignal::failure(description),
            state: SessionState::Failed,
            turns_used: 0,
            summarized: None,
        }
    }
}

enum LoopOutcome {
    Returned(AgentReturnSignal),
    Exhausted,
}

/// Runs sub-agent sessions against a transport and a parent tool registry.
pub struct AgentSessionRunner {
    driver: TurnDriver,
    tools: Arc<ToolRegistry>,
    config: SessionConfig,
    observer: Option<Arc<dyn StatusObserver>>,
    session_tools: Option<SessionToolFactory>,
    cancel: CancellationToken,
}

impl AgentSessionRunner {
    /// `tools` is the parent's registry; each session works on a derived
    /// copy without the spawn tool and with the finish tool added.
    pub fn new(transport: Arc<dyn ConversationTransport>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            driver: TurnDriver::new(transport),
            tools,
            config: SessionConfig::default(),
            observer: None,
            session_tools: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn StatusObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_session_tools(mut self, factory: SessionToolFactory) -> Self {
        self.session_tools = Some(factory);
        self
    }

    /// Parent token; cancelling it stops every session started by this
    /// runner, including summarization.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Definitions of the tools a session started now would see.
    pub fn session_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.derive_registry().list()
    }

    /// Run one session to completion and return its signal.
    pub async fn run(
        &self,
        request: &AgentTaskRequest,
        forked_history: Vec<Message>,
        system_instructions: &str,
    ) -> AgentReturnSignal {
        self.run_with_report(request, forked_history, system_instructions)
            .await
            .signal
    }

    /// Like [`run`](Self::run), with the terminal state and turn count.
    pub async fn run_with_report(
        &self,
        request: &AgentTaskRequest,
        forked_history: Vec<Message>,
        system_instructions: &str,
    ) -> SessionReport {
        let status = StatusEmitter::new(
            self.observer.clone(),
            request.task.clone(),
            self.config.preview_chars,
        );
        let span = info_span!("agent_session", task = %request.task);

        let attempt = AssertUnwindSafe(self.execute(
            request,
            forked_history,
            system_instructions,
            &status,
        ))
        .catch_unwind()
        .instrument(span)
        .await;

        let report = match attempt {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                warn!(task = %request.task, error = %e, "Agent session failed");
                SessionReport::failed(prompts::execution_failure(&e.to_string()))
            }
            Err(panic) => {
                let e = SessionError::Panicked(panic_message(panic.as_ref()));
                warn!(task = %request.task, error = %e, "Agent session panicked");
                SessionReport::failed(prompts::execution_failure(&e.to_string()))
            }
        };

        match report.state {
            SessionState::Returned => status.emit(
                StatusKind::Completion,
                status.preview(&report.signal.description),
            ),
            _ => status.emit(StatusKind::Error, status.preview(&report.signal.description)),
        }
        report
    }

    async fn execute(
        &self,
        request: &AgentTaskRequest,
        forked_history: Vec<Message>,
        system_instructions: &str,
        status: &StatusEmitter,
    ) -> Result<SessionReport, SessionError> {
        request.validate().map_err(SessionError::InvalidRequest)?;

        let registry = self.derive_registry();
        let mut session = AgentSession::new(
            request,
            forked_history,
            system_instructions,
            registry,
            self.config.warning_lead,
        );
        info!(
            session_id = session.id(),
            max_turns = request.max_turns,
            timeout_ms = request.timeout_ms,
            tools = ?session.registry().ids(),
            "Starting agent session"
        );
        status.emit(StatusKind::Start, status.preview(&request.instructions));
        session.transition(SessionState::Running);

        let dispatcher = ToolDispatcher::new(session.id(), status.clone());
        let running = self.cancel.child_token();
        let deadline = session.deadline();

        let outcome = {
            let turn_loop = self.turn_loop(&mut session, &dispatcher, status, &running);
            tokio::select! {
                biased;
                result = turn_loop => Some(result?),
                _ = tokio::time::sleep_until(deadline) => None,
            }
        };

        let reason = match outcome {
            Some(LoopOutcome::Returned(signal)) => {
                info!(
                    session_id = session.id(),
                    turns = session.turns_taken(),
                    success = signal.success,
                    "Agent returned"
                );
                session.transition(SessionState::Returned);
                return Ok(SessionReport {
                    signal,
                    state: session.state(),
                    turns_used: session.turns_taken(),
                    summarized: None,
                });
            }
            Some(LoopOutcome::Exhausted) => {
                info!(
                    session_id = session.id(),
                    turns = session.turns_taken(),
                    "Turn budget exhausted without a return"
                );
                session.transition(SessionState::Exhausted);
                SummaryReason::TurnsExhausted
            }
            None => {
                running.cancel();
                session.close_interrupted_calls();
                warn!(
                    session_id = session.id(),
                    turns = session.turns_taken(),
                    "Deadline reached before the agent returned"
                );
                SummaryReason::DeadlineReached
            }
        };

        session.transition(SessionState::Summarizing);
        let signal = match self.summarize(&mut session, reason, &dispatcher, status).await {
            Some(signal) => {
                session.transition(SessionState::Returned);
                signal
            }
            None => {
                session.transition(SessionState::Failed);
                AgentReturnSignal::failure(prompts::SUMMARY_MISSING_DESCRIPTION)
            }
        };

        Ok(SessionReport {
            signal,
            state: session.state(),
            turns_used: session.turns_taken(),
            summarized: Some(reason),
        })
    }

    /// Parent tools minus spawn and finish, plus per-session tools, plus
    /// this session's own finish tool.
    fn derive_registry(&self) -> ToolRegistry {
        let mut add: Vec<Arc<dyn Tool>> = match &self.session_tools {
            Some(factory) => factory()
                .into_iter()
                .filter(|tool| tool.definition().id != SPAWN_TOOL_ID)
                .collect(),
            None => Vec::new(),
        };
        add.push(Arc::new(FinishTool::new()));
        self.tools.derive(&[SPAWN_TOOL_ID, FINISH_TOOL_ID], add)
    }

    async fn turn_loop(
        &self,
        session: &mut AgentSession,
        dispatcher: &ToolDispatcher,
        status: &StatusEmitter,
        cancel: &CancellationToken,
    ) -> Result<LoopOutcome, SessionError> {
        while session.turns_remaining() > 0 {
            let input = session.take_outbound(Instant::now());
            let request = session.begin_turn(input);
            debug!(
                session_id = session.id(),
                turn = session.turns_taken() + 1,
                remaining = session.turns_remaining(),
                "Running turn"
            );

            let output = self.driver.run(request, cancel, status).await?;
            session.record_response(&output);

            if output.tool_calls.is_empty() {
                session.queue_nudge(!output.content.trim().is_empty());
                session.consume_turn();
                continue;
            }

            let outcomes = dispatcher
                .dispatch(session.registry(), &output.tool_calls, cancel)
                .await;
            session.record_outcomes(&outcomes);
            session.consume_turn();

            if let Some(signal) = outcomes.iter().find_map(ToolOutcome::return_signal) {
                return Ok(LoopOutcome::Returned(signal));
            }
        }
        Ok(LoopOutcome::Exhausted)
    }

    async fn summarize(
        &self,
        session: &mut AgentSession,
        reason: SummaryReason,
        dispatcher: &ToolDispatcher,
        status: &StatusEmitter,
    ) -> Option<AgentReturnSignal> {
        let cancel = self.cancel.child_token();
        let attempt = AssertUnwindSafe(self.summary_turn(session, reason, dispatcher, status, &cancel))
            .catch_unwind()
            .await;

        let result = match attempt {
            Ok(result) => result,
            Err(panic) => Err(SessionError::Panicked(panic_message(panic.as_ref()))),
        };
        match result {
            Ok(signal) => Some(signal),
            Err(e) => {
                warn!(session_id = session.id(), error = %e, "Summarization produced no result");
                None
            }
        }
    }

    async fn summary_turn(
        &self,
        session: &mut AgentSession,
        reason: SummaryReason,
        dispatcher: &ToolDispatcher,
        status: &StatusEmitter,
        cancel: &CancellationToken,
    ) -> Result<AgentReturnSignal, SessionError> {
        let mut input = session.take_pending();
        input.push(Message::user(prompts::summarize_directive(
            reason == SummaryReason::DeadlineReached,
        )));
        let request = session.begin_turn(input);

        let output = self
            .driver
            .run(request, cancel, status)
            .await
            .map_err(|e| SessionError::Summarization(e.to_string()))?;
        session.record_response(&output);

        let outcomes = dispatcher
            .dispatch(session.registry(), &output.tool_calls, cancel)
            .await;
        session.record_outcomes(&outcomes);

        outcomes
            .iter()
            .find_map(ToolOutcome::return_signal)
            .ok_or_else(|| SessionError::Summarization("no return signal in summary turn".to_string()))
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
