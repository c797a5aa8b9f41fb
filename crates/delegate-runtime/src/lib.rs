//! # Delegate Runtime
//!
//! Runs bounded task-agent sessions: a turn loop raced against a hard
//! deadline, concurrent tool dispatch with per-call fault containment,
//! return-signal detection and a one-shot fallback summarization.

pub mod dispatcher;
pub mod finish;
pub mod observer;
pub mod prompts;
pub mod runner;
pub mod scripted;
pub mod session;
pub mod turn;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::{ToolDispatcher, ToolOutcome};
pub use finish::FinishTool;
pub use observer::{
    ChannelStatusObserver, StatusEmitter, StatusEventStream, TracingStatusObserver,
};
pub use runner::{
    AgentSessionRunner, SessionConfig, SessionReport, SessionToolFactory, SummaryReason,
};
pub use scripted::{ScriptedTransport, ScriptedTurn};
pub use session::{AgentSession, SessionState};
pub use turn::{TurnDriver, TurnOutput};
