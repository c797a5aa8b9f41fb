//! Agent session errors.
//!
//! These never escape the session runner: they are folded into a failed
//! [`AgentReturnSignal`](crate::control::AgentReturnSignal).

use thiserror::Error;

use super::TransportError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid task request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("summarization failed: {0}")]
    Summarization(String),

    #[error("session panicked: {0}")]
    Panicked(String),
}
