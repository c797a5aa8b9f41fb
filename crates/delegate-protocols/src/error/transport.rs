//! Conversation transport errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Context length exceeded: {used} tokens used, {max} tokens allowed")]
    ContextLengthExceeded { used: usize, max: usize },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Turn was cancelled")]
    Cancelled,
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
