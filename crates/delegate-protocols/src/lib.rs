//! # Delegate Protocols
//!
//! Core protocol definitions for the delegate sub-agent runtime.
//! Contains interface definitions and the control-message codec - no
//! orchestration logic.
//!
//! ## Core Traits
//!
//! - [`Tool`] - Trait for tool implementations
//! - [`ConversationTransport`] - Trait for sending one turn to a model
//! - [`StatusObserver`] - Sink for human-readable progress events
//!
//! ## Control Protocol
//!
//! [`ControlMessage`] recognizes the spawn requests and agent return signals
//! carried inside ordinary tool-result payloads.

pub mod control;
pub mod error;
pub mod status;
pub mod tool;
pub mod transport;
pub mod types;

// Re-export core traits
pub use control::{AgentReturnSignal, AgentTaskRequest, ControlMessage, FINISH_TOOL_ID, SPAWN_TOOL_ID};
pub use error::{ExtensionError, SessionError, ToolError, TransportError};
pub use status::{StatusEvent, StatusKind, StatusObserver};
pub use tool::{Tool, ToolContext, ToolDefinition, ToolResult};
pub use transport::{ConversationTransport, TurnEvent, TurnRequest, TurnStream};
pub use types::*;
