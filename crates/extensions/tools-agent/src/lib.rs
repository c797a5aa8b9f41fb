//! Delegation tools for parent conversations.
//!
//! ## Tools
//!
//! - `spawn_agent` - Request a bounded sub-agent for a self-contained task
//! - `todo` - Session-scoped step list; sub-agents get their own
//!
//! ## Spawning
//!
//! `spawn_agent` does no work itself. Its output is a spawn-request payload
//! that [`AgentHost::process_outcome`] recognizes after dispatch: the host
//! runs the sub-agent through [`delegate_runtime::AgentSessionRunner`] and
//! replaces the payload with the formatted result.

mod extension;
pub mod format;
mod host;
mod tools;

pub use extension::AgentToolsExtension;
pub use format::{detect_spawn_request, format_result};
pub use host::{AgentHost, default_system_instructions, fork_history};
pub use tools::*;
