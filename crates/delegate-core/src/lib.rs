//! # Delegate Core
//!
//! Tool registries for agent sessions.
//!
//! ## Components
//!
//! - [`ToolRegistry`] - Tools available to one session, with
//!   [`ToolRegistry::derive`] producing the isolated copy handed to a
//!   sub-agent

pub mod registry;

pub use registry::ToolRegistry;
