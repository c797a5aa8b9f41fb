//! Agent tools extension.

use std::sync::Arc;

use delegate_core::ToolRegistry;
use delegate_protocols::error::ExtensionError;
use delegate_protocols::tool::Tool;
use delegate_runtime::SessionToolFactory;

use crate::tools::{SpawnAgentTool, SpawnDefaults, TodoTool};

/// Installs the delegation tools.
///
/// The parent conversation gets `spawn_agent` and its own `todo` list.
/// Sub-agents get a fresh `todo` list per session through
/// [`session_tools`](Self::session_tools).
#[derive(Debug, Clone, Default)]
pub struct AgentToolsExtension {
    defaults: SpawnDefaults,
}

impl AgentToolsExtension {
    pub fn new(defaults: SpawnDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> SpawnDefaults {
        self.defaults
    }

    /// Register the parent-side tools.
    pub fn register(&self, registry: &ToolRegistry) -> Result<(), ExtensionError> {
        registry.register(Arc::new(SpawnAgentTool::new(self.defaults)))?;
        registry.register(Arc::new(TodoTool::new()))?;

        tracing::info!(
            "Agent tools registered (default_max_turns={}, default_timeout_ms={})",
            self.defaults.max_turns,
            self.defaults.timeout_ms
        );
        Ok(())
    }

    /// Factory for per-session tools.
    pub fn session_tools(&self) -> SessionToolFactory {
        Arc::new(|| vec![Arc::new(TodoTool::new()) as Arc<dyn Tool>])
    }
}

#[cfg(test)]
#[path = "extension_tests.rs"]
mod tests;
