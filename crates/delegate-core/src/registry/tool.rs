//! Tool registry for managing available tools.

use std::sync::Arc;

use tracing::debug;

use delegate_protocols::error::ExtensionError;
use delegate_protocols::tool::{Tool, ToolDefinition};

use super::base::{BaseRegistry, Registerable};

impl Registerable for dyn Tool {
    fn registry_id(&self) -> &str {
        &self.definition().id
    }
}

/// Registry for managing tools.
///
/// Each session owns its own registry. Sub-agent registries are produced
/// with [`ToolRegistry::derive`], never by mutating the parent's.
pub struct ToolRegistry {
    inner: BaseRegistry<dyn Tool>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new() -> Self {
        Self {
            inner: BaseRegistry::new(),
        }
    }

    /// Build a registry from a list of tools; later tools replace earlier
    /// ones with the same id.
    pub fn from_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        let registry = Self::new();
        for tool in tools {
            registry.inner.upsert(tool);
        }
        registry
    }

    /// Register a tool.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), ExtensionError> {
        self.inner.register(tool)
    }

    /// Unregister a tool.
    pub fn unregister(&self, id: &str) -> Result<(), ExtensionError> {
        self.inner.unregister(id)
    }

    /// Get a tool by ID.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.inner.get(id)
    }

    /// Check whether a tool is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.contains(id)
    }

    /// All tools, sorted by id.
    pub fn all(&self) -> Vec<Arc<dyn Tool>> {
        self.inner.values()
    }

    /// List all tool definitions, sorted by id.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.all().iter().map(|t| t.definition().clone()).collect()
    }

    /// Sorted tool ids.
    pub fn ids(&self) -> Vec<String> {
        self.inner.list_ids()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Produce a new registry without the `exclude`d tools and with `add`
    /// layered on top. Tools in `add` replace same-id tools. The source
    /// registry is left untouched.
    pub fn derive(&self, exclude: &[&str], add: Vec<Arc<dyn Tool>>) -> ToolRegistry {
        let derived = ToolRegistry::new();
        for tool in self.all() {
            if !exclude.contains(&tool.definition().id.as_str()) {
                derived.inner.upsert(tool);
            }
        }
        for tool in add {
            if let Some(replaced) = derived.inner.upsert(tool) {
                debug!("Derived registry replaced tool {}", replaced.definition().id);
            }
        }
        derived
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.ids())
            .finish()
    }
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
