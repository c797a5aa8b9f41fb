//! Configuration schema definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use delegate_runtime::SessionConfig;

mod schema_logging;

pub use schema_logging::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Runtime tunables for every session the runner starts.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            warning_lead: Duration::from_millis(self.agent.warning_lead_ms),
            preview_chars: self.agent.preview_chars,
        }
    }
}

/// Sub-agent budgets and prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Turn budget when a spawn request leaves it out.
    #[serde(default = "default_max_turns")]
    pub default_max_turns: u32,

    /// Time budget in milliseconds when a spawn request leaves it out.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// How long before the deadline the agent is warned.
    #[serde(default = "default_warning_lead_ms")]
    pub warning_lead_ms: u64,

    /// Maximum characters in status-event previews.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Replaces the generated sub-agent system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instructions: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            default_max_turns: default_max_turns(),
            default_timeout_ms: default_timeout_ms(),
            warning_lead_ms: default_warning_lead_ms(),
            preview_chars: default_preview_chars(),
            system_instructions: None,
        }
    }
}

fn default_max_turns() -> u32 {
    20
}

fn default_timeout_ms() -> u64 {
    300_000
}

fn default_warning_lead_ms() -> u64 {
    30_000
}

fn default_preview_chars() -> usize {
    80
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
