//! `delegate run`: one delegation round trip against a scripted transport.

use std::sync::Arc;

use anyhow::{Context, anyhow};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use delegate_config::Config;
use delegate_core::ToolRegistry;
use delegate_protocols::control::SPAWN_TOOL_ID;
use delegate_protocols::status::StatusObserver;
use delegate_protocols::types::{Message, ToolCall};
use delegate_runtime::{
    AgentSessionRunner, ScriptedTransport, StatusEmitter, ToolDispatcher, ToolOutcome,
};
use delegate_tools_agent::{AgentHost, AgentToolsExtension, SpawnDefaults};

use crate::cli::RunArgs;

const PARENT_SESSION: &str = "cli";

/// Issue a `spawn_agent` call as the parent would and let the host run it.
pub(crate) async fn run_delegation(
    config: &Config,
    args: &RunArgs,
    observer: Arc<dyn StatusObserver>,
    cancel: CancellationToken,
) -> anyhow::Result<ToolOutcome> {
    let script = tokio::fs::read_to_string(&args.script)
        .await
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let transport = ScriptedTransport::from_json(&script)
        .with_context(|| format!("parsing script {}", args.script.display()))?;

    let extension = AgentToolsExtension::new(SpawnDefaults {
        max_turns: config.agent.default_max_turns,
        timeout_ms: config.agent.default_timeout_ms,
    });
    let parent = Arc::new(ToolRegistry::new());
    extension.register(&parent)?;

    let runner = AgentSessionRunner::new(Arc::new(transport), parent.clone())
        .with_config(config.session_config())
        .with_observer(observer)
        .with_session_tools(extension.session_tools())
        .with_cancel(cancel.clone());
    let mut host = AgentHost::new(runner);
    if let Some(ref instructions) = config.agent.system_instructions {
        host = host.with_system_instructions(instructions.clone());
    }

    let call = spawn_call(args);
    let history = vec![
        Message::user(format!("Delegate the task \"{}\" to a sub-agent.", args.task)),
        Message::assistant_with_calls("", vec![call.clone()]),
    ];

    info!(task = %args.task, "Delegating");
    let dispatcher = ToolDispatcher::new(PARENT_SESSION, StatusEmitter::silent());
    let outcomes = dispatcher.dispatch(&parent, &[call], &cancel).await;
    let outcome = host
        .process_outcomes(outcomes, &history)
        .await
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("dispatch produced no outcome"))?;

    if !outcome.ok {
        warn!(task = %args.task, "Delegation did not succeed");
    }
    Ok(outcome)
}

fn spawn_call(args: &RunArgs) -> ToolCall {
    let mut arguments = json!({
        "task": args.task,
        "instructions": args.instructions,
    });
    if let Some(max_turns) = args.max_turns {
        arguments["max_turns"] = json!(max_turns);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        arguments["timeout_ms"] = json!(timeout_ms);
    }
    ToolCall::new("spawn-1", SPAWN_TOOL_ID, arguments)
}

#[cfg(test)]
#[path = "cmd_run_tests.rs"]
mod tests;
