//! Host-side handling of spawn requests.
//!
//! The spawn tool only produces a request payload. [`AgentHost`] sits between
//! the parent's tool dispatch and the next turn: when an outcome carries a
//! spawn request it runs the sub-agent and substitutes the formatted result.

use std::collections::HashSet;

use tracing::{debug, info};

use delegate_protocols::control::FINISH_TOOL_ID;
use delegate_protocols::tool::ToolDefinition;
use delegate_protocols::types::{Message, MessageRole};
use delegate_runtime::{AgentSessionRunner, ToolOutcome};

use crate::format::{detect_spawn_request, format_result};

/// Stands in for the spawning call's result inside the sub-agent's history.
pub const DELEGATED_CALL_RESULT: &str =
    "Delegated to a task agent. You are that agent; its result will be returned here.";

/// Stands in for sibling calls whose results the sub-agent cannot see.
pub const UNAVAILABLE_CALL_RESULT: &str = "Result not available to the task agent.";

/// Runs sub-agents on behalf of a parent conversation.
pub struct AgentHost {
    runner: AgentSessionRunner,
    system_instructions: Option<String>,
}

impl AgentHost {
    pub fn new(runner: AgentSessionRunner) -> Self {
        Self {
            runner,
            system_instructions: None,
        }
    }

    /// Replace the generated sub-agent system prompt.
    pub fn with_system_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.system_instructions = Some(instructions.into());
        self
    }

    pub fn runner(&self) -> &AgentSessionRunner {
        &self.runner
    }

    /// System prompt handed to every sub-agent.
    pub fn system_instructions(&self) -> String {
        match &self.system_instructions {
            Some(instructions) => instructions.clone(),
            None => default_system_instructions(&self.runner.session_tool_definitions()),
        }
    }

    /// Pass `outcome` through, or run the sub-agent it requests.
    ///
    /// `history` is the parent conversation so far; the sub-agent receives
    /// its own copy, see [`fork_history`].
    pub async fn process_outcome(&self, outcome: ToolOutcome, history: &[Message]) -> ToolOutcome {
        if !outcome.ok {
            return outcome;
        }
        let Some(request) = outcome.output.as_deref().and_then(detect_spawn_request) else {
            return outcome;
        };

        info!(task = %request.task, call_id = %outcome.request.id, "Running sub-agent");
        let signal = self
            .runner
            .run(
                &request,
                fork_history(history, &outcome.request.id),
                &self.system_instructions(),
            )
            .await;
        debug!(task = %request.task, success = signal.success, "Sub-agent returned");

        let content = format_result(&request.task, &signal);
        if signal.success {
            ToolOutcome::success(outcome.request, content)
        } else {
            ToolOutcome::failure(outcome.request, content)
        }
    }

    /// Process a batch in request order. Sub-agents run one at a time.
    pub async fn process_outcomes(
        &self,
        outcomes: Vec<ToolOutcome>,
        history: &[Message],
    ) -> Vec<ToolOutcome> {
        let mut processed = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            processed.push(self.process_outcome(outcome, history).await);
        }
        processed
    }
}

/// Copy `history` for a sub-agent, answering every call of the trailing
/// assistant message that has no tool result yet. The call that spawned the
/// sub-agent gets [`DELEGATED_CALL_RESULT`].
pub fn fork_history(history: &[Message], spawn_call_id: &str) -> Vec<Message> {
    let mut fork = history.to_vec();
    let Some(last_assistant) = history
        .iter()
        .rposition(|m| m.role == MessageRole::Assistant)
    else {
        return fork;
    };

    let answered: HashSet<&str> = history[last_assistant + 1..]
        .iter()
        .filter_map(|m| m.tool_call_id.as_deref())
        .collect();
    for call in &history[last_assistant].tool_calls {
        if answered.contains(call.id.as_str()) {
            continue;
        }
        let content = if call.id == spawn_call_id {
            DELEGATED_CALL_RESULT
        } else {
            UNAVAILABLE_CALL_RESULT
        };
        fork.push(Message::tool(call.id.clone(), content));
    }
    fork
}

/// Build the sub-agent system prompt from the tools it will have.
pub fn default_system_instructions(tools: &[ToolDefinition]) -> String {
    let mut prompt = String::from(
        "You are a task agent working on one delegated task. Work through it using \
         the tools below. You have a limited number of turns and a time limit.\n\n\
         Available tools:\n",
    );
    for tool in tools {
        prompt.push_str(&format!("- `{}`: {}\n", tool.id, tool.description));
    }
    prompt.push_str(&format!(
        "\nWhen you are done, call `{}` exactly once with `success` (whether the \
         task was accomplished), `description` (a short summary of what you did) \
         and `result` (the full output the requester needs). Nothing you write \
         outside `{}` is returned to the requester.",
        FINISH_TOOL_ID, FINISH_TOOL_ID
    ));
    prompt
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
