//! Spawn-request detection and sub-agent result formatting.

use delegate_protocols::control::{AgentReturnSignal, AgentTaskRequest, decode_spawn_request};

/// Recognize a spawn request inside a tool-result payload.
pub fn detect_spawn_request(payload: &str) -> Option<AgentTaskRequest> {
    decode_spawn_request(payload)
}

/// Render a sub-agent's signal as content for the parent conversation.
///
/// The `Result:` section is present only when the signal carries a
/// non-empty result.
pub fn format_result(task: &str, signal: &AgentReturnSignal) -> String {
    let status = if signal.success { "success" } else { "failure" };
    let mut out = format!(
        "Task agent finished: {}\nStatus: {}\nDescription: {}",
        task, status, signal.description
    );
    if !signal.result.is_empty() {
        out.push_str("\n\nResult:\n");
        out.push_str(&signal.result);
    }
    out
}
