//! Fixed directive strings injected into a sub-agent conversation.

use std::time::Duration;

use delegate_protocols::FINISH_TOOL_ID;

/// Description of the default failure when summarization yields nothing.
pub const SUMMARY_MISSING_DESCRIPTION: &str =
    "Agent failed to complete task within time limit and did not provide a summary.";

/// Sent after a turn with neither content nor tool calls.
pub const CONTINUE_NUDGE: &str = "Continue working on the task.";

/// Tool-result text for calls cut off by the deadline.
pub const INTERRUPTED_CALL_RESULT: &str =
    "Error: call interrupted because the session deadline was reached";

/// Sent after a turn that produced text but no tool calls.
pub fn continue_or_return_nudge() -> String {
    format!(
        "Continue working on the task. If it is complete, call the `{}` tool with your result.",
        FINISH_TOOL_ID
    )
}

/// Appended once the warning lead has been reached.
pub fn time_warning(remaining: Duration) -> String {
    format!(
        "[Time warning] About {} seconds remain before this task is stopped. \
         Wrap up now and call `{}` with what you have.",
        remaining.as_secs(),
        FINISH_TOOL_ID
    )
}

/// Why the runner is forcing a summary.
pub fn summarize_directive(deadline_reached: bool) -> String {
    let reason = if deadline_reached {
        "The time limit for this task has been reached."
    } else {
        "The turn limit for this task has been reached."
    };
    format!(
        "{} Stop working and call the `{}` tool immediately. Set `success` to whether the \
         task is fully done, summarize the progress made in `description`, and put any \
         partial output in `result`.",
        reason, FINISH_TOOL_ID
    )
}

/// Description for a session that failed outside the summarization path.
pub fn execution_failure(message: &str) -> String {
    format!("Agent failed to execute: {}", message)
}
