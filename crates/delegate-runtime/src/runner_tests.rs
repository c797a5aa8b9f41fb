use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use delegate_protocols::status::StatusKind;
use delegate_protocols::transport::TurnEvent;
use delegate_protocols::types::MessageRole;

use crate::scripted::{ScriptedTransport, ScriptedTurn};
use crate::test_support::{
    CollectingObserver, EchoTool, PanickingTool, SlowTool, SpawnStubTool, call, finish_call,
};

const DEFAULT_FAILURE: &str =
    "Agent failed to complete task within time limit and did not provide a summary.";

fn script(turns: Vec<Vec<TurnEvent>>) -> Arc<ScriptedTransport> {
    Arc::new(ScriptedTransport::new(
        turns.into_iter().map(ScriptedTurn::Events).collect(),
    ))
}

fn runner(transport: &Arc<ScriptedTransport>, tools: Vec<Arc<dyn Tool>>) -> AgentSessionRunner {
    AgentSessionRunner::new(transport.clone(), Arc::new(ToolRegistry::from_tools(tools)))
}

fn request(max_turns: u32, timeout_ms: u64) -> AgentTaskRequest {
    AgentTaskRequest::new("count crates", "Count the crates in the workspace.", max_turns, timeout_ms)
}

fn fork() -> Vec<Message> {
    vec![
        Message::user("How big is this repo?"),
        Message::assistant("Let me delegate that."),
    ]
}

#[tokio::test]
async fn test_finish_on_first_turn() {
    let transport = script(vec![
        vec![finish_call("c1", true, "done", "42")],
        vec![TurnEvent::content("never sent")],
    ]);
    let runner = runner(&transport, vec![EchoTool::arc()]);

    let report = runner
        .run_with_report(&request(1, 60_000), fork(), "You are a task agent.")
        .await;

    assert_eq!(report.signal, AgentReturnSignal::new(true, "done", "42"));
    assert_eq!(report.state, SessionState::Returned);
    assert_eq!(report.turns_used, 1);
    assert_eq!(report.summarized, None);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].system.as_deref(), Some("You are a task agent."));
    assert_eq!(requests[0].messages.len(), 3);
    assert_eq!(requests[0].messages[0].content, "How big is this repo?");
    assert_eq!(
        requests[0].last_message().unwrap().content,
        "Count the crates in the workspace."
    );
    assert_eq!(transport.remaining(), 1);
}

#[tokio::test]
async fn test_plain_content_exhausts_then_default_failure() {
    let transport = script(vec![
        vec![TurnEvent::content("thinking 1")],
        vec![TurnEvent::content("thinking 2")],
        vec![TurnEvent::content("thinking 3")],
        vec![TurnEvent::content("I refuse to summarize")],
    ]);
    let runner = runner(&transport, Vec::new());

    let report = runner.run_with_report(&request(3, 60_000), fork(), "sys").await;

    assert_eq!(report.signal, AgentReturnSignal::new(false, DEFAULT_FAILURE, ""));
    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(report.turns_used, 3);
    assert_eq!(report.summarized, Some(SummaryReason::TurnsExhausted));

    let requests = transport.requests();
    assert_eq!(requests.len(), 4);
    let second = requests[1].last_message().unwrap();
    assert_eq!(second.role, MessageRole::User);
    assert!(second.content.contains("`finish`"));
    assert!(requests[3].last_message().unwrap().content.contains("turn limit"));
}

#[tokio::test]
async fn test_single_turn_no_calls_default_failure() {
    let transport = script(vec![Vec::new(), Vec::new()]);
    let runner = runner(&transport, Vec::new());

    let signal = runner.run(&request(1, 60_000), Vec::new(), "sys").await;

    assert_eq!(signal, AgentReturnSignal::new(false, DEFAULT_FAILURE, ""));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_empty_turn_gets_generic_nudge() {
    let transport = script(vec![Vec::new(), vec![finish_call("c1", true, "ok", "")]]);
    let runner = runner(&transport, Vec::new());

    runner.run(&request(2, 60_000), Vec::new(), "sys").await;

    let requests = transport.requests();
    assert_eq!(
        requests[1].last_message().unwrap().content,
        prompts::CONTINUE_NUDGE
    );
}

#[tokio::test(start_paused = true)]
async fn test_warning_on_first_message_when_budget_below_lead() {
    let transport = script(vec![vec![finish_call("c1", true, "quick", "")]]);
    let runner = runner(&transport, Vec::new());

    let signal = runner.run(&request(2, 100), Vec::new(), "sys").await;

    assert!(signal.success);
    let first = transport.requests()[0].last_message().unwrap().clone();
    assert!(first.content.starts_with("Count the crates in the workspace."));
    assert!(first.content.contains("[Time warning]"));
}

#[tokio::test(start_paused = true)]
async fn test_warning_fires_once_on_later_turn() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        ScriptedTurn::Delayed(
            Duration::from_secs(31),
            vec![call("c1", "echo", json!({"text": "hi"}))],
        ),
        ScriptedTurn::Events(vec![call("c2", "echo", json!({"text": "again"}))]),
        ScriptedTurn::Events(vec![finish_call("c3", true, "ok", "")]),
    ]));
    let runner = runner(&transport, vec![EchoTool::arc()]);

    let report = runner.run_with_report(&request(5, 60_000), Vec::new(), "sys").await;
    assert_eq!(report.state, SessionState::Returned);

    let requests = transport.requests();
    assert!(!requests[0].last_message().unwrap().content.contains("[Time warning]"));

    let second = &requests[1].messages;
    let tail = &second[second.len() - 2..];
    assert_eq!(tail[0].role, MessageRole::Tool);
    assert_eq!(tail[0].content, "hi");
    assert_eq!(tail[1].role, MessageRole::User);
    assert!(tail[1].content.contains("[Time warning]"));

    let warnings = requests[2]
        .messages
        .iter()
        .filter(|m| m.content.contains("[Time warning]"))
        .count();
    assert_eq!(warnings, 1);
}

#[tokio::test]
async fn test_unknown_tool_consumes_one_turn() {
    let transport = script(vec![
        vec![call("c1", "ghost", json!({}))],
        vec![finish_call("c2", true, "recovered", "")],
    ]);
    let runner = runner(&transport, Vec::new());

    let report = runner.run_with_report(&request(3, 60_000), Vec::new(), "sys").await;

    assert_eq!(report.state, SessionState::Returned);
    assert_eq!(report.turns_used, 2);
    let second = transport.requests()[1].last_message().unwrap().clone();
    assert_eq!(second.role, MessageRole::Tool);
    assert_eq!(second.tool_call_id.as_deref(), Some("c1"));
    assert_eq!(second.content, "Error: capability ghost not found");
}

#[tokio::test]
async fn test_turn_budget_bound() {
    let mut turns: Vec<Vec<TurnEvent>> = (0..5)
        .map(|i| vec![call(&format!("c{}", i), "echo", json!({"text": i.to_string()}))])
        .collect();
    turns.push(vec![finish_call("s1", false, "partial", "3 of 5")]);
    turns.push(vec![finish_call("late", true, "too late", "")]);
    let transport = script(turns);
    let runner = runner(&transport, vec![EchoTool::arc()]);

    let report = runner.run_with_report(&request(5, 60_000), Vec::new(), "sys").await;

    assert_eq!(report.turns_used, 5);
    assert_eq!(report.summarized, Some(SummaryReason::TurnsExhausted));
    assert_eq!(report.state, SessionState::Returned);
    assert_eq!(report.signal, AgentReturnSignal::new(false, "partial", "3 of 5"));
    assert_eq!(transport.requests().len(), 6);

    let requests = transport.requests();
    let summary = &requests[5].messages;
    let tail = &summary[summary.len() - 2..];
    assert_eq!(tail[0].role, MessageRole::Tool);
    assert_eq!(tail[0].content, "4");
    assert!(tail[1].content.contains("turn limit"));
}

#[tokio::test]
async fn test_first_return_in_batch_wins() {
    let transport = script(vec![
        vec![
            call("c1", "echo", json!({"text": "first"})),
            finish_call("c2", true, "winner", "a"),
            finish_call("c3", false, "loser", "b"),
        ],
        vec![finish_call("c4", false, "never", "")],
    ]);
    let runner = runner(&transport, vec![EchoTool::arc()]);

    let report = runner.run_with_report(&request(4, 60_000), Vec::new(), "sys").await;

    assert_eq!(report.signal, AgentReturnSignal::new(true, "winner", "a"));
    assert_eq!(report.turns_used, 1);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_invalid_finish_arguments_do_not_return() {
    let transport = script(vec![
        vec![call("c1", "finish", json!({"success": true}))],
        vec![finish_call("c2", true, "fixed", "")],
    ]);
    let runner = runner(&transport, Vec::new());

    let report = runner.run_with_report(&request(3, 60_000), Vec::new(), "sys").await;

    assert_eq!(report.turns_used, 2);
    assert_eq!(report.signal.description, "fixed");
    let feedback = transport.requests()[1].last_message().unwrap().clone();
    assert!(feedback.content.starts_with("Error: Invalid parameters"));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_during_stalled_turn() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        ScriptedTurn::Stall,
        ScriptedTurn::Events(vec![finish_call("s1", false, "ran out of time", "half")]),
    ]));
    let runner = runner(&transport, Vec::new());
    let start = Instant::now();

    let report = runner.run_with_report(&request(10, 1_000), Vec::new(), "sys").await;

    assert!(start.elapsed() >= Duration::from_millis(1_000));
    assert_eq!(report.summarized, Some(SummaryReason::DeadlineReached));
    assert_eq!(report.state, SessionState::Returned);
    assert_eq!(report.signal, AgentReturnSignal::new(false, "ran out of time", "half"));
    assert_eq!(report.turns_used, 0);

    let summary = transport.requests()[1].last_message().unwrap().clone();
    assert!(summary.content.contains("time limit"));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_interrupts_tool_call() {
    let transport = script(vec![
        vec![call("c1", "slow", json!({}))],
        vec![finish_call("s1", false, "interrupted", "")],
    ]);
    let runner = runner(&transport, vec![SlowTool::arc(Duration::from_secs(60))]);

    let report = runner.run_with_report(&request(10, 1_000), Vec::new(), "sys").await;

    assert_eq!(report.summarized, Some(SummaryReason::DeadlineReached));
    assert_eq!(report.signal.description, "interrupted");

    let requests = transport.requests();
    let summary = &requests[1].messages;
    let tail = &summary[summary.len() - 2..];
    assert_eq!(tail[0].role, MessageRole::Tool);
    assert_eq!(tail[0].tool_call_id.as_deref(), Some("c1"));
    assert_eq!(tail[0].content, prompts::INTERRUPTED_CALL_RESULT);
    assert_eq!(tail[1].role, MessageRole::User);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_then_failed_summary() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        ScriptedTurn::Stall,
        ScriptedTurn::Fail("connection reset".to_string()),
    ]));
    let runner = runner(&transport, Vec::new());

    let report = runner.run_with_report(&request(10, 500), Vec::new(), "sys").await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(report.signal, AgentReturnSignal::new(false, DEFAULT_FAILURE, ""));
}

#[tokio::test]
async fn test_transport_error_while_running() {
    let transport = Arc::new(ScriptedTransport::new(vec![ScriptedTurn::Fail(
        "connection reset".to_string(),
    )]));
    let runner = runner(&transport, Vec::new());

    let report = runner.run_with_report(&request(3, 60_000), Vec::new(), "sys").await;

    assert_eq!(report.state, SessionState::Failed);
    assert!(!report.signal.success);
    assert!(report
        .signal
        .description
        .starts_with("Agent failed to execute: transport error:"));
    assert!(report.signal.description.contains("connection reset"));
    assert_eq!(report.signal.result, "");
}

#[tokio::test]
async fn test_invalid_request_fails_without_turns() {
    let transport = script(Vec::new());
    let runner = runner(&transport, Vec::new());

    let signal = runner.run(&request(0, 60_000), Vec::new(), "sys").await;

    assert_eq!(
        signal,
        AgentReturnSignal::failure(
            "Agent failed to execute: invalid task request: max_turns must be greater than zero"
        )
    );
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_panicking_tool_is_contained() {
    let transport = script(vec![
        vec![call("c1", "panicking", json!({})), call("c2", "echo", json!({"text": "fine"}))],
        vec![finish_call("c3", true, "survived", "")],
    ]);
    let runner = runner(&transport, vec![PanickingTool::arc(), EchoTool::arc()]);

    let report = runner.run_with_report(&request(3, 60_000), Vec::new(), "sys").await;

    assert_eq!(report.signal.description, "survived");
    let requests = transport.requests();
    let second = &requests[1].messages;
    let tail = &second[second.len() - 2..];
    assert!(tail[0].content.contains("kaboom"));
    assert_eq!(tail[1].content, "fine");
}

#[tokio::test]
async fn test_panicking_session_tool_factory() {
    let transport = script(Vec::new());
    let factory: SessionToolFactory =
        Arc::new(|| -> Vec<Arc<dyn Tool>> { panic!("factory exploded") });
    let runner = runner(&transport, Vec::new()).with_session_tools(factory);

    let signal = runner.run(&request(3, 60_000), Vec::new(), "sys").await;

    assert!(!signal.success);
    assert!(signal.description.starts_with("Agent failed to execute: session panicked"));
    assert!(signal.description.contains("factory exploded"));
}

#[tokio::test]
async fn test_registry_isolation() {
    let transport = script(vec![vec![finish_call("c1", true, "done", "")]]);
    let parent = Arc::new(ToolRegistry::from_tools(vec![
        EchoTool::arc(),
        SpawnStubTool::arc(),
    ]));
    let runner = AgentSessionRunner::new(transport.clone(), parent.clone()).with_session_tools(
        Arc::new(|| vec![SpawnStubTool::arc(), PanickingTool::arc()]),
    );

    runner.run(&request(2, 60_000), Vec::new(), "sys").await;

    let requests = transport.requests();
    let tools = &requests[0].tools;
    let ids: Vec<&str> = tools.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["echo", "finish", "panicking"]);
    assert_eq!(ids.iter().filter(|id| **id == "finish").count(), 1);

    assert_eq!(parent.ids(), vec!["echo", "spawn_agent"]);
}

#[tokio::test]
async fn test_session_tools_are_fresh_per_run() {
    let transport = script(vec![
        vec![finish_call("a", true, "one", "")],
        vec![finish_call("b", true, "two", "")],
    ]);
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let runner = runner(&transport, Vec::new()).with_session_tools(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        vec![EchoTool::arc()]
    }));

    runner.run(&request(1, 60_000), Vec::new(), "sys").await;
    runner.run(&request(1, 60_000), Vec::new(), "sys").await;

    assert_eq!(built.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_status_events() {
    let transport = script(vec![
        vec![
            TurnEvent::content("Checking the workspace"),
            call("c1", "echo", json!({"text": "3 crates"})),
        ],
        vec![finish_call("c2", true, "counted", "3")],
    ]);
    let observer = CollectingObserver::new();
    let runner = runner(&transport, vec![EchoTool::arc()]).with_observer(observer.clone());

    runner.run(&request(3, 60_000), Vec::new(), "sys").await;

    let kinds = observer.kinds();
    assert_eq!(kinds.first(), Some(&StatusKind::Start));
    assert_eq!(kinds.last(), Some(&StatusKind::Completion));
    assert!(kinds.contains(&StatusKind::Thinking));
    assert_eq!(observer.messages(StatusKind::ToolCall).len(), 2);
    assert_eq!(observer.messages(StatusKind::ToolResult).len(), 2);
    assert!(observer.events().iter().all(|e| e.agent == "count crates"));
    assert_eq!(observer.messages(StatusKind::Completion), vec!["counted"]);
}

#[tokio::test]
async fn test_failed_session_emits_error_status() {
    let transport = script(vec![Vec::new(), Vec::new()]);
    let observer = CollectingObserver::new();
    let runner = runner(&transport, Vec::new()).with_observer(observer.clone());

    runner.run(&request(1, 60_000), Vec::new(), "sys").await;

    assert_eq!(observer.kinds().last(), Some(&StatusKind::Error));
}

struct ExplodingObserver;

impl StatusObserver for ExplodingObserver {
    fn observe(&self, _event: delegate_protocols::status::StatusEvent) {
        panic!("observer exploded");
    }
}

#[tokio::test]
async fn test_panicking_observer_does_not_affect_session() {
    let transport = script(vec![vec![
        TurnEvent::content("on it"),
        call("c1", "echo", json!({"text": "x"})),
        finish_call("c2", true, "done", "42"),
    ]]);
    let runner = runner(&transport, vec![EchoTool::arc()]).with_observer(Arc::new(ExplodingObserver));

    let report = runner.run_with_report(&request(2, 60_000), fork(), "sys").await;

    assert_eq!(report.state, SessionState::Returned);
    assert_eq!(report.signal, AgentReturnSignal::new(true, "done", "42"));
    assert_eq!(report.turns_used, 1);
}

#[tokio::test(start_paused = true)]
async fn test_parent_cancellation_fails_session() {
    let transport = Arc::new(ScriptedTransport::new(vec![ScriptedTurn::Stall]));
    let cancel = CancellationToken::new();
    let runner = runner(&transport, Vec::new()).with_cancel(cancel.clone());

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    let report = runner.run_with_report(&request(3, 60_000), Vec::new(), "sys").await;

    assert_eq!(report.state, SessionState::Failed);
    assert!(report.signal.description.starts_with("Agent failed to execute"));
}

#[test]
fn test_session_config_default() {
    let config = SessionConfig::default();
    assert_eq!(config.warning_lead, Duration::from_secs(30));
    assert_eq!(config.preview_chars, 80);
}

#[test]
fn test_session_tool_definitions() {
    let transport = script(Vec::new());
    let runner = runner(&transport, vec![EchoTool::arc(), SpawnStubTool::arc()]);
    let ids: Vec<String> = runner
        .session_tool_definitions()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec!["echo", "finish"]);
}
