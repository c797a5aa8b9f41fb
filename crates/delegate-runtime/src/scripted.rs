//! Script-driven conversation transport.
//!
//! Replays a fixed sequence of turns. Used by the CLI's offline `run` command
//! and throughout the tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use parking_lot::Mutex;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use delegate_protocols::error::TransportError;
use delegate_protocols::transport::{ConversationTransport, TurnEvent, TurnRequest, TurnStream};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum ScriptedTurn {
    /// Yield these events and end the turn.
    Events(Vec<TurnEvent>),
    /// Wait, then yield these events.
    Delayed(Duration, Vec<TurnEvent>),
    /// Fail the turn before any event is produced.
    Fail(String),
    /// Never produce anything.
    Stall,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScriptEntry {
    Events(Vec<TurnEvent>),
    Delayed {
        delay_ms: u64,
        #[serde(default)]
        events: Vec<TurnEvent>,
    },
    Fail {
        fail: String,
    },
}

impl From<ScriptEntry> for ScriptedTurn {
    fn from(entry: ScriptEntry) -> Self {
        match entry {
            ScriptEntry::Events(events) => ScriptedTurn::Events(events),
            ScriptEntry::Delayed { delay_ms, events } => {
                ScriptedTurn::Delayed(Duration::from_millis(delay_ms), events)
            }
            ScriptEntry::Fail { fail } => ScriptedTurn::Fail(fail),
        }
    }
}

/// Transport that replays scripted turns in order. Once the script runs
/// out every further turn is empty.
pub struct ScriptedTransport {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    requests: Mutex<Vec<TurnRequest>>,
}

impl ScriptedTransport {
    pub fn new(turns: Vec<ScriptedTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Parse a JSON script: an array of turns, each either an array of
    /// events, `{"delay_ms": n, "events": [...]}` or `{"fail": "message"}`.
    pub fn from_json(script: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<ScriptEntry> = serde_json::from_str(script)?;
        Ok(Self::new(entries.into_iter().map(Into::into).collect()))
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<TurnRequest> {
        self.requests.lock().clone()
    }

    /// Number of turns still scripted.
    pub fn remaining(&self) -> usize {
        self.turns.lock().len()
    }
}

#[async_trait]
impl ConversationTransport for ScriptedTransport {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn send_turn(
        &self,
        request: TurnRequest,
        _cancel: CancellationToken,
    ) -> Result<TurnStream, TransportError> {
        self.requests.lock().push(request);
        let turn = self
            .turns
            .lock()
            .pop_front()
            .unwrap_or(ScriptedTurn::Events(Vec::new()));

        let events: TurnStream = match turn {
            ScriptedTurn::Events(events) => stream::iter(events.into_iter().map(Ok)).boxed(),
            ScriptedTurn::Delayed(delay, events) => stream::once(tokio::time::sleep(delay))
                .flat_map(move |_| stream::iter(events.clone().into_iter().map(Ok)))
                .boxed(),
            ScriptedTurn::Fail(message) => return Err(TransportError::Network(message)),
            ScriptedTurn::Stall => stream::pending().boxed(),
        };
        Ok(events)
    }
}
