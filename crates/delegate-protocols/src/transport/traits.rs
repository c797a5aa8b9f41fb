//! Conversation transport trait definition.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use super::{TurnEvent, TurnRequest};
use crate::error::TransportError;

/// Sends turns to a model.
///
/// The stream ends when the turn is complete. Implementations should stop
/// producing events once `cancel` fires.
#[async_trait]
pub trait ConversationTransport: Send + Sync {
    /// Returns the transport ID, used in logs.
    fn id(&self) -> &str;

    /// Send one turn and stream its events back.
    async fn send_turn(
        &self,
        request: TurnRequest,
        cancel: CancellationToken,
    ) -> Result<TurnStream, TransportError>;
}

/// Stream of events for one turn.
pub type TurnStream = Pin<Box<dyn Stream<Item = Result<TurnEvent, TransportError>> + Send>>;
