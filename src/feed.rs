//! Higher-level feed subscription with verbatim payload logging.
//!
//! `NewsFeed` performs the one-time setup in a single call: open the
//! connection, send the join, and start listening. Every delivered payload
//! is written to the diagnostic log unmodified before it is handed to the
//! caller.

use serde_json::Value;
use tracing::info;

use crate::client::{FeedClient, FeedClientError, FeedConnection, JoinRequest};
use crate::proto::ServerMessage;

/// Typed event emitted by [`NewsFeed::recv`].
#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    /// Live announcement delivered on the `news` event.
    Live(Value),
    /// Historical announcement delivered on the `news_backlog` event.
    ///
    /// Backlog deliveries are handled exactly like live ones; the feed
    /// does not deduplicate them against later `news` deliveries.
    Backlog(Value),
}

impl FeedEvent {
    /// Returns the delivered payload regardless of event kind.
    pub fn payload(&self) -> &Value {
        match self {
            FeedEvent::Live(payload) | FeedEvent::Backlog(payload) => payload,
        }
    }
}

/// Subscribed feed yielding announcement events for one room.
#[derive(Debug)]
pub struct NewsFeed {
    connection: FeedConnection,
    room: String,
}

impl NewsFeed {
    /// Connects to the feed and joins `room`.
    pub async fn subscribe(
        client: &FeedClient,
        room: impl Into<String>,
    ) -> Result<Self, FeedClientError> {
        let room = room.into();
        let connection = client.connect(JoinRequest::new(room.clone())).await?;
        Ok(Self { connection, room })
    }

    /// Creates a feed from an existing low-level connection.
    pub fn from_connection(connection: FeedConnection, room: impl Into<String>) -> Self {
        Self {
            connection,
            room: room.into(),
        }
    }

    /// Returns the joined room name.
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Receives the next announcement.
    ///
    /// Each delivery is logged verbatim, once, before it is returned.
    /// Returns `None` once the connection has ended.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        let message = self.connection.recv().await?;
        Some(self.dispatch(message))
    }

    /// Closes the underlying connection.
    pub fn close(self) {
        self.connection.close();
    }

    fn dispatch(&self, message: ServerMessage) -> FeedEvent {
        match message {
            ServerMessage::News(payload) => {
                info!(target: "newswire::feed", room = %self.room, %payload, "news");
                FeedEvent::Live(payload)
            }
            ServerMessage::NewsBacklog(payload) => {
                info!(target: "newswire::feed", room = %self.room, %payload, "news_backlog");
                FeedEvent::Backlog(payload)
            }
        }
    }
}
