//! Low-level feed websocket client and connection worker.
//!
//! The client pins the handshake path and transport up front and opens one
//! websocket per subscription. A background worker owns the socket, sends
//! the join event exactly once after the socket opens, and forwards decoded
//! inbound events over an in-process channel. There is no reconnect: when
//! the transport drops, the event stream ends.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::proto::{ClientMessage, ServerMessage};

/// Default handshake sub-path appended to the feed endpoint.
pub const DEFAULT_HANDSHAKE_PATH: &str = "/socket.io";

/// Transport mechanisms in the feed protocol's negotiation vocabulary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transport {
    /// Persistent websocket. The only transport this client implements.
    WebSocket,
    /// HTTP long-polling fallback. Not implemented by this client.
    Polling,
}

/// Entry point for opening feed connections.
#[derive(Clone, Debug)]
pub struct FeedClient {
    endpoint: String,
    handshake_path: String,
    transports: Vec<Transport>,
}

impl FeedClient {
    /// Creates a client for the given feed endpoint, eg `ws://feed.example`.
    ///
    /// The handshake path defaults to [`DEFAULT_HANDSHAKE_PATH`] and the
    /// transport allow-list to websocket only.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            endpoint: endpoint.trim_end().to_string(),
            handshake_path: DEFAULT_HANDSHAKE_PATH.to_string(),
            transports: vec![Transport::WebSocket],
        }
    }

    /// Sets an explicit handshake sub-path.
    pub fn with_handshake_path(mut self, path: impl Into<String>) -> Self {
        self.handshake_path = path.into();
        self
    }

    /// Sets the transport allow-list.
    ///
    /// Connecting fails unless the list includes [`Transport::WebSocket`].
    pub fn with_transports(mut self, transports: Vec<Transport>) -> Self {
        self.transports = transports;
        self
    }

    /// Opens a feed connection and joins the requested room.
    ///
    /// This spawns a background worker that owns the websocket and returns
    /// a handle for receiving inbound events and status updates. The join
    /// event is sent exactly once, immediately after the socket opens, and
    /// no acknowledgment is awaited.
    pub async fn connect(&self, join: JoinRequest) -> Result<FeedConnection, FeedClientError> {
        if !self.transports.contains(&Transport::WebSocket) {
            return Err(FeedClientError::Protocol(
                "transport allow-list does not include websocket".to_string(),
            ));
        }

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let url = self.request_url();
        tokio::spawn(async move {
            feed_worker(url, join, shutdown_rx, inbound_tx, status_tx, ready_tx).await;
        });

        match ready_rx.await {
            Ok(Ok(())) => Ok(FeedConnection {
                events: inbound_rx,
                status: status_rx,
                shutdown: Some(shutdown_tx),
            }),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(FeedClientError::Protocol(
                "feed worker stopped before initial connect".to_string(),
            )),
        }
    }

    fn request_url(&self) -> String {
        format!(
            "{}{}",
            self.endpoint.trim_end_matches('/'),
            self.handshake_path
        )
    }
}

/// Subscription request carried by the single outbound `join` event.
#[derive(Clone, Debug)]
pub struct JoinRequest {
    /// Room naming the subscription group.
    pub room: String,
}

impl JoinRequest {
    /// Convenience constructor.
    pub fn new(room: impl Into<String>) -> Self {
        Self { room: room.into() }
    }
}

/// Connection lifecycle updates produced by the feed worker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeedConnectionStatus {
    Connected,
    Disconnected,
}

/// Active feed connection channels.
///
/// Inbound events are produced by the background websocket worker.
#[derive(Debug)]
pub struct FeedConnection {
    events: mpsc::UnboundedReceiver<ServerMessage>,
    status: mpsc::UnboundedReceiver<FeedConnectionStatus>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FeedConnection {
    /// Receives the next inbound event from the feed worker.
    ///
    /// Returns `None` once the connection has ended.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.events.recv().await
    }

    /// Receives the next connection status update.
    pub async fn recv_status(&mut self) -> Option<FeedConnectionStatus> {
        self.status.recv().await
    }

    /// Closes the connection gracefully.
    ///
    /// Dropping the handle has the same effect.
    pub fn close(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Errors produced by feed transport and connection setup.
#[derive(Debug, Error)]
pub enum FeedClientError {
    /// Websocket transport error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] WsError),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Connection setup or protocol contract error.
    #[error("protocol error: {0}")]
    Protocol(String),
}

async fn feed_worker(
    url: String,
    join: JoinRequest,
    mut shutdown_rx: oneshot::Receiver<()>,
    inbound_tx: mpsc::UnboundedSender<ServerMessage>,
    status_tx: mpsc::UnboundedSender<FeedConnectionStatus>,
    ready_tx: oneshot::Sender<Result<(), FeedClientError>>,
) {
    let mut socket = match connect_async(url.as_str()).await {
        Ok((socket, _)) => socket,
        Err(err) => {
            let _ = ready_tx.send(Err(FeedClientError::WebSocket(err)));
            return;
        }
    };
    debug!(event = "feed_connected", %url);

    let join_msg = ClientMessage::Join { room: join.room };
    if let Err(err) = send_client_message(&mut socket, &join_msg).await {
        let _ = ready_tx.send(Err(err));
        return;
    }

    let _ = status_tx.send(FeedConnectionStatus::Connected);
    let _ = ready_tx.send(Ok(()));

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                let _ = socket.close(None).await;
                break;
            }
            maybe_inbound = socket.next() => {
                match maybe_inbound {
                    Some(Ok(Message::Text(text))) => match ServerMessage::from_text(&text) {
                        Ok(event) => {
                            if inbound_tx.send(event).is_err() {
                                let _ = socket.close(None).await;
                                break;
                            }
                        }
                        Err(err) => {
                            // No listener is registered for this event name.
                            debug!(event = "unhandled_frame", error = %err);
                        }
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {
                        debug!(event = "unhandled_frame", kind = "non_text");
                    }
                    Some(Err(err)) => {
                        debug!(event = "transport_error", error = %err);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    debug!(event = "feed_disconnected", %url);
    let _ = status_tx.send(FeedConnectionStatus::Disconnected);
}

async fn send_client_message(
    socket: &mut WebSocketStream<MaybeTlsStream<TcpStream>>,
    message: &ClientMessage,
) -> Result<(), FeedClientError> {
    let text = message.to_text()?;
    socket.send(Message::Text(text)).await?;
    Ok(())
}
