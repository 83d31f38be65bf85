//! WebSocket transport backed by `tokio-tungstenite`.
//!
//! One connect spawns two tasks: a writer draining the outbound frame
//! queue into the socket, and a reader decoding inbound text frames into
//! [`TransportEvent`]s. Arrival order is preserved end to end because
//! both the socket read loop and the event channel are single-file.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;

use super::{ClientFrame, Connector, ServerFrame, Transport, TransportEvent, TransportPair};
use crate::error::RealtimeError;

/// [`Connector`] establishing real WebSocket connections.
///
/// The credential travels once, as an `Authorization: Bearer` header on
/// the upgrade request. There is no polling fallback and no built-in
/// reconnection: a dropped socket emits [`TransportEvent::Disconnected`]
/// and the transport is done.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    /// Creates a new connector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WebSocketConnector {
    fn connect(
        &self,
        endpoint: &str,
        token: &str,
        event_capacity: usize,
    ) -> BoxFuture<'static, Result<TransportPair, RealtimeError>> {
        let endpoint = endpoint.to_string();
        let bearer = format!("Bearer {token}");

        Box::pin(async move {
            let mut request = endpoint
                .as_str()
                .into_client_request()
                .map_err(|e| RealtimeError::InvalidEndpoint(e.to_string()))?;
            let header = HeaderValue::from_str(&bearer)
                .map_err(|e| RealtimeError::HandshakeFailure(e.to_string()))?;
            request.headers_mut().insert(AUTHORIZATION, header);

            let (stream, _response) = connect_async(request)
                .await
                .map_err(|e| RealtimeError::HandshakeFailure(e.to_string()))?;
            let (mut ws_tx, mut ws_rx) = stream.split();

            let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
            let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(event_capacity);

            // Writer: drain the outbound queue into the socket.
            tokio::spawn(async move {
                while let Some(message) = out_rx.recv().await {
                    let closing = matches!(message, Message::Close(_));
                    if ws_tx.send(message).await.is_err() || closing {
                        break;
                    }
                }
            });

            // Reader: decode inbound text frames, in arrival order.
            tokio::spawn(async move {
                if event_tx.send(TransportEvent::Connected).await.is_err() {
                    return;
                }
                while let Some(message) = ws_rx.next().await {
                    match message {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<ServerFrame>(&text) {
                                Ok(frame) => {
                                    if event_tx.send(TransportEvent::Frame(frame)).await.is_err() {
                                        return;
                                    }
                                }
                                Err(err) => {
                                    tracing::warn!(%err, "dropping undecodable frame");
                                }
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(err) => {
                            tracing::warn!(%err, "websocket read failed");
                            break;
                        }
                    }
                }
                let _ = event_tx.send(TransportEvent::Disconnected).await;
            });

            let transport: Arc<dyn Transport> = Arc::new(WebSocketTransport {
                out: out_tx,
                closed: AtomicBool::new(false),
            });
            Ok(TransportPair {
                transport,
                events: event_rx,
            })
        })
    }
}

/// Sending half of an established WebSocket connection.
struct WebSocketTransport {
    out: mpsc::UnboundedSender<Message>,
    closed: AtomicBool,
}

impl std::fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketTransport")
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Transport for WebSocketTransport {
    fn send(&self, frame: &ClientFrame) -> Result<(), RealtimeError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(RealtimeError::TransportClosed);
        }
        let json = serde_json::to_string(frame)?;
        self.out
            .send(Message::Text(json.into()))
            .map_err(|_| RealtimeError::TransportClosed)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::Relaxed) {
            let _ = self.out.send(Message::Close(None));
        }
    }
}
