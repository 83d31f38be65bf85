//! Transport abstraction: the seam between the connection core and the
//! network.
//!
//! A [`Connector`] performs the authenticated handshake and yields a
//! [`TransportPair`]: a handle for sending frames plus a bounded channel
//! of [`TransportEvent`]s consumed by the dispatch loop. Everything the
//! core does reacts to that single ordered event stream, which is what
//! lets the tests drive the whole client with a scripted fake instead of
//! a network.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::mpsc;

use crate::error::RealtimeError;

pub mod frame;
pub mod websocket;

#[cfg(test)]
pub(crate) mod fake;

pub use frame::{ClientFrame, ServerFrame};

/// Events surfaced by a transport, in arrival order.
#[derive(Debug)]
pub enum TransportEvent {
    /// The handshake completed; the connection is live. Emitted again
    /// after every native transport reconnect.
    Connected,
    /// A frame arrived from the server.
    Frame(ServerFrame),
    /// A (re)connect attempt failed after the event stream existed.
    /// Only transports with native reconnection emit this; the built-in
    /// WebSocket connector fails its single handshake before any event
    /// stream exists and surfaces that as an `Err` from
    /// [`Connector::connect`] instead.
    ConnectError(String),
    /// The transport dropped. Pending room memberships are void.
    Disconnected,
}

/// Sending half of an established transport.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends a frame to the server.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::TransportClosed`] if the transport has
    /// already shut down, or [`RealtimeError::Codec`] if the frame cannot
    /// be serialized.
    fn send(&self, frame: &ClientFrame) -> Result<(), RealtimeError>;

    /// Closes the transport. Idempotent.
    fn close(&self);
}

/// An established transport: sender handle plus ordered event stream.
pub struct TransportPair {
    /// Handle for sending outbound frames.
    pub transport: Arc<dyn Transport>,
    /// Ordered stream of inbound transport events. Single consumer.
    pub events: mpsc::Receiver<TransportEvent>,
}

impl fmt::Debug for TransportPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportPair")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

/// Performs the authenticated handshake against an endpoint.
///
/// Injected into the connection manager so tests can substitute a fake.
pub trait Connector: Send + Sync + fmt::Debug {
    /// Connects to `endpoint`, attaching `token` as a bearer credential
    /// in the handshake (not per-frame).
    fn connect(
        &self,
        endpoint: &str,
        token: &str,
        event_capacity: usize,
    ) -> BoxFuture<'static, Result<TransportPair, RealtimeError>>;
}
