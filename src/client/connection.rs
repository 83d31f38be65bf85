//! Connection lifecycle: manager, live connection handle, state machine.
//!
//! The manager owns at most one live connection per process. `connect`
//! is idempotent while a connection is live; `disconnect` is terminal
//! for that instance and a later `connect` builds a fresh one. The state
//! machine is `Disconnected → Connecting → Connected → Disconnected`,
//! driven by the dispatch loop off transport events.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use super::dispatch::Dispatcher;
use super::listeners::{ChatListener, NotificationListener};
use super::registry::{EventKind, ListenerTable};
use super::rooms::RoomController;
use crate::config::RealtimeConfig;
use crate::credentials::CredentialSource;
use crate::error::RealtimeError;
use crate::sink::StateSink;
use crate::transport::{Connector, Transport};

/// Lifecycle state of a connection instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport, or the transport has dropped.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Handshake completed; events are flowing.
    Connected,
}

/// Handle to one live (or formerly live) connection instance.
pub struct Connection {
    transport: Arc<dyn Transport>,
    state: watch::Sender<ConnectionState>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch stream of state transitions, for callers that want to react
    /// to connect/disconnect without polling.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn is_live(&self) -> bool {
        self.state() != ConnectionState::Disconnected
    }

    fn shutdown(&self) {
        self.transport.close();
        self.state.send_replace(ConnectionState::Disconnected);
    }
}

/// Owns the process-wide connection and its collaborators.
///
/// All other components reach the connection through this manager rather
/// than holding their own transport reference; the [`RoomController`]
/// gets its transport slot updated here on connect and disconnect.
pub struct ConnectionManager {
    config: RealtimeConfig,
    connector: Arc<dyn Connector>,
    credentials: Arc<dyn CredentialSource>,
    sink: Arc<dyn StateSink>,
    listeners: Arc<ListenerTable>,
    rooms: Arc<RoomController>,
    current: Mutex<Option<Arc<Connection>>>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("endpoint", &self.config.endpoint)
            .field("rooms", &self.rooms)
            .finish_non_exhaustive()
    }
}

impl ConnectionManager {
    /// Creates a manager with its collaborators injected. No connection
    /// is attempted until [`connect`](Self::connect).
    #[must_use]
    pub fn new(
        config: RealtimeConfig,
        connector: Arc<dyn Connector>,
        credentials: Arc<dyn CredentialSource>,
        sink: Arc<dyn StateSink>,
    ) -> Self {
        Self {
            config,
            connector,
            credentials,
            sink,
            listeners: Arc::new(ListenerTable::new()),
            rooms: Arc::new(RoomController::new()),
            current: Mutex::new(None),
        }
    }

    /// The listener registration table shared by all connections this
    /// manager creates.
    #[must_use]
    pub fn listeners(&self) -> &Arc<ListenerTable> {
        &self.listeners
    }

    /// The room membership controller bound to this manager.
    #[must_use]
    pub fn rooms(&self) -> &Arc<RoomController> {
        &self.rooms
    }

    /// Establishes the connection, or returns the existing live one.
    ///
    /// The credential is read from the source at this moment and
    /// attached to the handshake; it is not refreshed for the lifetime
    /// of the connection. On success the chat and notification listeners
    /// are (re)registered — replace-on-insert keeps exactly one of each —
    /// and the dispatch loop is spawned; the notification channel join
    /// happens when the transport reports `Connected`.
    ///
    /// # Errors
    ///
    /// [`RealtimeError::NoCredential`] when no token is available (no
    /// connection attempt is made), or [`RealtimeError::HandshakeFailure`]
    /// when the transport-level connect fails. Neither is retried here.
    pub async fn connect(&self) -> Result<Arc<Connection>, RealtimeError> {
        let mut current = self.current.lock().await;
        if let Some(connection) = current.as_ref()
            && connection.is_live()
        {
            tracing::debug!("connect called while live; reusing connection");
            return Ok(Arc::clone(connection));
        }

        let Some(token) = self.credentials.token() else {
            tracing::warn!("connect skipped; no credential available");
            return Err(RealtimeError::NoCredential);
        };

        tracing::info!(endpoint = %self.config.endpoint, "connecting");
        let pair = self
            .connector
            .connect(
                &self.config.endpoint,
                &token,
                self.config.event_channel_capacity,
            )
            .await
            .inspect_err(|err| tracing::error!(%err, "handshake failed"))?;

        self.listeners.register(
            EventKind::Message,
            Arc::new(ChatListener::new(Arc::clone(&self.sink))),
        );
        self.listeners.register(
            EventKind::Notification,
            Arc::new(NotificationListener::new(Arc::clone(&self.sink))),
        );
        let epoch = self.rooms.set_transport(Arc::clone(&pair.transport));

        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        let connection = Arc::new(Connection {
            transport: pair.transport,
            state: state_tx.clone(),
        });

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.listeners),
            Arc::clone(&self.rooms),
            Arc::clone(&self.credentials),
            state_tx,
            Arc::clone(&connection.transport),
            epoch,
        );
        tokio::spawn(dispatcher.run(pair.events));

        *current = Some(Arc::clone(&connection));
        Ok(connection)
    }

    /// Returns the current connection without side effects; never
    /// triggers creation.
    pub async fn current(&self) -> Option<Arc<Connection>> {
        self.current.lock().await.clone()
    }

    /// Tears the connection down. Terminal for that instance; a later
    /// [`connect`](Self::connect) creates a fresh one. No-op when
    /// already disconnected.
    pub async fn disconnect(&self) {
        let connection = self.current.lock().await.take();
        if let Some(connection) = connection {
            tracing::info!("disconnecting");
            connection.shutdown();
            self.rooms.clear_transport();
        }
    }
}
