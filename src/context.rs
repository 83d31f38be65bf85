//! Process-wide realtime context.
//!
//! [`RealtimeContext`] is the dependency-injection root: construct it
//! once at startup with the connector, credential source, and sink of
//! your choosing, share it (behind an `Arc`) wherever the application
//! needs realtime access, and call [`RealtimeContext::disconnect`] at
//! logout or teardown. There is deliberately no hidden module-level
//! connection; tests build a context around fakes and get full isolation.

use std::sync::Arc;

use crate::client::{Connection, ConnectionManager, ListenerTable, RoomController};
use crate::config::RealtimeConfig;
use crate::credentials::CredentialSource;
use crate::error::RealtimeError;
use crate::sink::StateSink;
use crate::transport::Connector;

/// Owns the connection manager and exposes the client surface.
#[derive(Debug)]
pub struct RealtimeContext {
    manager: ConnectionManager,
}

impl RealtimeContext {
    /// Builds the context. No connection is attempted yet.
    #[must_use]
    pub fn new(
        config: RealtimeConfig,
        connector: Arc<dyn Connector>,
        credentials: Arc<dyn CredentialSource>,
        sink: Arc<dyn StateSink>,
    ) -> Self {
        Self {
            manager: ConnectionManager::new(config, connector, credentials, sink),
        }
    }

    /// Establishes (or returns the already-live) connection.
    ///
    /// # Errors
    ///
    /// See [`ConnectionManager::connect`].
    pub async fn connect(&self) -> Result<Arc<Connection>, RealtimeError> {
        self.manager.connect().await
    }

    /// The current connection, if any. Never triggers creation.
    pub async fn current(&self) -> Option<Arc<Connection>> {
        self.manager.current().await
    }

    /// Room membership controller (join/leave chats, notification
    /// channel).
    #[must_use]
    pub fn rooms(&self) -> &Arc<RoomController> {
        self.manager.rooms()
    }

    /// Listener registration table, for installing a room-scoped chat
    /// listener or a custom handler.
    #[must_use]
    pub fn listeners(&self) -> &Arc<ListenerTable> {
        self.manager.listeners()
    }

    /// Tears down the connection. Safe to call when already offline.
    pub async fn disconnect(&self) {
        self.manager.disconnect().await;
    }
}
