//! Single-consumer dispatch loop.
//!
//! One task per connection drains the transport's event channel in
//! arrival order and reacts: state transitions, notification-channel
//! re-join on every (re)connect, join-ack resolution, and handler
//! fan-out through the listener table. Handlers run inline on this task,
//! so there is never concurrent handling of two events from the same
//! connection.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use super::connection::ConnectionState;
use super::registry::{InboundEvent, ListenerTable};
use super::rooms::RoomController;
use crate::credentials::CredentialSource;
use crate::transport::{ServerFrame, Transport, TransportEvent};

/// Per-connection dispatcher driving the event loop.
///
/// `epoch` is the room controller's generation handed out when this
/// connection's transport was installed. Every room mutation goes
/// through it, so a dispatcher whose connection has been replaced can
/// no longer touch the shared controller.
pub(crate) struct Dispatcher {
    listeners: Arc<ListenerTable>,
    rooms: Arc<RoomController>,
    credentials: Arc<dyn CredentialSource>,
    state: watch::Sender<ConnectionState>,
    transport: Arc<dyn Transport>,
    epoch: u64,
}

impl Dispatcher {
    pub(crate) fn new(
        listeners: Arc<ListenerTable>,
        rooms: Arc<RoomController>,
        credentials: Arc<dyn CredentialSource>,
        state: watch::Sender<ConnectionState>,
        transport: Arc<dyn Transport>,
        epoch: u64,
    ) -> Self {
        Self {
            listeners,
            rooms,
            credentials,
            state,
            transport,
            epoch,
        }
    }

    /// Consumes transport events until the channel closes.
    pub(crate) async fn run(self, mut events: mpsc::Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        // Transport tasks are gone; nothing else will flip this
        // connection's state. Room state is left to the Disconnected
        // handler — by now a newer connection may own the controller.
        self.state.send_replace(ConnectionState::Disconnected);
        tracing::debug!("dispatch loop finished");
    }

    fn handle(&self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                if !self
                    .rooms
                    .reattach(self.epoch, Arc::clone(&self.transport))
                {
                    tracing::debug!("connect event from a replaced transport; ignored");
                    return;
                }
                let previous = self.state.send_replace(ConnectionState::Connected);
                tracing::info!(?previous, "connection established");
                // Server-side subscriptions never survive the transport;
                // whatever we held before this point is void.
                self.rooms.reset();
                match self.credentials.user_id() {
                    Some(user_id) => self.rooms.join_notifications(&user_id),
                    None => {
                        tracing::debug!("no user id resolvable; notification channel not joined");
                    }
                }
            }
            TransportEvent::Frame(ServerFrame::Ack(ack)) => {
                self.rooms.resolve_ack(ack.ack, ack.error);
            }
            TransportEvent::Frame(ServerFrame::NewMessage(payload)) => {
                self.listeners.dispatch(&InboundEvent::Message(payload));
            }
            TransportEvent::Frame(ServerFrame::Notification(payload)) => {
                self.listeners.dispatch(&InboundEvent::Notification(payload));
            }
            TransportEvent::ConnectError(err) => {
                tracing::error!(%err, "transport connect error");
                self.state.send_replace(ConnectionState::Disconnected);
            }
            TransportEvent::Disconnected => {
                self.state.send_replace(ConnectionState::Disconnected);
                if self.rooms.detach(self.epoch) {
                    tracing::info!("connection dropped");
                } else {
                    tracing::debug!("disconnect event from a replaced transport; ignored");
                }
            }
        }
    }
}
