//! Room membership controller.
//!
//! Issues join/leave requests over the active transport and correlates
//! join acknowledgments back to their callers. Membership is purely
//! connection-scoped: the server forgets every subscription when the
//! transport drops, so the controller wipes its local view at every
//! connect and disconnect boundary.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::domain::{ChatId, Room, UserId};
use crate::error::RealtimeError;
use crate::transport::frame::{JoinChatPayload, JoinNotificationsPayload, LeaveChatPayload};
use crate::transport::{ClientFrame, Transport};

/// Result of a chat join request, as acknowledged by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinAck {
    /// Present when the server rejected the join; membership is absent.
    pub error: Option<String>,
}

impl JoinAck {
    /// Converts the acknowledgment into a `Result` for callers that want
    /// rejection as an error value.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::JoinRejected`] when the server carried an
    /// error in the acknowledgment.
    pub fn ok(&self) -> Result<(), RealtimeError> {
        match &self.error {
            Some(error) => Err(RealtimeError::JoinRejected(error.clone())),
            None => Ok(()),
        }
    }
}

/// Joins and leaves logical rooms over whatever transport is active.
///
/// All methods are no-ops when no connection is live — callers never
/// observe a panic or an error for the offline case, only the absence of
/// an acknowledgment.
pub struct RoomController {
    active: Mutex<ActiveSlot>,
    pending: Mutex<HashMap<u64, oneshot::Sender<JoinAck>>>,
    next_ack: AtomicU64,
    memberships: Mutex<HashSet<Room>>,
}

/// Transport slot plus the epoch of the connection instance that owns
/// it. The controller outlives connection instances; a dispatcher must
/// present its epoch to detach, so late events from a replaced
/// transport cannot touch the live connection's room state.
#[derive(Debug, Default)]
struct ActiveSlot {
    transport: Option<Arc<dyn Transport>>,
    epoch: u64,
}

impl fmt::Debug for RoomController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomController")
            .field("connected", &self.transport().is_some())
            .field(
                "pending",
                &self.pending.lock().map(|p| p.len()).unwrap_or(0),
            )
            .field("memberships", &self.memberships())
            .finish()
    }
}

impl Default for RoomController {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomController {
    /// Creates a controller with no active transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Mutex::new(ActiveSlot::default()),
            pending: Mutex::new(HashMap::new()),
            next_ack: AtomicU64::new(0),
            memberships: Mutex::new(HashSet::new()),
        }
    }

    /// Requests membership of a chat room and awaits the server's
    /// acknowledgment.
    ///
    /// Returns `None` without any network action when no connection is
    /// active, and `None` when a disconnect voids the request before the
    /// server answers (membership indeterminate). A rejection comes back
    /// as `Some(ack)` with [`JoinAck::error`] set; it is logged here and
    /// the room is not recorded as joined.
    pub async fn join_chat(&self, chat_id: &ChatId) -> Option<JoinAck> {
        let Some(transport) = self.transport() else {
            tracing::debug!(%chat_id, "join-chat skipped; no active connection");
            return None;
        };

        let ack = self.next_ack.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(ack, tx);
        }

        let frame = ClientFrame::JoinChat(JoinChatPayload {
            chat_id: chat_id.clone(),
            ack,
        });
        if let Err(err) = transport.send(&frame) {
            tracing::debug!(%chat_id, %err, "join-chat send failed");
            if let Ok(mut pending) = self.pending.lock() {
                pending.remove(&ack);
            }
            return None;
        }

        match rx.await {
            Ok(acknowledgment) => {
                match &acknowledgment.error {
                    Some(error) => {
                        tracing::warn!(%chat_id, %error, "join-chat rejected");
                    }
                    None => {
                        tracing::debug!(%chat_id, "joined chat room");
                        self.record(Room::Chat(chat_id.clone()));
                    }
                }
                Some(acknowledgment)
            }
            Err(_) => {
                tracing::debug!(%chat_id, "join-chat voided by disconnect; membership indeterminate");
                None
            }
        }
    }

    /// Gives up membership of a chat room. Fire-and-forget, no-op when
    /// offline.
    pub fn leave_chat(&self, chat_id: &ChatId) {
        if let Some(transport) = self.transport() {
            let frame = ClientFrame::LeaveChat(LeaveChatPayload {
                chat_id: chat_id.clone(),
            });
            if let Err(err) = transport.send(&frame) {
                tracing::debug!(%chat_id, %err, "leave-chat send failed");
                return;
            }
        }
        if let Ok(mut memberships) = self.memberships.lock() {
            memberships.remove(&Room::Chat(chat_id.clone()));
        }
    }

    /// Subscribes to the user's private notification channel.
    /// Fire-and-forget; invoked by the dispatch loop on every
    /// (re)connect, and a no-op when offline.
    pub fn join_notifications(&self, user_id: &UserId) {
        let Some(transport) = self.transport() else {
            tracing::debug!(%user_id, "join-notifications skipped; no active connection");
            return;
        };
        let frame = ClientFrame::JoinNotifications(JoinNotificationsPayload {
            user_id: user_id.clone(),
        });
        match transport.send(&frame) {
            Ok(()) => {
                tracing::debug!(%user_id, "joined notification channel");
                self.record(Room::Notifications(user_id.clone()));
            }
            Err(err) => tracing::warn!(%user_id, %err, "join-notifications send failed"),
        }
    }

    /// Rooms this client currently believes it is a member of.
    ///
    /// Emptied at every connect and disconnect boundary — memberships do
    /// not survive a reconnect until explicitly re-joined.
    #[must_use]
    pub fn memberships(&self) -> Vec<Room> {
        self.memberships
            .lock()
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Installs the transport of a fresh connection instance and returns
    /// the epoch identifying it. Any older dispatcher's epoch is stale
    /// from this point on.
    pub(crate) fn set_transport(&self, transport: Arc<dyn Transport>) -> u64 {
        match self.active.lock() {
            Ok(mut slot) => {
                slot.epoch += 1;
                slot.transport = Some(transport);
                slot.epoch
            }
            Err(_) => 0,
        }
    }

    /// Explicit teardown: drops the transport, bumps the epoch so late
    /// events from its dispatcher are ignored, and clears room state.
    pub(crate) fn clear_transport(&self) {
        if let Ok(mut slot) = self.active.lock() {
            slot.epoch += 1;
            slot.transport = None;
        }
        self.reset();
    }

    /// Reinstalls the transport after a native transport reconnect.
    /// Returns `false` when a newer connection owns the controller.
    pub(crate) fn reattach(&self, epoch: u64, transport: Arc<dyn Transport>) -> bool {
        match self.active.lock() {
            Ok(mut slot) if slot.epoch == epoch => {
                slot.transport = Some(transport);
                true
            }
            _ => false,
        }
    }

    /// Transport-level drop reported by the dispatcher owning `epoch`:
    /// releases the transport slot and clears room state. Ignored (with
    /// `false`) when a newer connection owns the controller. The epoch
    /// stays valid: the same transport may natively reconnect and
    /// [`reattach`](Self::reattach).
    pub(crate) fn detach(&self, epoch: u64) -> bool {
        match self.active.lock() {
            Ok(mut slot) if slot.epoch == epoch => slot.transport = None,
            _ => return false,
        }
        self.reset();
        true
    }

    /// Resolves a pending join acknowledgment by correlation id.
    pub(crate) fn resolve_ack(&self, ack: u64, error: Option<String>) {
        let sender = self
            .pending
            .lock()
            .ok()
            .and_then(|mut pending| pending.remove(&ack));
        match sender {
            Some(sender) => {
                let _ = sender.send(JoinAck { error });
            }
            None => tracing::debug!(ack, "unmatched join acknowledgment"),
        }
    }

    /// Voids pending acks and forgets all memberships. Called at every
    /// connect and disconnect boundary.
    pub(crate) fn reset(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }
        if let Ok(mut memberships) = self.memberships.lock() {
            memberships.clear();
        }
    }

    fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.active
            .lock()
            .ok()
            .and_then(|slot| slot.transport.as_ref().map(Arc::clone))
    }

    fn record(&self, room: Room) {
        if let Ok(mut memberships) = self.memberships.lock() {
            memberships.insert(room);
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::transport::Connector;
    use crate::transport::fake::FakeConnector;

    async fn connected_controller(connector: &FakeConnector) -> Arc<RoomController> {
        let Ok(pair) = connector.connect("ws://test", "tok", 8).await else {
            panic!("fake handshake should succeed");
        };
        let rooms = Arc::new(RoomController::new());
        rooms.set_transport(Arc::clone(&pair.transport));
        rooms
    }

    async fn sent_frames(connector: &FakeConnector) -> Vec<ClientFrame> {
        let Some(handle) = connector.last_handle() else {
            panic!("no transport created");
        };
        handle.sent()
    }

    #[tokio::test]
    async fn join_chat_without_connection_is_silent() {
        let rooms = RoomController::new();
        let ack = rooms.join_chat(&ChatId::new("c1")).await;
        assert_eq!(ack, None);
        assert!(rooms.memberships().is_empty());
    }

    #[tokio::test]
    async fn join_chat_records_membership_on_clean_ack() {
        let connector = FakeConnector::new();
        let rooms = connected_controller(&connector).await;

        let task = tokio::spawn({
            let rooms = Arc::clone(&rooms);
            async move { rooms.join_chat(&ChatId::new("c1")).await }
        });

        // Wait for the frame to go out, then answer it.
        let ack_id = loop {
            let frames = sent_frames(&connector).await;
            if let Some(ClientFrame::JoinChat(payload)) = frames.first() {
                break payload.ack;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        };
        rooms.resolve_ack(ack_id, None);

        let Ok(Some(ack)) = task.await else {
            panic!("join should resolve");
        };
        assert_eq!(ack.error, None);
        assert!(ack.ok().is_ok());
        assert_eq!(rooms.memberships(), vec![Room::Chat(ChatId::new("c1"))]);
    }

    #[tokio::test]
    async fn rejected_join_leaves_membership_absent() {
        let connector = FakeConnector::new();
        let rooms = connected_controller(&connector).await;

        let task = tokio::spawn({
            let rooms = Arc::clone(&rooms);
            async move { rooms.join_chat(&ChatId::new("c9")).await }
        });
        let ack_id = loop {
            let frames = sent_frames(&connector).await;
            if let Some(ClientFrame::JoinChat(payload)) = frames.first() {
                break payload.ack;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        };
        rooms.resolve_ack(ack_id, Some("not a participant".to_string()));

        let Ok(Some(ack)) = task.await else {
            panic!("join should resolve");
        };
        assert_eq!(ack.error.as_deref(), Some("not a participant"));
        assert!(matches!(ack.ok(), Err(RealtimeError::JoinRejected(_))));
        assert!(rooms.memberships().is_empty());
    }

    #[tokio::test]
    async fn reset_voids_pending_joins() {
        let connector = FakeConnector::new();
        let rooms = connected_controller(&connector).await;

        let task = tokio::spawn({
            let rooms = Arc::clone(&rooms);
            async move { rooms.join_chat(&ChatId::new("c1")).await }
        });
        loop {
            if !sent_frames(&connector).await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        rooms.reset();
        let Ok(result) = task.await else {
            panic!("join task panicked");
        };
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn join_notifications_records_channel_membership() {
        let connector = FakeConnector::new();
        let rooms = connected_controller(&connector).await;

        rooms.join_notifications(&UserId::new("u1"));
        let frames = sent_frames(&connector).await;
        assert_eq!(frames.len(), 1);
        assert_eq!(
            rooms.memberships(),
            vec![Room::Notifications(UserId::new("u1"))]
        );
    }

    #[tokio::test]
    async fn stale_epoch_cannot_detach() {
        let connector = FakeConnector::new();
        let rooms = connected_controller(&connector).await;
        rooms.join_notifications(&UserId::new("u1"));

        // A reconnect replaces the transport; the first epoch goes stale.
        let Ok(pair) = connector.connect("ws://test", "tok", 8).await else {
            panic!("fake handshake should succeed");
        };
        let epoch = rooms.set_transport(Arc::clone(&pair.transport));
        rooms.reset();
        rooms.join_notifications(&UserId::new("u1"));

        assert!(!rooms.detach(epoch - 1));
        assert_eq!(
            rooms.memberships(),
            vec![Room::Notifications(UserId::new("u1"))]
        );
        assert!(rooms.detach(epoch));
        assert!(rooms.memberships().is_empty());

        // The stale epoch cannot bring its transport back either.
        assert!(!rooms.reattach(epoch - 1, Arc::clone(&pair.transport)));
        assert!(rooms.reattach(epoch, pair.transport));
    }

    #[tokio::test]
    async fn leave_chat_forgets_membership() {
        let connector = FakeConnector::new();
        let rooms = connected_controller(&connector).await;

        let task = tokio::spawn({
            let rooms = Arc::clone(&rooms);
            async move { rooms.join_chat(&ChatId::new("c1")).await }
        });
        let ack_id = loop {
            let frames = sent_frames(&connector).await;
            if let Some(ClientFrame::JoinChat(payload)) = frames.first() {
                break payload.ack;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        };
        rooms.resolve_ack(ack_id, None);
        let Ok(Some(_)) = task.await else {
            panic!("join should resolve");
        };

        rooms.leave_chat(&ChatId::new("c1"));
        assert!(rooms.memberships().is_empty());

        let frames = sent_frames(&connector).await;
        assert!(matches!(frames.last(), Some(ClientFrame::LeaveChat(_))));
    }
}
