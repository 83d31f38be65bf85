//! State store sink collaborator.
//!
//! Listeners translate wire payloads into normalized records and hand
//! them to a [`StateSink`]. The sink is the application's state
//! container; it is expected to be idempotent-safe or to perform its own
//! deduplication (reconnect storms can deliver a notification twice).

use crate::domain::{ChatMessage, Notification};

/// Receives normalized records from the event listeners.
pub trait StateSink: Send + Sync + std::fmt::Debug {
    /// Appends a chat message to its conversation.
    fn append_message(&self, message: ChatMessage);

    /// Appends a notification to the user's notification feed.
    fn append_notification(&self, notification: Notification);
}

/// Sink that mirrors every record into structured logs.
///
/// Used by the diagnostic binary; also handy as a placeholder while an
/// application wires up its real store.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StateSink for TracingSink {
    fn append_message(&self, message: ChatMessage) {
        tracing::info!(
            message_id = %message.id,
            chat = %message.chat,
            sender = %message.sender.id,
            "message received"
        );
    }

    fn append_notification(&self, notification: Notification) {
        tracing::info!(
            notification_id = %notification.id,
            kind = ?notification.kind,
            "notification received"
        );
    }
}
