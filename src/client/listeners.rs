//! Chat and notification event listeners.
//!
//! Each listener is an [`InboundHandler`] that normalizes the wire
//! payload for its kind and forwards the record to the state store sink.
//! Listeners never acknowledge receipt and never deduplicate — the sink
//! owns idempotency.

use std::sync::Arc;

use super::registry::{InboundEvent, InboundHandler};
use crate::domain::{ChatId, ChatMessage, Notification};
use crate::sink::StateSink;

/// Forwards inbound chat messages to the sink.
///
/// The default, unscoped listener forwards every message regardless of
/// room — downstream filtering is the sink's business. A scoped variant
/// is available for UI contexts that only want the currently displayed
/// conversation.
#[derive(Debug)]
pub struct ChatListener {
    sink: Arc<dyn StateSink>,
    scope: Option<ChatId>,
}

impl ChatListener {
    /// Creates the unscoped listener: every message is forwarded.
    #[must_use]
    pub fn new(sink: Arc<dyn StateSink>) -> Self {
        Self { sink, scope: None }
    }

    /// Creates a listener that only forwards messages belonging to
    /// `chat_id`, dropping everything else before it reaches the sink.
    #[must_use]
    pub fn scoped(sink: Arc<dyn StateSink>, chat_id: ChatId) -> Self {
        Self {
            sink,
            scope: Some(chat_id),
        }
    }
}

impl InboundHandler for ChatListener {
    fn on_event(&self, event: &InboundEvent) {
        let InboundEvent::Message(payload) = event else {
            return;
        };
        if let Some(scope) = &self.scope
            && scope != &payload.chat_id
        {
            return;
        }
        self.sink.append_message(ChatMessage::from(payload.clone()));
    }
}

/// Forwards inbound notifications to the sink.
///
/// Normalization forces `is_read` to `false`; repeated delivery of the
/// same notification id (reconnect storms) is passed through untouched.
#[derive(Debug)]
pub struct NotificationListener {
    sink: Arc<dyn StateSink>,
}

impl NotificationListener {
    /// Creates the listener.
    #[must_use]
    pub fn new(sink: Arc<dyn StateSink>) -> Self {
        Self { sink }
    }
}

impl InboundHandler for NotificationListener {
    fn on_event(&self, event: &InboundEvent) {
        let InboundEvent::Notification(payload) = event else {
            return;
        };
        self.sink
            .append_notification(Notification::from(payload.clone()));
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{MessageId, MessagePayload, NotificationId, NotificationKind, NotificationPayload, Sender, UserId};
    use crate::sink::testing::RecordingSink;

    fn message_in(chat: &str) -> InboundEvent {
        InboundEvent::Message(MessagePayload {
            id: MessageId::new("m1"),
            chat_id: ChatId::new(chat),
            sender: Sender {
                id: UserId::new("u1"),
                username: None,
                profile_picture: None,
            },
            content: "hi".to_string(),
            media: None,
            created_at: Utc::now(),
        })
    }

    #[test]
    fn unscoped_listener_forwards_every_room() {
        let sink = Arc::new(RecordingSink::default());
        let listener = ChatListener::new(Arc::clone(&sink) as Arc<dyn StateSink>);

        listener.on_event(&message_in("c1"));
        listener.on_event(&message_in("c2"));

        let messages = sink.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages.first().map(|m| m.chat.clone()),
            Some(ChatId::new("c1"))
        );
    }

    #[test]
    fn scoped_listener_filters_other_rooms() {
        let sink = Arc::new(RecordingSink::default());
        let listener =
            ChatListener::scoped(Arc::clone(&sink) as Arc<dyn StateSink>, ChatId::new("c1"));

        listener.on_event(&message_in("c2"));
        assert!(sink.messages().is_empty());

        listener.on_event(&message_in("c1"));
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn notification_listener_normalizes_read_state() {
        let sink = Arc::new(RecordingSink::default());
        let listener = NotificationListener::new(Arc::clone(&sink) as Arc<dyn StateSink>);

        listener.on_event(&InboundEvent::Notification(NotificationPayload {
            id: NotificationId::new("n1"),
            kind: NotificationKind::Comment,
            created_at: Utc::now(),
            message: "ada commented".to_string(),
            related_post: None,
            related_user: None,
            is_read: true,
        }));

        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications.first().map(|n| n.is_read), Some(false));
    }

    #[test]
    fn listeners_ignore_foreign_kinds() {
        let sink = Arc::new(RecordingSink::default());
        let chat = ChatListener::new(Arc::clone(&sink) as Arc<dyn StateSink>);
        let notifications = NotificationListener::new(Arc::clone(&sink) as Arc<dyn StateSink>);

        notifications.on_event(&message_in("c1"));
        chat.on_event(&InboundEvent::Notification(NotificationPayload {
            id: NotificationId::new("n1"),
            kind: NotificationKind::Like,
            created_at: Utc::now(),
            message: "x".to_string(),
            related_post: None,
            related_user: None,
            is_read: false,
        }));

        assert!(sink.messages().is_empty());
        assert!(sink.notifications().is_empty());
    }
}
