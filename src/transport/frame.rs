//! Wire frame envelope: commands, acknowledgments, and server pushes.
//!
//! Every frame is a JSON text message with an adjacently tagged envelope
//! `{ "event": "<kebab-case name>", "payload": ... }`. Payload field
//! casing follows the server's persistence documents (`_id`, `chatId`,
//! `createdAt`).

use serde::{Deserialize, Serialize};

use crate::domain::{ChatId, MessagePayload, NotificationPayload, UserId};

/// Client → server frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum ClientFrame {
    /// Request membership of a chat room; acknowledged by [`AckPayload`]
    /// echoing the `ack` correlation id.
    JoinChat(JoinChatPayload),
    /// Give up membership of a chat room. Not acknowledged.
    LeaveChat(LeaveChatPayload),
    /// Fire-and-forget subscription to the user's notification channel.
    JoinNotifications(JoinNotificationsPayload),
}

/// Payload of a `join-chat` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinChatPayload {
    /// Room to join.
    #[serde(rename = "chatId")]
    pub chat_id: ChatId,
    /// Correlation id echoed back in the acknowledgment.
    pub ack: u64,
}

/// Payload of a `leave-chat` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveChatPayload {
    /// Room to leave.
    #[serde(rename = "chatId")]
    pub chat_id: ChatId,
}

/// Payload of a `join-notifications` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinNotificationsPayload {
    /// Owner of the notification channel.
    #[serde(rename = "userId")]
    pub user_id: UserId,
}

/// Server → client frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum ServerFrame {
    /// Reply to a `join-chat` request.
    Ack(AckPayload),
    /// A chat message pushed to one of the joined rooms.
    NewMessage(MessagePayload),
    /// A notification pushed to the user's private channel.
    Notification(NotificationPayload),
}

/// Payload of an `ack` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckPayload {
    /// Correlation id of the request being acknowledged.
    pub ack: u64,
    /// Present when the server rejected the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
