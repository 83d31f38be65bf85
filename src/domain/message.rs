//! Chat message payloads: wire shape and normalized record.
//!
//! The server pushes `new-message` events in the persistence document's
//! own field casing (`_id`, `chatId`, `createdAt`). The core translates
//! that into [`ChatMessage`], the shape the state store expects, where
//! the room identifier lives under the domain field `chat`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChatId, MessageId, UserId};

/// Wire payload of an inbound `new-message` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Server-assigned message id.
    #[serde(rename = "_id")]
    pub id: MessageId,
    /// Room the message was delivered to.
    #[serde(rename = "chatId")]
    pub chat_id: ChatId,
    /// Author of the message.
    pub sender: Sender,
    /// Message body text.
    pub content: String,
    /// Attached media URLs, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<String>>,
    /// Server-side creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Embedded author reference carried by a message payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Author's user id.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name, when the server denormalizes it into the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Avatar URL, when denormalized.
    #[serde(default, rename = "profilePicture", skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

/// Normalized chat message handed to the state store sink.
///
/// Identical to [`MessagePayload`] except the room identifier is exposed
/// as the conversation field `chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned message id.
    pub id: MessageId,
    /// Conversation this message belongs to.
    pub chat: ChatId,
    /// Author of the message.
    pub sender: Sender,
    /// Message body text.
    pub content: String,
    /// Attached media URLs, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<String>>,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<MessagePayload> for ChatMessage {
    fn from(payload: MessagePayload) -> Self {
        Self {
            id: payload.id,
            chat: payload.chat_id,
            sender: payload.sender,
            content: payload.content,
            media: payload.media,
            created_at: payload.created_at,
        }
    }
}
