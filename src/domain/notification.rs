//! Notification payloads: wire shape and normalized record.
//!
//! Inbound `notification` events are translated into [`Notification`]
//! records before reaching the sink. Normalization always forces
//! `is_read` to `false` — read state is client-local and the server has
//! no authority over it at delivery time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NotificationId, PostId, UserId};

/// Category of a notification, mirroring the server's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone liked a post.
    Like,
    /// Someone commented on a post.
    Comment,
    /// Someone started following the user.
    Follow,
    /// A chat message arrived while the user was away.
    Message,
    /// A subscription started, renewed, or lapsed.
    Subscription,
    /// Any kind this client version does not know about.
    #[serde(other)]
    Unknown,
}

/// Wire payload of an inbound `notification` event.
///
/// The server may include an `isRead` flag; it is accepted during
/// deserialization and discarded during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Server-assigned notification id.
    #[serde(rename = "_id")]
    pub id: NotificationId,
    /// Notification category.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Server-side creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Human-readable notification text.
    pub message: String,
    /// Post this notification refers to, when applicable.
    #[serde(default, rename = "relatedPost", skip_serializing_if = "Option::is_none")]
    pub related_post: Option<PostId>,
    /// User this notification refers to, when applicable.
    #[serde(default, rename = "relatedUser", skip_serializing_if = "Option::is_none")]
    pub related_user: Option<UserId>,
    /// Read flag as sent by the server; ignored by normalization.
    #[serde(default, rename = "isRead")]
    pub is_read: bool,
}

/// Normalized notification handed to the state store sink.
///
/// The listener does not deduplicate by id — a reconnect storm can
/// deliver the same notification twice, and the sink owns idempotency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Server-assigned notification id.
    pub id: NotificationId,
    /// Notification category.
    pub kind: NotificationKind,
    /// Always `false` at delivery time.
    pub is_read: bool,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Human-readable notification text.
    pub message: String,
    /// Post this notification refers to, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_post: Option<PostId>,
    /// User this notification refers to, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_user: Option<UserId>,
}

impl From<NotificationPayload> for Notification {
    fn from(payload: NotificationPayload) -> Self {
        Self {
            id: payload.id,
            kind: payload.kind,
            is_read: false,
            created_at: payload.created_at,
            message: payload.message,
            related_post: payload.related_post,
            related_user: payload.related_user,
        }
    }
}
