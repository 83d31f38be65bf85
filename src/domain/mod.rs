//! Domain layer: identifiers, room identities, and the wire/normalized
//! shapes of chat messages and notifications.

pub mod ids;
pub mod message;
pub mod notification;
pub mod room;

pub use ids::{ChatId, MessageId, NotificationId, PostId, UserId};
pub use message::{ChatMessage, MessagePayload, Sender};
pub use notification::{Notification, NotificationKind, NotificationPayload};
pub use room::Room;
