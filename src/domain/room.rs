//! Logical room identities scoping server-side event delivery.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ChatId, UserId};

/// A server-side channel this client can hold membership of.
///
/// Memberships live no longer than the transport connection that
/// established them; a reconnect invalidates all of them implicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Room {
    /// Per-conversation room carrying `new-message` events.
    Chat(ChatId),
    /// Per-user private channel carrying `notification` events.
    Notifications(UserId),
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat(chat_id) => write!(f, "chat:{chat_id}"),
            Self::Notifications(user_id) => write!(f, "notifications:{user_id}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_namespace() {
        assert_eq!(Room::Chat(ChatId::new("c1")).to_string(), "chat:c1");
        assert_eq!(
            Room::Notifications(UserId::new("u1")).to_string(),
            "notifications:u1"
        );
    }
}
