//! Type-safe identifiers for the realtime domain.
//!
//! Every id coming off the wire is an opaque server-assigned string
//! (Mongo-style object ids). Newtype wrappers keep a chat id from being
//! confused with a user id at compile time.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from its string form.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id! {
    /// Identifier of a chat conversation; doubles as the room name the
    /// server scopes `new-message` delivery to.
    ChatId
}

string_id! {
    /// Identifier of a user account; doubles as the name of that user's
    /// private notification channel.
    UserId
}

string_id! {
    /// Identifier of a single chat message.
    MessageId
}

string_id! {
    /// Identifier of a notification record.
    NotificationId
}

string_id! {
    /// Identifier of a post referenced by a notification.
    PostId
}
