//! Credential source collaborator.
//!
//! The connection core never stores tokens itself: it reads them from a
//! [`CredentialSource`] at connect time and again on every reconnect, so
//! a re-authentication between reconnects takes effect without restarting
//! the client.

use std::fmt;
use std::sync::Mutex;

use crate::domain::UserId;

/// Supplies the current authentication token and user identity.
///
/// Implementations must be cheap to call: the dispatch loop reads the
/// user id on every reconnect.
pub trait CredentialSource: Send + Sync + fmt::Debug {
    /// Returns the current bearer token, if a user is authenticated.
    fn token(&self) -> Option<String>;

    /// Returns the id of the currently authenticated user, if any.
    fn user_id(&self) -> Option<UserId>;
}

/// A single credential: bearer token plus the user it authenticates.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Bearer token attached to the connection handshake.
    pub token: String,
    /// Id of the authenticated user.
    pub user_id: UserId,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// In-memory [`CredentialSource`] with interior mutability.
///
/// The embedding application updates it on login, logout, and token
/// rotation; the connection core only ever reads it.
#[derive(Debug, Default)]
pub struct CredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl CredentialStore {
    /// Creates an empty store (unauthenticated).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with a credential.
    #[must_use]
    pub fn with(token: impl Into<String>, user_id: UserId) -> Self {
        let store = Self::new();
        store.set(Credential {
            token: token.into(),
            user_id,
        });
        store
    }

    /// Replaces the stored credential.
    pub fn set(&self, credential: Credential) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(credential);
        }
    }

    /// Clears the stored credential (logout).
    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

impl CredentialSource for CredentialStore {
    fn token(&self) -> Option<String> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|c| c.token.clone()))
    }

    fn user_id(&self) -> Option<UserId> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|c| c.user_id.clone()))
    }
}
