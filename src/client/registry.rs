//! Listener registration table.
//!
//! One table per [`ConnectionManager`](super::ConnectionManager), keyed
//! by event kind. Registration replaces atomically, so there is never
//! more than one active handler per kind — duplicate delivery after
//! repeated registration is ruled out structurally instead of relying on
//! a remove-before-register calling convention.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::domain::{MessagePayload, NotificationPayload};

/// Kinds of inbound events a handler can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `new-message` pushes.
    Message,
    /// `notification` pushes.
    Notification,
}

/// A decoded inbound event on its way to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A chat message pushed to a joined room.
    Message(MessagePayload),
    /// A notification pushed to the user's channel.
    Notification(NotificationPayload),
}

impl InboundEvent {
    /// Returns the registration key this event dispatches under.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Message(_) => EventKind::Message,
            Self::Notification(_) => EventKind::Notification,
        }
    }
}

/// Callback bound to an event kind.
///
/// Handlers run on the dispatch task, one event at a time, in arrival
/// order. They must not block.
pub trait InboundHandler: Send + Sync + fmt::Debug {
    /// Handles one inbound event of the registered kind.
    fn on_event(&self, event: &InboundEvent);
}

/// Registration table mapping event kinds to their single handler.
#[derive(Debug, Default)]
pub struct ListenerTable {
    handlers: Mutex<HashMap<EventKind, Arc<dyn InboundHandler>>>,
}

impl ListenerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler` for `kind`, replacing any previous handler.
    ///
    /// Returns `true` if a previous handler was replaced.
    pub fn register(&self, kind: EventKind, handler: Arc<dyn InboundHandler>) -> bool {
        match self.handlers.lock() {
            Ok(mut handlers) => handlers.insert(kind, handler).is_some(),
            Err(_) => false,
        }
    }

    /// Removes the handler for `kind`, if any.
    ///
    /// Returns `true` if a handler was removed.
    pub fn remove(&self, kind: EventKind) -> bool {
        match self.handlers.lock() {
            Ok(mut handlers) => handlers.remove(&kind).is_some(),
            Err(_) => false,
        }
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.lock().map(|h| h.len()).unwrap_or(0)
    }

    /// Returns `true` if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Routes `event` to the handler registered for its kind.
    ///
    /// Events with no registered handler are dropped with a debug log;
    /// nothing queues behind an unregistered kind.
    pub(crate) fn dispatch(&self, event: &InboundEvent) {
        let handler = self
            .handlers
            .lock()
            .ok()
            .and_then(|handlers| handlers.get(&event.kind()).map(Arc::clone));
        match handler {
            Some(handler) => handler.on_event(event),
            None => tracing::debug!(kind = ?event.kind(), "no handler registered; event dropped"),
        }
    }
}
