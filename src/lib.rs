//! # ripple-realtime
//!
//! Real-time event delivery and room-membership client for the Ripple
//! social platform: one authenticated WebSocket per process, multiplexed
//! across chat rooms and the user's private notification channel.
//!
//! REST CRUD, persistence, and UI state live elsewhere — this crate is
//! the coordination layer between the realtime server and the
//! application's state store.
//!
//! ## Architecture
//!
//! ```text
//! RealtimeContext (DI root)
//!     │
//!     ├── ConnectionManager (client/) ── Connector/Transport (transport/)
//!     │
//!     ├── dispatch loop: transport events, in arrival order
//!     │       ├── RoomController (joins, acks, memberships)
//!     │       └── ListenerTable
//!     │               ├── ChatListener
//!     │               └── NotificationListener
//!     │
//!     └── StateSink (application state store)
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod sink;
pub mod transport;
