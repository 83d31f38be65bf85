//! Client core: connection lifecycle, room membership, listener
//! registration, and the dispatch loop tying them together.

pub mod connection;
pub mod listeners;
pub mod registry;
pub mod rooms;

mod dispatch;

pub use connection::{Connection, ConnectionManager, ConnectionState};
pub use listeners::{ChatListener, NotificationListener};
pub use registry::{EventKind, InboundEvent, InboundHandler, ListenerTable};
pub use rooms::{JoinAck, RoomController};
