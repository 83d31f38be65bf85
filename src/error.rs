//! Realtime client error types.
//!
//! [`RealtimeError`] is the central error type for the crate. Failures in
//! this subsystem are terminal where they occur: they are logged and
//! surfaced as values, never unwound across the event loop — inbound
//! delivery has no caller stack to throw into.

/// Failure classes of the realtime connection core.
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// Connect was attempted with no credential available; no connection
    /// attempt is made.
    #[error("no credential available; connect skipped")]
    NoCredential,

    /// The transport-level handshake failed.
    #[error("handshake failed: {0}")]
    HandshakeFailure(String),

    /// The server rejected a room join, via the error field of the
    /// acknowledgment.
    #[error("join rejected by server: {0}")]
    JoinRejected(String),

    /// A frame was handed to a transport that has already closed.
    #[error("transport closed")]
    TransportClosed,

    /// A frame could not be serialized or deserialized.
    #[error("frame codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The configured endpoint is not a usable WebSocket URL.
    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(String),
}
