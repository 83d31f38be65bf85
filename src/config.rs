//! Client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use crate::error::RealtimeError;

/// Top-level realtime client configuration.
///
/// Loaded once at startup via [`RealtimeConfig::from_env`], or built
/// directly in tests.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// WebSocket endpoint of the realtime server
    /// (e.g. `wss://api.ripple.social/realtime`).
    pub endpoint: String,

    /// Capacity of the bounded channel carrying transport events into
    /// the dispatch loop.
    pub event_channel_capacity: usize,
}

impl RealtimeConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::InvalidEndpoint`] if `REALTIME_ENDPOINT`
    /// is set to something that is not a `ws://` or `wss://` URL.
    pub fn from_env() -> Result<Self, RealtimeError> {
        dotenvy::dotenv().ok();

        let endpoint = std::env::var("REALTIME_ENDPOINT")
            .unwrap_or_else(|_| "ws://127.0.0.1:4000/realtime".to_string());
        if !endpoint.starts_with("ws://") && !endpoint.starts_with("wss://") {
            return Err(RealtimeError::InvalidEndpoint(endpoint));
        }

        let event_channel_capacity = parse_env("REALTIME_EVENT_CHANNEL_CAPACITY", 256);

        Ok(Self {
            endpoint,
            event_channel_capacity,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
