//! ripple-realtime diagnostic client entry point.
//!
//! Connects to the realtime endpoint with credentials from the
//! environment (`REALTIME_TOKEN`, `REALTIME_USER_ID`) and mirrors every
//! inbound message and notification into structured logs until Ctrl-C.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use ripple_realtime::config::RealtimeConfig;
use ripple_realtime::context::RealtimeContext;
use ripple_realtime::credentials::{Credential, CredentialStore};
use ripple_realtime::domain::UserId;
use ripple_realtime::sink::TracingSink;
use ripple_realtime::transport::websocket::WebSocketConnector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration (also loads .env)
    let config = RealtimeConfig::from_env()?;
    tracing::info!(endpoint = %config.endpoint, "starting ripple-realtime client");

    // Credentials from environment
    let credentials = Arc::new(CredentialStore::new());
    match (
        std::env::var("REALTIME_TOKEN").ok(),
        std::env::var("REALTIME_USER_ID").ok(),
    ) {
        (Some(token), Some(user_id)) => credentials.set(Credential {
            token,
            user_id: UserId::new(user_id),
        }),
        _ => tracing::warn!("REALTIME_TOKEN / REALTIME_USER_ID not set; connect will fail fast"),
    }

    // Build the context around the real WebSocket connector
    let context = RealtimeContext::new(
        config,
        Arc::new(WebSocketConnector::new()),
        credentials,
        Arc::new(TracingSink),
    );

    match context.connect().await {
        Ok(connection) => tracing::info!(state = ?connection.state(), "connection created"),
        Err(err) => {
            tracing::error!(%err, "could not connect");
            return Err(err.into());
        }
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    context.disconnect().await;

    Ok(())
}
