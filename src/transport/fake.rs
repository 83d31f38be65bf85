//! Scripted connector and transport for driving the client in tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use tokio::sync::mpsc;

use super::{ClientFrame, Connector, Transport, TransportEvent, TransportPair};
use crate::error::RealtimeError;

/// Connector that hands out [`FakeTransport`]s and records every
/// handshake so tests can assert on idempotency and credentials.
#[derive(Debug, Default)]
pub(crate) struct FakeConnector {
    fail_handshake: AtomicBool,
    connects: AtomicUsize,
    tokens: Mutex<Vec<String>>,
    handles: Mutex<Vec<FakeHandle>>,
}

impl FakeConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent handshake fail.
    pub(crate) fn fail_handshakes(&self) {
        self.fail_handshake.store(true, Ordering::Relaxed);
    }

    /// Number of transports actually created.
    pub(crate) fn connect_count(&self) -> usize {
        self.connects.load(Ordering::Relaxed)
    }

    /// Tokens presented at each handshake, in order.
    pub(crate) fn tokens(&self) -> Vec<String> {
        self.tokens.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Handle to the most recently created transport.
    pub(crate) fn last_handle(&self) -> Option<FakeHandle> {
        self.handles
            .lock()
            .ok()
            .and_then(|handles| handles.last().cloned())
    }
}

impl Connector for FakeConnector {
    fn connect(
        &self,
        _endpoint: &str,
        token: &str,
        event_capacity: usize,
    ) -> BoxFuture<'static, Result<TransportPair, RealtimeError>> {
        if self.fail_handshake.load(Ordering::Relaxed) {
            return Box::pin(async { Err(RealtimeError::HandshakeFailure("refused".to_string())) });
        }

        self.connects.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.push(token.to_string());
        }

        let (event_tx, event_rx) = mpsc::channel(event_capacity);
        let sent = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let handle = FakeHandle {
            events: event_tx,
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
        };
        if let Ok(mut handles) = self.handles.lock() {
            handles.push(handle);
        }

        let transport: Arc<dyn Transport> = Arc::new(FakeTransport { sent, closed });
        Box::pin(async move {
            Ok(TransportPair {
                transport,
                events: event_rx,
            })
        })
    }
}

/// Test-side handle to a [`FakeTransport`]: inject events, inspect
/// frames the client sent.
#[derive(Debug, Clone)]
pub(crate) struct FakeHandle {
    events: mpsc::Sender<TransportEvent>,
    sent: Arc<Mutex<Vec<ClientFrame>>>,
    closed: Arc<AtomicBool>,
}

impl FakeHandle {
    /// Pushes a transport event into the dispatch loop.
    pub(crate) async fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(event).await;
    }

    /// Completes the handshake, as the real reader task would.
    pub(crate) async fn open(&self) {
        self.emit(TransportEvent::Connected).await;
    }

    /// Frames sent by the client so far.
    pub(crate) fn sent(&self) -> Vec<ClientFrame> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct FakeTransport {
    sent: Arc<Mutex<Vec<ClientFrame>>>,
    closed: Arc<AtomicBool>,
}

impl Transport for FakeTransport {
    fn send(&self, frame: &ClientFrame) -> Result<(), RealtimeError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(RealtimeError::TransportClosed);
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(frame.clone());
        }
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}
