//! Process-wide connection metrics

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters shared by all sessions.
///
/// Observability only: nothing in the gateway branches on these values.
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    ws_connections: AtomicU64,
    messages_pushed: AtomicU64,
}

/// Point-in-time copy of [`GatewayMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub ws_connections: u64,
    pub messages_pushed: u64,
}

impl GatewayMetrics {
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Count an open WebSocket session until the guard is dropped
    #[must_use]
    pub fn connection_opened(self: &Arc<Self>) -> ConnectionGuard {
        self.ws_connections.fetch_add(1, Ordering::Relaxed);
        ConnectionGuard {
            metrics: Arc::clone(self),
        }
    }

    pub fn message_pushed(&self) {
        self.messages_pushed.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn ws_connections(&self) -> u64 {
        self.ws_connections.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn messages_pushed(&self) -> u64 {
        self.messages_pushed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ws_connections: self.ws_connections(),
            messages_pushed: self.messages_pushed(),
        }
    }
}

/// Decrements the connection gauge exactly once, on drop
#[derive(Debug)]
pub struct ConnectionGuard {
    metrics: Arc<GatewayMetrics>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.metrics.ws_connections.fetch_sub(1, Ordering::Relaxed);
    }
}
