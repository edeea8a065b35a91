//! Transport capabilities used by the session engine
//!
//! A transport is split into a [`FrameSink`] owned by the session's control
//! loop and a [`FrameSource`] drained by a reader task, so the two halves
//! never contend for the same borrow.

mod sse;
#[cfg(test)]
pub(crate) mod testing;
mod ws;

pub use sse::{SseBody, SseSink, SseSource, SseTransport};
pub use ws::{WsSink, WsSource, WsTransport};

use crate::protocol::{CloseCode, ErrorFrame, InboundFrame, PushFrame};
use async_trait::async_trait;

/// Which kind of client connection a session serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// One-way Server-Sent Events
    Stream,
    /// Bidirectional WebSocket
    Socket,
}

impl TransportKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stream => "sse",
            Self::Socket => "ws",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a transport is being closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    LifetimeElapsed,
    PeerClosed,
    LivenessTimeout,
    InternalError,
    BadRequest,
}

impl CloseReason {
    #[must_use]
    pub const fn close_code(self) -> CloseCode {
        match self {
            Self::LifetimeElapsed | Self::PeerClosed => CloseCode::Normal,
            Self::LivenessTimeout => CloseCode::SessionTimeout,
            Self::InternalError => CloseCode::InternalError,
            Self::BadRequest => CloseCode::PolicyViolation,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LifetimeElapsed => "lifetime_elapsed",
            Self::PeerClosed => "peer_closed",
            Self::LivenessTimeout => "liveness_timeout",
            Self::InternalError => "internal_error",
            Self::BadRequest => "bad_request",
        }
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Peer disconnected")]
    Disconnected,

    #[error("Failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    Socket(String),
}

impl TransportError {
    /// Whether the error means the peer is gone rather than a server fault
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Socket(_))
    }
}

/// Outbound half of a transport
#[async_trait]
pub trait FrameSink: Send + 'static {
    /// Write one event frame
    async fn emit(&mut self, frame: &PushFrame) -> Result<(), TransportError>;

    /// Write a structured error frame
    async fn reject(&mut self, error: &ErrorFrame) -> Result<(), TransportError>;

    /// End the connection. Errors are swallowed: the peer may already be gone.
    async fn close(&mut self, reason: CloseReason);
}

/// Inbound half of a transport
#[async_trait]
pub trait FrameSource: Send + 'static {
    /// Next inbound frame, or `None` once the peer has gone away
    async fn receive(&mut self) -> Option<InboundFrame>;
}

/// A client connection the session engine can drive
pub trait Transport: Send + 'static {
    type Sink: FrameSink;
    type Source: FrameSource;

    fn kind(&self) -> TransportKind;

    fn split(self) -> (Self::Sink, Self::Source);
}
