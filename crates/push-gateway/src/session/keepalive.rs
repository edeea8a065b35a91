//! Keep-alive monitors
//!
//! SSE sessions get a one-way heartbeat. WebSocket sessions get a ping every
//! interval and must answer each one with a pong before the next is due.

use super::events::SessionSignal;
use super::{SessionError, SessionEvent};
use crate::protocol::{InboundFrame, InboundKind};
use crate::transport::TransportKind;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Whether the last ping has been answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessState {
    AwaitingPong,
    Responded,
}

/// Keep-alive logic for one session, driven by the session's control loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeepAliveMonitor {
    /// One-way heartbeat, no reply expected
    Heartbeat,
    /// Ping/pong with liveness tracking
    PingPong {
        liveness: LivenessState,
        interval: Duration,
    },
}

impl KeepAliveMonitor {
    #[must_use]
    pub fn for_transport(kind: TransportKind, interval: Duration) -> Self {
        match kind {
            TransportKind::Stream => Self::Heartbeat,
            TransportKind::Socket => Self::PingPong {
                liveness: LivenessState::Responded,
                interval,
            },
        }
    }

    /// Handle an interval tick.
    ///
    /// For ping/pong, an unanswered previous ping fails the session instead of
    /// sending another one.
    pub fn on_tick(&mut self) -> Result<SessionEvent, SessionError> {
        match self {
            Self::Heartbeat => Ok(SessionEvent::Heartbeat),
            Self::PingPong { liveness, interval } => {
                if *liveness == LivenessState::AwaitingPong {
                    return Err(SessionError::LivenessTimeout(*interval));
                }
                *liveness = LivenessState::AwaitingPong;
                Ok(SessionEvent::Ping)
            }
        }
    }

    /// Handle a frame from the peer, returning a reply if one is due
    pub fn on_inbound(&mut self, frame: &InboundFrame) -> Option<SessionEvent> {
        match (self, frame.kind()) {
            (Self::PingPong { .. }, InboundKind::Ping) => Some(SessionEvent::Pong),
            (Self::PingPong { liveness, .. }, InboundKind::Pong) => {
                *liveness = LivenessState::Responded;
                None
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn liveness(&self) -> Option<LivenessState> {
        match self {
            Self::Heartbeat => None,
            Self::PingPong { liveness, .. } => Some(*liveness),
        }
    }
}

/// Send a tick immediately, then once per interval, until cancelled
pub(crate) async fn run_ticker(
    interval: Duration,
    tx: mpsc::Sender<SessionSignal>,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if tx.send(SessionSignal::Tick).await.is_err() {
                    break;
                }
            }
        }
    }
}
