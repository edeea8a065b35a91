//! Events a session emits, and the signals its source tasks feed it

use crate::protocol::{EventName, InboundFrame, PushFrame};
use push_bus::BusMessage;

use super::SessionError;

/// Event written to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Message(BusMessage),
    Heartbeat,
    Ping,
    Pong,
    Reconnect,
}

impl SessionEvent {
    #[must_use]
    pub fn name(&self) -> EventName {
        match self {
            Self::Message(_) => EventName::Message,
            Self::Heartbeat => EventName::Heartbeat,
            Self::Ping => EventName::Ping,
            Self::Pong => EventName::Pong,
            Self::Reconnect => EventName::Reconnect,
        }
    }

    #[must_use]
    pub fn to_frame(&self) -> PushFrame {
        match self {
            Self::Message(message) => PushFrame::message(&message.channel, &message.payload),
            other => PushFrame::control(other.name()),
        }
    }
}

/// Input to a session's control loop.
///
/// Source tasks only ever send these; the control loop alone writes to the
/// transport and owns the liveness state.
#[derive(Debug)]
pub(crate) enum SessionSignal {
    Message(BusMessage),
    Tick,
    Reconnect,
    Inbound(InboundFrame),
    PeerGone,
    Failed(SessionError),
}
