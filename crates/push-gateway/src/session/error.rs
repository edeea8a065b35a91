//! Session error types

use super::SessionState;
use crate::transport::{CloseReason, TransportError};
use push_bus::{BusError, ChannelError};
use std::time::Duration;

/// Errors that end a session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ChannelError),

    #[error("No pong received within {0:?}")]
    LivenessTimeout(Duration),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SessionError {
    /// Terminal state a session ends in after this error
    #[must_use]
    pub fn terminal_state(&self) -> SessionState {
        match self {
            Self::Validation(_) => SessionState::BadRequest,
            Self::LivenessTimeout(_) => SessionState::LivenessTimeout,
            Self::Bus(_) | Self::Transport(_) => SessionState::InternalError,
        }
    }

    /// How the transport is closed after this error
    #[must_use]
    pub fn close_reason(&self) -> CloseReason {
        match self {
            Self::Validation(_) => CloseReason::BadRequest,
            Self::LivenessTimeout(_) => CloseReason::LivenessTimeout,
            Self::Bus(_) | Self::Transport(_) => CloseReason::InternalError,
        }
    }

    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
