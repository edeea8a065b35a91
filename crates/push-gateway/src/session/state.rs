//! Session state machine

use crate::transport::{CloseReason, TransportKind};
use chrono::{DateTime, Utc};
use push_bus::ChannelSet;
use std::time::Duration;
use uuid::Uuid;

/// Lifecycle of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Opening,
    Validating,
    Active,
    Closing,
    Closed,
    BadRequest,
    InternalError,
    LivenessTimeout,
}

impl SessionState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Closed | Self::BadRequest | Self::InternalError | Self::LivenessTimeout
        )
    }

    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Opening, Self::Validating)
                | (Self::Validating, Self::Active | Self::BadRequest | Self::InternalError)
                | (
                    Self::Active,
                    Self::Closing | Self::InternalError | Self::LivenessTimeout
                )
                | (Self::Closing, Self::Closed)
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Validating => "validating",
            Self::Active => "active",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::BadRequest => "bad_request",
            Self::InternalError => "internal_error",
            Self::LivenessTimeout => "liveness_timeout",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-connection session record
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    kind: TransportKind,
    state: SessionState,
    established_at: DateTime<Utc>,
    channels: Option<ChannelSet>,
    lifetime: Option<Duration>,
}

impl Session {
    #[must_use]
    pub fn new(kind: TransportKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            state: SessionState::Opening,
            established_at: Utc::now(),
            channels: None,
            lifetime: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }

    /// Channels the client asked for, once validated
    #[must_use]
    pub fn channels(&self) -> Option<&ChannelSet> {
        self.channels.as_ref()
    }

    /// Dithered lifetime, once the session is active
    #[must_use]
    pub fn lifetime(&self) -> Option<Duration> {
        self.lifetime
    }

    pub(crate) fn channels_display(&self) -> String {
        self.channels
            .as_ref()
            .map(ChannelSet::to_string)
            .unwrap_or_default()
    }

    pub(crate) fn lifetime_ms(&self) -> u64 {
        self.lifetime
            .map_or(0, |l| u64::try_from(l.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn set_channels(&mut self, channels: ChannelSet) {
        self.channels = Some(channels);
    }

    /// Enter `Active` with the lifetime drawn for this session
    pub fn activate(&mut self, lifetime: Duration) -> bool {
        self.lifetime = Some(lifetime);
        self.transition(SessionState::Active)
    }

    /// Move to `next`, returning false and staying put if the move is not allowed
    pub fn transition(&mut self, next: SessionState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::debug!(
                session_id = %self.id,
                from = %self.state,
                to = %next,
                "Ignoring invalid session transition"
            );
            return false;
        }

        tracing::trace!(session_id = %self.id, from = %self.state, to = %next, "Session transition");
        self.state = next;
        true
    }

    /// Walk to the terminal state matching how the session ended
    pub fn finish(&mut self, reason: CloseReason) -> SessionState {
        match reason {
            CloseReason::LifetimeElapsed | CloseReason::PeerClosed => {
                self.transition(SessionState::Closing);
                self.transition(SessionState::Closed);
            }
            CloseReason::LivenessTimeout => {
                self.transition(SessionState::LivenessTimeout);
            }
            CloseReason::InternalError => {
                self.transition(SessionState::InternalError);
            }
            CloseReason::BadRequest => {
                self.transition(SessionState::BadRequest);
            }
        }
        self.state
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub state: SessionState,
    pub reason: CloseReason,
    /// Frames successfully written, including control frames
    pub events_sent: u64,
}
