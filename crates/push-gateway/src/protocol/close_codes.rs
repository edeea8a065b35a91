//! WebSocket close codes
//!
//! Standard codes from RFC 6455 plus one gateway-specific code for liveness failures.

use serde::{Deserialize, Serialize};

/// Close codes sent by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Lifetime elapsed or the peer closed first
    Normal = 1000,
    /// Request rejected during validation
    PolicyViolation = 1008,
    /// Broker or serialization failure
    InternalError = 1011,
    /// Peer did not answer a ping within one interval
    SessionTimeout = 4009,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1000 => Some(Self::Normal),
            1008 => Some(Self::PolicyViolation),
            1011 => Some(Self::InternalError),
            4009 => Some(Self::SessionTimeout),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether the client is expected to open a new connection afterwards
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        matches!(self, Self::Normal | Self::InternalError | Self::SessionTimeout)
    }

    /// Human readable reason, sent in the close frame
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Normal => "Session ended",
            Self::PolicyViolation => "Invalid subscription request",
            Self::InternalError => "Internal server error",
            Self::SessionTimeout => "Session timeout",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::PolicyViolation => "PolicyViolation",
            Self::InternalError => "InternalError",
            Self::SessionTimeout => "SessionTimeout",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
