//! Frame formats
//!
//! The same [`PushFrame`] is sent whole as a WebSocket text frame, or split
//! into the `event:` and `data:` fields of a Server-Sent Event.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Names of the events the gateway emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventName {
    Message,
    Heartbeat,
    Ping,
    Pong,
    Reconnect,
    Error,
}

impl EventName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Heartbeat => "heartbeat",
            Self::Ping => "ping",
            Self::Pong => "pong",
            Self::Reconnect => "reconnect",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data carried by a `message` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub channel: String,
    pub message: String,
}

/// Outbound frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushFrame {
    pub event: EventName,
    pub data: Value,
}

impl PushFrame {
    /// Frame for a channel message
    #[must_use]
    pub fn message(channel: &str, payload: &str) -> Self {
        let mut data = Map::new();
        data.insert("channel".to_string(), Value::String(channel.to_string()));
        data.insert("message".to_string(), Value::String(payload.to_string()));
        Self {
            event: EventName::Message,
            data: Value::Object(data),
        }
    }

    /// Control frame with an empty data object
    #[must_use]
    pub fn control(event: EventName) -> Self {
        Self {
            event,
            data: Value::Object(Map::new()),
        }
    }

    /// Whole frame as JSON, for WebSocket text frames
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Only the data object as JSON, for the SSE `data:` field
    pub fn data_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.data)
    }
}

/// `{"error": ...}` body used by every transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrame {
    pub error: String,
}

impl ErrorFrame {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// How the keep-alive logic treats an inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundKind {
    Ping,
    Pong,
    Other,
}

/// Frame received from a WebSocket client
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl InboundFrame {
    #[must_use]
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: Value::Null,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn kind(&self) -> InboundKind {
        match self.event.as_str() {
            "ping" => InboundKind::Ping,
            "pong" => InboundKind::Pong,
            _ => InboundKind::Other,
        }
    }
}
