//! Test fixtures and wire types
//!
//! Mirrors of the gateway's JSON bodies, kept separate so the tests check the
//! wire format rather than the server's own types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Channel name no other test uses
pub fn unique_channel(prefix: &str) -> String {
    format!("{prefix}-{}-{}", std::process::id(), unique_suffix())
}

/// POST /messages body
#[derive(Debug, Clone, Serialize)]
pub struct PublishBody {
    pub channel: String,
    pub message: Value,
}

impl PublishBody {
    pub fn text(channel: &str, message: &str) -> Self {
        Self {
            channel: channel.to_string(),
            message: Value::String(message.to_string()),
        }
    }
}

/// POST /messages response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PublishResult {
    pub subscribers: u32,
}

/// `{"error": ...}` body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// GET /health response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub bus: String,
    pub ws_connections: u64,
    pub messages_pushed: u64,
}

/// Data of a `message` event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageData {
    pub channel: String,
    pub message: String,
}

/// WebSocket text frame `{"event": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsFrame {
    pub event: String,
    pub data: Value,
}

impl WsFrame {
    pub fn control(event: &str) -> Self {
        Self {
            event: event.to_string(),
            data: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn message_data(&self) -> Option<MessageData> {
        (self.event == "message")
            .then(|| serde_json::from_value(self.data.clone()).ok())
            .flatten()
    }
}

/// One parsed Server-Sent Event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

impl SseEvent {
    /// Parse one `\n\n`-terminated block; comment-only blocks yield `None`
    pub fn parse(block: &str) -> Option<Self> {
        let mut event = None;
        let mut data: Vec<&str> = Vec::new();

        for line in block.lines() {
            if let Some(value) = line.strip_prefix("event:") {
                event = Some(value.strip_prefix(' ').unwrap_or(value).to_string());
            } else if let Some(value) = line.strip_prefix("data:") {
                data.push(value.strip_prefix(' ').unwrap_or(value));
            }
        }

        if event.is_none() && data.is_empty() {
            return None;
        }

        Some(Self {
            event: event.unwrap_or_else(|| "message".to_string()),
            data: data.join("\n"),
        })
    }

    pub fn message_data(&self) -> Option<MessageData> {
        (self.event == "message")
            .then(|| serde_json::from_str(&self.data).ok())
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_block() {
        let event = SseEvent::parse("event: message\ndata: {\"channel\":\"a\",\"message\":\"b\"}\n\n").unwrap();
        assert_eq!(event.event, "message");
        assert_eq!(
            event.message_data(),
            Some(MessageData {
                channel: "a".to_string(),
                message: "b".to_string()
            })
        );
    }

    #[test]
    fn test_parse_comment_block() {
        assert_eq!(SseEvent::parse(": keep-alive\n\n"), None);
    }
}
