//! Wire protocol shared by the SSE and WebSocket transports
//!
//! Frames are JSON objects of the form `{"event": <name>, "data": <object>}`;
//! errors are `{"error": <message>}`.

mod close_codes;
mod frames;

pub use close_codes::CloseCode;
pub use frames::{ErrorFrame, EventName, InboundFrame, InboundKind, MessageData, PushFrame};
