//! # push-gateway
//!
//! Real-time push over Server-Sent Events and WebSockets.
//!
//! Every connection runs one [`session::SessionEngine`] session: a merged
//! stream of channel messages, keep-alive frames and a single reconnect
//! request, bounded by a randomized lifetime so that clients do not all
//! reconnect at once.

pub mod protocol;
pub mod server;
pub mod session;
pub mod transport;

pub use server::{create_app, create_gateway_state, create_router, run, run_server, GatewayState};
