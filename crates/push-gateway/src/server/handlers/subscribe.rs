//! Subscription handlers
//!
//! GET /sse/messages?channels=a,b,c
//! GET /ws/messages?channels=a,b,c (WebSocket upgrade)

use axum::{
    extract::{Query, State, WebSocketUpgrade},
    response::{sse::Sse, Response},
};
use serde::Deserialize;

use crate::server::{ApiError, GatewayState};
use crate::transport::{SseBody, SseTransport, TransportKind, WsTransport};

/// Buffered SSE events per connection before writes wait on the client
const SSE_BUFFER_SIZE: usize = 64;

/// Query string shared by both subscription endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscribeQuery {
    pub channels: Option<String>,
}

/// Validation and the bus subscription happen before the 200 is sent, so
/// both still surface as plain HTTP errors.
pub async fn sse_subscribe(
    State(state): State<GatewayState>,
    Query(query): Query<SubscribeQuery>,
) -> Result<Sse<SseBody>, ApiError> {
    let pending = state
        .engine()
        .open(query.channels.as_deref(), TransportKind::Stream)
        .await?;

    let (transport, body) = SseTransport::channel(SSE_BUFFER_SIZE);
    let engine = state.engine().clone();
    tokio::spawn(async move {
        engine.run(pending, transport).await;
    });

    Ok(Sse::new(body))
}

pub async fn ws_subscribe(
    State(state): State<GatewayState>,
    Query(query): Query<SubscribeQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        state
            .engine()
            .serve(query.channels.as_deref(), WsTransport::new(socket))
            .await;
    })
}
