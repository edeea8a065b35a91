//! Health check handler
//!
//! GET /health

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub bus: String,
    pub ws_connections: u64,
    pub messages_pushed: u64,
}

/// Reports bus reachability plus the gateway counters
pub async fn health_check(State(state): State<GatewayState>) -> (StatusCode, Json<HealthResponse>) {
    let bus_healthy = match state.bus().health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(bus = state.bus().name(), error = %e, "Bus health check failed");
            false
        }
    };

    let metrics = state.metrics().snapshot();
    let response = HealthResponse {
        status: if bus_healthy { "ok" } else { "degraded" }.to_string(),
        bus: if bus_healthy { "up" } else { "down" }.to_string(),
        ws_connections: metrics.ws_connections,
        messages_pushed: metrics.messages_pushed,
    };
    let status = if bus_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
