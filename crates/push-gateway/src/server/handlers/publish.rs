//! Publish handler
//!
//! POST /messages

use axum::{extract::State, http::StatusCode, Json};
use push_common::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::server::{ApiError, BodyJson, GatewayState};

/// Request body for POST /messages
#[derive(Debug, Clone, Deserialize)]
pub struct PublishRequest {
    pub channel: String,
    #[serde(default)]
    pub message: Value,
}

impl PublishRequest {
    /// Payload as sent over the bus: strings verbatim, anything else as compact JSON
    pub fn payload(&self) -> Result<String, AppError> {
        match &self.message {
            Value::Null => Err(AppError::InvalidBody),
            Value::String(text) => Ok(text.clone()),
            other => Ok(serde_json::to_string(other)?),
        }
    }
}

/// Response body for POST /messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    /// Live subscriptions at publish time, not a delivery acknowledgement
    pub subscribers: u32,
}

pub async fn publish_message(
    State(state): State<GatewayState>,
    BodyJson(request): BodyJson<PublishRequest>,
) -> Result<(StatusCode, Json<PublishResponse>), ApiError> {
    let channel = request.channel.trim();
    if channel.is_empty() {
        tracing::info!("Rejected publish without channel");
        return Err(AppError::InvalidBody.into());
    }
    let payload = request.payload()?;

    tracing::info!(channel = %channel, "Publishing message");

    let subscribers = state.bus().publish(channel, &payload).await.map_err(|e| {
        tracing::error!(channel = %channel, error = %e, "Error while publishing message");
        e
    })?;

    tracing::info!(channel = %channel, subscribers = subscribers, "Message published");

    Ok((StatusCode::ACCEPTED, Json(PublishResponse { subscribers })))
}
