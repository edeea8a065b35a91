//! HTTP handlers

mod health;
mod publish;
mod subscribe;

pub use health::{health_check, HealthResponse};
pub use publish::{publish_message, PublishRequest, PublishResponse};
pub use subscribe::{sse_subscribe, ws_subscribe, SubscribeQuery};
