//! The broker seam used by the gateway.

use crate::error::BusResult;
use crate::pubsub::ChannelSet;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::sync::Arc;

/// A payload received on one of the subscribed channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Channel the payload was published to
    pub channel: String,
    /// Payload exactly as published
    pub payload: String,
}

impl BusMessage {
    #[must_use]
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

/// Merged, unbounded stream of messages for one subscription.
///
/// Dropping the stream releases the broker-side subscription.
pub type MessageStream = BoxStream<'static, BusResult<BusMessage>>;

/// At-most-once fan-out broker
#[async_trait]
pub trait PubSubBus: Send + Sync {
    /// Publish a payload, returning how many live subscriptions received it
    async fn publish(&self, channel: &str, payload: &str) -> BusResult<u32>;

    /// Open one subscription covering every channel in the set
    async fn subscribe(&self, channels: &ChannelSet) -> BusResult<MessageStream>;

    /// Check that the broker is reachable
    async fn health_check(&self) -> BusResult<()>;

    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;
}

/// Bus shared across handlers
pub type SharedBus = Arc<dyn PubSubBus>;
