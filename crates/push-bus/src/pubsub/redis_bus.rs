//! Redis-backed [`PubSubBus`].

use crate::bus::{MessageStream, PubSubBus};
use crate::error::BusResult;
use crate::pool::{RedisPool, RedisPoolConfig};
use crate::pubsub::{ChannelSet, Publisher, Subscriber};
use async_trait::async_trait;

/// Bus that fans messages out through Redis Pub/Sub
#[derive(Clone, Debug)]
pub struct RedisBus {
    publisher: Publisher,
    subscriber: Subscriber,
}

impl RedisBus {
    /// Build the pool and subscriber client. Neither connects eagerly.
    pub fn new(config: &RedisPoolConfig) -> BusResult<Self> {
        let pool = RedisPool::new(config)?;
        let subscriber = Subscriber::new(&config.url)?;
        Ok(Self::from_parts(Publisher::new(pool), subscriber))
    }

    #[must_use]
    pub fn from_parts(publisher: Publisher, subscriber: Subscriber) -> Self {
        Self {
            publisher,
            subscriber,
        }
    }
}

#[async_trait]
impl PubSubBus for RedisBus {
    async fn publish(&self, channel: &str, payload: &str) -> BusResult<u32> {
        self.publisher.publish(channel, payload).await
    }

    async fn subscribe(&self, channels: &ChannelSet) -> BusResult<MessageStream> {
        self.subscriber.subscribe(channels).await
    }

    async fn health_check(&self) -> BusResult<()> {
        self.publisher.pool().health_check().await
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
