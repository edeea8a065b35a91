//! Redis Pub/Sub publisher.

use crate::error::BusResult;
use crate::pool::RedisPool;
use redis::AsyncCommands;

/// Redis Pub/Sub publisher
#[derive(Clone, Debug)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish a raw payload to a channel.
    ///
    /// Returns the number of subscriptions Redis delivered it to.
    pub async fn publish(&self, channel: &str, payload: &str) -> BusResult<u32> {
        let mut conn = self.pool.get().await?;

        let receivers: u32 = conn.publish(channel, payload).await?;

        tracing::debug!(
            channel = %channel,
            receivers = receivers,
            "Published message"
        );

        Ok(receivers)
    }

    /// Access the underlying pool
    #[must_use]
    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }
}
