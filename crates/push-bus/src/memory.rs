//! In-process [`PubSubBus`] built on tokio broadcast channels.
//!
//! Gives single-node deployments and tests the same fan-out semantics as the
//! Redis backend without a broker.

use crate::bus::{BusMessage, MessageStream, PubSubBus};
use crate::error::BusResult;
use crate::pubsub::ChannelSet;
use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

const DEFAULT_CAPACITY: usize = 1024;

/// Broadcast-channel bus keyed by channel name
#[derive(Clone, Debug)]
pub struct MemoryBus {
    channels: Arc<DashMap<String, broadcast::Sender<BusMessage>>>,
    capacity: usize,
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Per-channel buffer size. Slow subscribers that fall further behind
    /// than this skip ahead.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Number of live subscriptions listening on a channel
    #[must_use]
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map_or(0, |sender| sender.receiver_count())
    }

    fn receiver(&self, channel: &str) -> ChannelReceiver {
        let rx = self
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        ChannelReceiver {
            rx: Some(rx),
            channel: channel.to_string(),
            registry: Arc::clone(&self.channels),
        }
    }
}

/// One channel's receiver. The registry entry goes away with the last one.
struct ChannelReceiver {
    rx: Option<broadcast::Receiver<BusMessage>>,
    channel: String,
    registry: Arc<DashMap<String, broadcast::Sender<BusMessage>>>,
}

impl ChannelReceiver {
    async fn recv(&mut self) -> Option<BusMessage> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        channel = %self.channel,
                        skipped = skipped,
                        "Subscriber lagged, messages dropped"
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for ChannelReceiver {
    fn drop(&mut self) {
        // Receiver first, so it no longer counts
        drop(self.rx.take());
        self.registry
            .remove_if(&self.channel, |_, sender| sender.receiver_count() == 0);
    }
}

fn receiver_stream(receiver: ChannelReceiver) -> MessageStream {
    stream::unfold(receiver, |mut receiver| async move {
        let message = receiver.recv().await?;
        Some((Ok(message), receiver))
    })
    .boxed()
}

#[async_trait]
impl PubSubBus for MemoryBus {
    async fn publish(&self, channel: &str, payload: &str) -> BusResult<u32> {
        let delivered = match self.channels.get(channel) {
            Some(sender) => sender
                .send(BusMessage::new(channel, payload))
                .unwrap_or(0),
            None => 0,
        };

        if delivered == 0 {
            self.channels
                .remove_if(channel, |_, sender| sender.receiver_count() == 0);
        }

        tracing::debug!(channel = %channel, receivers = delivered, "Published message");

        Ok(u32::try_from(delivered).unwrap_or(u32::MAX))
    }

    async fn subscribe(&self, channels: &ChannelSet) -> BusResult<MessageStream> {
        let streams: Vec<MessageStream> = channels
            .iter()
            .map(|channel| receiver_stream(self.receiver(channel)))
            .collect();

        Ok(stream::select_all(streams).boxed())
    }

    async fn health_check(&self) -> BusResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
