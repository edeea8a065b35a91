//! Redis Pub/Sub subscriber.
//!
//! Every subscription gets its own pub/sub connection so that dropping the
//! returned stream unsubscribes exactly that client and nobody else.

use crate::bus::{BusMessage, MessageStream};
use crate::error::{BusError, BusResult};
use crate::pubsub::ChannelSet;
use futures_util::stream::{self, StreamExt};
use redis::Client;

/// Redis Pub/Sub subscriber
#[derive(Clone, Debug)]
pub struct Subscriber {
    client: Client,
}

impl Subscriber {
    /// Create a subscriber for the given Redis URL.
    ///
    /// No connection is opened until [`Subscriber::subscribe`] is called.
    pub fn new(redis_url: &str) -> BusResult<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// Subscribe to every channel in the set on a dedicated connection.
    ///
    /// The stream yields [`BusError::Closed`] once if the connection goes away.
    pub async fn subscribe(&self, channels: &ChannelSet) -> BusResult<MessageStream> {
        let mut pubsub = self.client.get_async_pubsub().await?;

        for channel in channels.iter() {
            pubsub.subscribe(channel).await?;
        }

        tracing::debug!(channels = %channels, "Subscribed to Redis channels");

        let messages = pubsub.into_on_message().map(|msg| {
            let channel = msg.get_channel_name().to_string();
            match msg.get_payload::<String>() {
                Ok(payload) => {
                    tracing::trace!(channel = %channel, "Received Pub/Sub message");
                    Ok(BusMessage::new(channel, payload))
                }
                Err(e) => Err(BusError::Payload {
                    channel,
                    reason: e.to_string(),
                }),
            }
        });

        let closed = stream::once(async {
            tracing::warn!("Pub/Sub stream ended");
            Err(BusError::Closed)
        });

        Ok(messages.chain(closed).boxed())
    }
}
