//! Redis Pub/Sub module.
//!
//! Channel parsing plus the Redis publisher and subscriber behind [`RedisBus`].

mod channels;
mod publisher;
mod redis_bus;
mod subscriber;

pub use channels::{ChannelError, ChannelSet, CHANNEL_SEPARATOR};
pub use publisher::Publisher;
pub use redis_bus::RedisBus;
pub use subscriber::Subscriber;
