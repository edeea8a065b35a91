//! # push-bus
//!
//! Publish/subscribe plumbing for the push gateway.
//!
//! ## Features
//!
//! - **Channel sets**: Validated, de-duplicated channel lists parsed from query strings
//! - **Bus abstraction**: [`PubSubBus`] hides the broker behind `publish`/`subscribe`
//! - **Redis**: Pooled `PUBLISH`, one dedicated pub/sub connection per subscription
//! - **Memory**: In-process broadcast bus for single-node deployments and tests
//!
//! ## Example
//!
//! ```ignore
//! use push_bus::{ChannelSet, MemoryBus, PubSubBus};
//! use futures_util::StreamExt;
//!
//! let bus = MemoryBus::new();
//! let channels = ChannelSet::parse(Some("foo,bar"))?;
//! let mut messages = bus.subscribe(&channels).await?;
//!
//! let subscribers = bus.publish("foo", "hello").await?;
//! assert_eq!(subscribers, 1);
//!
//! let message = messages.next().await.unwrap()?;
//! assert_eq!(message.channel, "foo");
//! ```

pub mod bus;
pub mod error;
pub mod memory;
pub mod pool;
pub mod pubsub;

pub use bus::{BusMessage, MessageStream, PubSubBus, SharedBus};
pub use error::{BusError, BusResult};
pub use memory::MemoryBus;
pub use pool::{RedisPool, RedisPoolConfig};
pub use pubsub::{ChannelError, ChannelSet, Publisher, RedisBus, Subscriber};
