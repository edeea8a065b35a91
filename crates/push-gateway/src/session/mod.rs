//! Per-connection session engine
//!
//! A session merges three independently timed sources into one outbound
//! sequence: channel messages, keep-alive frames and a single reconnect
//! request. It ends when its dithered lifetime elapses, the peer goes away,
//! the peer stops answering pings, or the bus fails.

mod engine;
mod error;
mod events;
mod keepalive;
mod metrics;
mod scheduler;
mod state;
mod subscription;

pub use engine::{PendingSession, SessionEngine};
pub use error::SessionError;
pub use events::SessionEvent;
pub use keepalive::{KeepAliveMonitor, LivenessState};
pub use metrics::{ConnectionGuard, GatewayMetrics, MetricsSnapshot};
pub use scheduler::{ReconnectPlan, ReconnectScheduler, SchedulerError};
pub use state::{Session, SessionOutcome, SessionState};
pub use subscription::ChannelSubscription;
