//! Dithered session lifetimes
//!
//! Each session lives for a random duration in `[min, max]`. Clients are asked
//! to reconnect one grace period before that, so a fleet of connections
//! opened together (after a deploy, say) drifts apart instead of reconnecting
//! in lockstep.

use parking_lot::Mutex;
use push_common::PushConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Errors building a scheduler
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("minimum reconnect duration {min:?} exceeds maximum {max:?}")]
    InvalidRange { min: Duration, max: Duration },
}

/// Lifetime and reconnect timing for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPlan {
    /// When the session is forcibly ended
    pub lifetime: Duration,
    /// When the reconnect request is sent, measured from session start
    pub reconnect_offset: Duration,
}

impl ReconnectPlan {
    /// A grace period longer than the lifetime clamps the offset to zero.
    #[must_use]
    pub fn new(lifetime: Duration, grace_period: Duration) -> Self {
        Self {
            lifetime,
            reconnect_offset: lifetime.saturating_sub(grace_period),
        }
    }
}

/// Draws a [`ReconnectPlan`] per session
#[derive(Debug)]
pub struct ReconnectScheduler {
    min: Duration,
    max: Duration,
    grace_period: Duration,
    rng: Mutex<StdRng>,
}

impl ReconnectScheduler {
    /// Scheduler seeded from OS entropy
    pub fn new(min: Duration, max: Duration, grace_period: Duration) -> Result<Self, SchedulerError> {
        Self::with_rng(min, max, grace_period, StdRng::from_entropy())
    }

    /// Scheduler with a fixed seed, for reproducible lifetimes
    pub fn with_seed(
        min: Duration,
        max: Duration,
        grace_period: Duration,
        seed: u64,
    ) -> Result<Self, SchedulerError> {
        Self::with_rng(min, max, grace_period, StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &PushConfig) -> Result<Self, SchedulerError> {
        Self::new(
            config.reconnect_dither_min,
            config.reconnect_dither_max,
            config.client_close_grace_period,
        )
    }

    fn with_rng(
        min: Duration,
        max: Duration,
        grace_period: Duration,
        rng: StdRng,
    ) -> Result<Self, SchedulerError> {
        if min > max {
            return Err(SchedulerError::InvalidRange { min, max });
        }

        Ok(Self {
            min,
            max,
            grace_period,
            rng: Mutex::new(rng),
        })
    }

    /// Draw a lifetime uniformly from `[min, max]` at millisecond resolution
    pub fn plan(&self) -> ReconnectPlan {
        let span_ms = u64::try_from((self.max - self.min).as_millis()).unwrap_or(u64::MAX);
        let dither_ms = self.rng.lock().gen_range(0..=span_ms);
        ReconnectPlan::new(
            self.min.saturating_add(Duration::from_millis(dither_ms)),
            self.grace_period,
        )
    }

    #[must_use]
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    #[must_use]
    pub fn range(&self) -> (Duration, Duration) {
        (self.min, self.max)
    }
}
