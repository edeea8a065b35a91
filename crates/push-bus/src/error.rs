//! Bus error types

/// Error type for bus operations
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Invalid payload on channel '{channel}': {reason}")]
    Payload { channel: String, reason: String },

    #[error("Subscription closed by the broker")]
    Closed,
}

/// Result type for bus operations
pub type BusResult<T> = Result<T, BusError>;
