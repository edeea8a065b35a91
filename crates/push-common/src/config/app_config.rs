//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub bus: BusConfig,
    pub redis: RedisConfig,
    pub push: PushConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which pub/sub broker backs the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusBackend {
    #[default]
    Redis,
    /// In-process broadcast bus; only reaches subscribers of this instance
    Memory,
}

impl FromStr for BusBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidValue("BUS_BACKEND", other.to_string())),
        }
    }
}

/// Pub/sub bus selection
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    #[serde(default)]
    pub backend: BusBackend,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Longest session lifetime accepted from configuration (30 days)
pub const MAX_RECONNECT_DITHER_SECS: u64 = 30 * 24 * 60 * 60;

/// Connection lifetime and keep-alive settings for push sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PushConfig {
    /// Shortest lifetime a session can be given
    pub reconnect_dither_min: Duration,
    /// Longest lifetime a session can be given
    pub reconnect_dither_max: Duration,
    /// Time reserved before forced termination for the client to reconnect on its own
    pub client_close_grace_period: Duration,
    /// Heartbeat (SSE) and ping (WebSocket) period
    pub heartbeat_interval: Duration,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            reconnect_dither_min: Duration::from_secs(default_reconnect_dither_min_secs()),
            reconnect_dither_max: Duration::from_secs(default_reconnect_dither_max_secs()),
            client_close_grace_period: Duration::from_secs(default_grace_period_secs()),
            heartbeat_interval: Duration::from_secs(default_heartbeat_interval_secs()),
        }
    }
}

impl PushConfig {
    /// Check the cross-field constraints
    ///
    /// # Errors
    /// Returns an error if the minimum dither exceeds the maximum, the maximum exceeds
    /// [`MAX_RECONNECT_DITHER_SECS`] or the heartbeat interval is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reconnect_dither_max > Duration::from_secs(MAX_RECONNECT_DITHER_SECS) {
            return Err(ConfigError::InvalidValue(
                "PUSH_RECONNECT_DITHER_MAX_SECS",
                format!(
                    "{}s is above the limit of {MAX_RECONNECT_DITHER_SECS}s",
                    self.reconnect_dither_max.as_secs()
                ),
            ));
        }

        if self.reconnect_dither_min > self.reconnect_dither_max {
            return Err(ConfigError::InvalidValue(
                "PUSH_RECONNECT_DITHER_MIN_SECS",
                format!(
                    "{}s is greater than the maximum of {}s",
                    self.reconnect_dither_min.as_secs(),
                    self.reconnect_dither_max.as_secs()
                ),
            ));
        }

        if self.heartbeat_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "PUSH_HEARTBEAT_INTERVAL_SECS",
                "must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

// Default value functions
fn default_app_name() -> String {
    "push-gateway".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_redis_max_connections() -> u32 {
    16
}

fn default_reconnect_dither_min_secs() -> u64 {
    1800 // 30 minutes
}

fn default_reconnect_dither_max_secs() -> u64 {
    3600 // 1 hour
}

fn default_grace_period_secs() -> u64 {
    60
}

fn default_heartbeat_interval_secs() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value or the push settings are inconsistent
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// Same as [`AppConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let push = PushConfig {
            reconnect_dither_min: seconds(
                &lookup,
                "PUSH_RECONNECT_DITHER_MIN_SECS",
                default_reconnect_dither_min_secs(),
            )?,
            reconnect_dither_max: seconds(
                &lookup,
                "PUSH_RECONNECT_DITHER_MAX_SECS",
                default_reconnect_dither_max_secs(),
            )?,
            client_close_grace_period: seconds(
                &lookup,
                "PUSH_CLIENT_CLOSE_GRACE_PERIOD_SECS",
                default_grace_period_secs(),
            )?,
            heartbeat_interval: seconds(
                &lookup,
                "PUSH_HEARTBEAT_INTERVAL_SECS",
                default_heartbeat_interval_secs(),
            )?,
        };
        push.validate()?;

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(default_host),
                port: parsed(&lookup, "SERVER_PORT")?.unwrap_or_else(default_port),
            },
            bus: BusConfig {
                backend: lookup("BUS_BACKEND")
                    .map(|s| s.parse::<BusBackend>())
                    .transpose()?
                    .unwrap_or_default(),
            },
            redis: RedisConfig {
                url: lookup("REDIS_URL").unwrap_or_else(default_redis_url),
                max_connections: parsed(&lookup, "REDIS_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_redis_max_connections),
            },
            push,
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw.clone()))
        })
        .transpose()
}

fn seconds<F>(lookup: &F, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(Duration::from_secs(parsed(lookup, key)?.unwrap_or(default)))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
