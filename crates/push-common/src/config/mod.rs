//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BusBackend, BusConfig, ConfigError, Environment, PushConfig,
    RedisConfig, ServerConfig,
};
