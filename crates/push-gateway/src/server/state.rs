//! Gateway state
//!
//! Application state shared by every handler.

use crate::session::{GatewayMetrics, SessionEngine};
use push_bus::SharedBus;
use push_common::AppConfig;
use std::sync::Arc;

/// Gateway application state
#[derive(Clone)]
pub struct GatewayState {
    /// Drives SSE and WebSocket sessions
    engine: SessionEngine,
    /// Broker used for publishing and health checks
    bus: SharedBus,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    pub fn new(engine: SessionEngine, bus: SharedBus, config: AppConfig) -> Self {
        Self {
            engine,
            bus,
            config: Arc::new(config),
        }
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn bus(&self) -> &SharedBus {
        &self.bus
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        self.engine.metrics()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("engine", &self.engine)
            .field("bus", &self.bus.name())
            .field("config", &"AppConfig")
            .finish()
    }
}
