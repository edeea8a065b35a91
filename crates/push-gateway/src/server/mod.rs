//! Gateway server setup
//!
//! Routes, state construction and the server runner.

mod extract;
pub mod handlers;
mod middleware;
mod response;
mod state;

pub use extract::BodyJson;
pub use middleware::{apply_middleware, REQUEST_ID_HEADER};
pub use response::ApiError;
pub use state::GatewayState;

use crate::session::{GatewayMetrics, ReconnectScheduler, SessionEngine};
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use push_bus::{MemoryBus, RedisBus, RedisPoolConfig, SharedBus};
use push_common::{AppConfig, AppError, BusBackend};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

/// Upper bound for a publish request
const PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route(
            "/messages",
            post(handlers::publish_message).layer(TimeoutLayer::with_status_code(
                StatusCode::SERVICE_UNAVAILABLE,
                PUBLISH_TIMEOUT,
            )),
        )
        .route("/sse/messages", get(handlers::sse_subscribe))
        .route("/ws/messages", get(handlers::ws_subscribe))
        .route("/health", get(handlers::health_check))
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    apply_middleware(create_router()).with_state(state)
}

/// Build the configured bus backend
pub fn create_bus(config: &AppConfig) -> Result<SharedBus, AppError> {
    match config.bus.backend {
        BusBackend::Redis => {
            tracing::info!("Using Redis bus");
            let bus = RedisBus::new(&RedisPoolConfig::from(&config.redis)).map_err(AppError::bus)?;
            Ok(Arc::new(bus))
        }
        BusBackend::Memory => {
            tracing::info!("Using in-process bus");
            Ok(Arc::new(MemoryBus::new()))
        }
    }
}

/// Initialize all dependencies and create `GatewayState`
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    config
        .push
        .validate()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let bus = create_bus(&config)?;
    if let Err(e) = bus.health_check().await {
        // Not fatal: /health reports the bus as down until it recovers.
        tracing::warn!(bus = bus.name(), error = %e, "Bus not reachable at startup");
    }

    let scheduler = ReconnectScheduler::from_config(&config.push)
        .map_err(|e| AppError::Config(e.to_string()))?;

    let engine = SessionEngine::new(
        bus.clone(),
        Arc::new(scheduler),
        GatewayMetrics::new_shared(),
        config.push.heartbeat_interval,
    );

    Ok(GatewayState::new(engine, bus, config))
}

/// Run the gateway server until Ctrl-C.
///
/// On shutdown every open session is drained: it gets its reconnect request
/// and is closed, so in-flight streams do not hold the process open.
pub async fn run_server(app: Router, addr: SocketAddr, engine: SessionEngine) -> Result<(), AppError> {
    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            engine.drain();
        })
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining sessions");
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;

    let state = create_gateway_state(config).await?;
    let engine = state.engine().clone();
    let app = create_app(state);

    run_server(app, addr, engine).await
}
