//! Push Gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p push-gateway
//! ```
//!
//! Configuration is loaded from environment variables (and `.env` if present).

use anyhow::Context;
use push_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Gateway failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        address = %config.server.address(),
        bus = ?config.bus.backend,
        "Configuration loaded"
    );

    push_gateway::run(config).await?;

    Ok(())
}
