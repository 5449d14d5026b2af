use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::domain::error::Result;
use crate::infrastructure::bootstrap::build_state;
use crate::infrastructure::config::AppConfig;
use crate::interfaces::http::start_server;

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Loads configuration, wires services and serves the HTTP API until shutdown.
pub async fn run() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.log_level);

    info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        demo_mode = config.auth.demo_mode,
        "Starting dogtor"
    );

    let state = build_state(&config).await.map_err(|err| {
        error!(error = %err, "Failed to initialize services");
        err
    })?;

    start_server(state, &config)?.await?;
    info!("Server stopped");
    Ok(())
}
