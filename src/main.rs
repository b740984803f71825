//! avatar-gate
//!
//! Serves signed avatar links and the project catalog over HTTP.
//!
//! Usage: `avatar-gate [CONFIG_FILE]`

use std::path::PathBuf;

use anyhow::Context;
use avatar_gate::logging::{init_fallback_logging, LogLevel, LoggingSystem};
use avatar_gate::{AvatarGateServer, GateConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_file = std::env::args_os().nth(1).map(PathBuf::from);
    let config = GateConfig::load(config_file.as_deref()).context("invalid configuration")?;

    // Keep the logging system alive so the file writer flushes on exit
    let logging_system = match LoggingSystem::init(config.logging.clone()) {
        Ok(system) => Some(system),
        Err(e) => {
            eprintln!("Failed to initialize logging system: {}. Using basic logging.", e);
            init_fallback_logging(LogLevel::Info).ok()
        }
    };

    tracing::info!(
        mode = %config.mode,
        bind_addr = %config.bind_addr,
        token_ttl_secs = config.token_ttl_secs,
        source = %config.source_path.display(),
        catalog = %config.catalog_path.display(),
        max_concurrent_transforms = config.max_concurrent_transforms,
        secret_len = config.secret_len(),
        "Starting avatar-gate"
    );

    if let Some(dir) = logging_system.as_ref().and_then(LoggingSystem::log_directory) {
        tracing::info!(dir = %dir.display(), "Writing log files");
    }

    if config.using_placeholder_secret {
        tracing::warn!(
            "AVATAR_TOKEN_SECRET is not set; signing with the development placeholder. \
             Links are forgeable. Never run this in production."
        );
    }

    let server = AvatarGateServer::new(&config).context("failed to prepare avatar gate")?;

    server
        .start_with_shutdown(shutdown_signal())
        .await
        .context("avatar gate server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
