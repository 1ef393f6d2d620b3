//! LRU Cache Service - a bounded in-memory key/value cache
//!
//! Serves the cache over HTTP until Ctrl+C or SIGTERM.

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use lru_cache_service::{create_router, logging, AppState, Config};

/// Main entry point for the cache service.
///
/// # Startup Sequence
/// 1. Load `.env`, flags and environment variables
/// 2. Initialize tracing subscriber for logging
/// 3. Create the cache with the configured capacity and default TTL
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on the configured address
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, dotenv_loaded) = Config::load();
    logging::init(config.log_level);

    info!("Starting LRU Cache Service");
    if dotenv_loaded {
        info!("Loaded environment variables from .env file");
    } else {
        info!("No .env file found, using system environment variables");
    }
    info!(
        "Configuration loaded: cache_size={}, default_cache_ttl={:?}, server_host_port={}, log_level={}",
        config.cache_size, config.default_cache_ttl, config.server_host_port, config.log_level
    );

    let shutdown = CancellationToken::new();
    let state = AppState::from_config(&config, shutdown.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server_host_port)
        .await
        .with_context(|| format!("failed to bind {}", config.server_host_port))?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// Cancels `shutdown` so that in-flight cache operations stop early.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    shutdown.cancel();
    info!("Shutdown token cancelled");
}
