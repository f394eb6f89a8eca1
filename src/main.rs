//! Coupon Gate - rate-limited, cached coupon search server

use std::net::SocketAddr;

use anyhow::Context;
use tokio::{signal, task::JoinHandle};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coupon_gate::{create_router, spawn_sweep_task, AppState, Config};

/// Main entry point for the coupon gate server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build limiter, cache and coupon source
/// 4. Start the expiry sweep for in-memory stores
/// 5. Serve the router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info", overridable with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coupon_gate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coupon Gate");

    let config = Config::from_env();
    info!(
        "Configuration loaded: limit={} per {}s, cache_ttl={}s, max_entries={}, port={}",
        config.rate_limit_requests,
        config.rate_limit_window,
        config.cache_ttl,
        config.cache_max_entries,
        config.server_port
    );

    let state = AppState::from_config(&config)
        .await
        .context("failed to initialize gate state")?;

    let sweep_handle = if config.sweep_interval > 0 && !state.sweepers.is_empty() {
        Some(spawn_sweep_task(state.sweepers.clone(), config.sweep_interval))
    } else {
        info!("Expiry sweep disabled; entries expire lazily on read");
        None
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then stops the sweep task.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Expiry sweep task aborted");
    }
}
