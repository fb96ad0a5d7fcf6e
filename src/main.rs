//! Ad Delivery - cached ad placement with batched engagement tracking
//!
//! Serves placement queries over HTTP and relays impressions and clicks to
//! the configured ad store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ad_delivery::api::create_router;
use ad_delivery::{AdStore, AppState, Config, ImpressionBatcher, InMemoryAdStore, RestAdStore};

/// Main entry point for the ad delivery service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the ad store (hosted if configured, in-memory otherwise)
/// 4. Build the cache, resolver and trackers around it
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM, stop serving and flush pending impressions
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ad_delivery=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ad delivery service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_ttl={}s, impression_debounce={}ms, port={}",
        config.cache_ttl, config.impression_debounce_ms, config.server_port
    );

    let store: Arc<dyn AdStore> = match &config.store_url {
        Some(url) => {
            info!("Using hosted ad store at {}", url);
            Arc::new(RestAdStore::new(url.clone(), config.store_key.clone())?)
        }
        None => {
            warn!("AD_STORE_URL not set; using an empty in-memory ad store");
            Arc::new(InMemoryAdStore::new())
        }
    };

    let state = AppState::from_config(&config, store);
    let impressions = state.impressions.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    flush_pending(&impressions).await;
    info!("Server shutdown complete");
    Ok(())
}

/// Sends impressions still waiting for their debounce window.
async fn flush_pending(impressions: &ImpressionBatcher) {
    match impressions.flush_now().await {
        Ok(0) => {}
        Ok(count) => info!("Flushed {} pending impressions on shutdown", count),
        Err(err) => warn!("Pending impressions lost on shutdown: {}", err),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
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
}
