//! Mini Groupcache - demo node
//!
//! Serves a "scores" group backed by a slow in-memory table, and reports
//! key ownership on the consistent-hash ring built from `PEERS`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_groupcache::api::{create_router, AppState};
use mini_groupcache::{Config, Getter, GroupRegistry, KeyNotFound};

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the demo group
/// 4. Build the hash ring from the configured peers
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_groupcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini Groupcache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: node={}, cache_bytes={}, replicas={}, peers={}, port={}, source={}",
        config.node_name,
        config.cache_bytes,
        config.ring_replicas,
        config.peers,
        config.server_port,
        config.data_source
    );

    let registry = Arc::new(GroupRegistry::new());
    register_groups(&registry, &config)?;

    let state = AppState::from_config(registry, &config);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Node listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Node shutdown complete");
    Ok(())
}

/// Registers the demo "scores" group over the configured data source.
fn register_groups(registry: &GroupRegistry, config: &Config) -> anyhow::Result<()> {
    registry
        .try_new_group("scores", config.cache_bytes, select_loader(&config.data_source))
        .with_context(|| format!("unknown data source '{}'", config.data_source))?;
    Ok(())
}

/// Maps a `DATA_SOURCE` name to its loader.
fn select_loader(source: &str) -> Option<Arc<dyn Getter>> {
    match source {
        "memory" => Some(Arc::new(score_table())),
        _ => None,
    }
}

/// Slow in-memory score table.
fn score_table() -> impl Getter {
    let db: HashMap<&'static str, &'static str> =
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);
    move |key: &str| -> anyhow::Result<Vec<u8>> {
        info!("[SlowDB] search key {}", key);
        db.get(key)
            .map(|v| v.as_bytes().to_vec())
            .ok_or_else(|| KeyNotFound(key.to_string()).into())
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
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
                tracing::error!("Failed to install SIGTERM handler: {}", err);
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
