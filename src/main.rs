//! Web Gateway Cache - event-driven invalidation daemon
//!
//! Reads server change events as JSON lines on stdin and invalidates the
//! matching cache entries.

use std::env;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webgateway_cache::config::Backend;
use webgateway_cache::{
    spawn_cleanup_task, spawn_event_listener, Config, MemoryStore, PartitionedCache,
};

/// Startup sequence:
/// 1. Initialize tracing
/// 2. Load configuration from environment variables
/// 3. Build the cache store (and the bucket sweeper for the memory backend)
/// 4. Apply events from stdin until end of input or SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webgateway_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting web gateway cache listener");

    let config = Config::from_env();
    let partition = env::var("CACHE_PARTITION").unwrap_or_else(|_| "default".to_string());
    info!(
        "Configuration loaded: backend={:?}, redis={}, partition={}, timeouts={:?}",
        config.backend,
        config.redis_url(),
        partition,
        config.timeouts
    );

    let mut memory = None;
    let mut cleanup_handle = None;
    let cache = if config.backend == Backend::Memory {
        let store = MemoryStore::new(config.max_entries_per_bucket);
        cleanup_handle = Some(spawn_cleanup_task(store.table(), config.cleanup_interval));
        memory = Some(store.clone());
        PartitionedCache::new(Arc::new(store), config.timeouts)
    } else {
        PartitionedCache::from_config(&config).await
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let listener = spawn_event_listener(cache, partition, stdin);

    shutdown_signal(listener).await;

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }
    if let Some(store) = memory {
        let stats = store.stats().await;
        info!("Final cache statistics: {}", serde_json::to_string(&stats)?);
    }

    info!("Listener shutdown complete");
    Ok(())
}

/// Waits for the event stream to end, Ctrl+C, or SIGTERM.
async fn shutdown_signal(mut listener: JoinHandle<u64>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = &mut listener => {
            match result {
                Ok(applied) => info!("Event stream ended, {} events applied", applied),
                Err(e) => warn!("Event listener failed: {}", e),
            }
            return;
        }
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    listener.abort();
    warn!("Event listener aborted");
}
