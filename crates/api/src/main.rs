use anyhow::{Context, Result};
use domain::store::{DocumentStore, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use hotspot_api::app;
use hotspot_api::config::{Config, StoreBackend};
use hotspot_api::jobs::{JobScheduler, StorePoolJob};
use hotspot_api::middleware;
use persistence::PgDocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting Hotspot API v{}", env!("CARGO_PKG_VERSION"));

    let mut scheduler = JobScheduler::new();
    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Postgres => {
            let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            scheduler.register(StorePoolJob::new(pool.clone()));
            Arc::new(PgDocumentStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    scheduler.start();

    let addr = config.socket_addr().context("Invalid server address")?;
    let app = app::create_app(config, store)?;

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown(Duration::from_secs(5)).await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down gracefully..."),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}
