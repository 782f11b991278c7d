use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use northwind_catalog::app_system::{setup_tracing, CatalogSystem};
use northwind_catalog::config::{CatalogConfig, StoreBackend};
use northwind_catalog::http::{self, AppState};
use northwind_catalog::store::CatalogStore;

#[derive(Debug, Parser)]
#[command(name = "catalog_server", about = "Serve the Northwind product catalog.")]
struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = CatalogConfig::load(args.config.as_deref()).context("load configuration")?;

    setup_tracing(&config.log.filter);
    info!(backend = ?config.store.backend, "Starting catalog server");

    match config.store.backend {
        StoreBackend::Memory => {
            let system = CatalogSystem::in_memory(config.store.actor_buffer);
            serve(system, &config).await
        }
        StoreBackend::Sqlite => {
            let system = CatalogSystem::sqlite(&config.store)
                .await
                .context("open SQLite store")?;
            serve(system, &config).await
        }
    }
}

async fn serve<S: CatalogStore>(system: CatalogSystem<S>, config: &CatalogConfig) -> anyhow::Result<()> {
    let system = system.with_reference_policy(config.catalog.reference_policy);
    if config.store.seed_demo_data {
        system.seed_demo_data().await.context("seed demo data")?;
    }

    let state = AppState::new(system.service.clone())
        .with_preserved_references(config.server.preserve_references);
    let app = http::router(state);

    let listener = TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("bind {}", config.server.listen_addr))?;
    info!(addr = %listener.local_addr()?, "Catalog API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP")?;

    system.shutdown().await.context("stop catalog store")?;
    info!("Catalog server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
