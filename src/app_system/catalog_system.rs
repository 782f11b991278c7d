use tracing::{error, info};

use crate::config::StoreSettings;
use crate::domain::CatalogSeed;
use crate::product_service::{ProductService, ReferencePolicy};
use crate::store::{CatalogStore, SqliteStore, StoreActor, StoreClient, StoreError};

/// The running catalog: the product service plus any store tasks behind it.
///
/// Responsible for starting the store, wiring the service to it, and handling shutdown.
pub struct CatalogSystem<S> {
    pub service: ProductService<S>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl CatalogSystem<StoreClient> {
    /// Starts an in-memory store actor.
    pub fn in_memory(buffer_size: usize) -> Self {
        let (actor, client) = StoreActor::new(buffer_size);
        let handle = tokio::spawn(actor.run());

        Self {
            service: ProductService::new(client),
            handles: vec![handle],
        }
    }
}

impl CatalogSystem<SqliteStore> {
    pub async fn sqlite(settings: &StoreSettings) -> Result<Self, StoreError> {
        let store = SqliteStore::connect(&settings.database_url, settings.max_connections).await?;
        Ok(Self {
            service: ProductService::new(store),
            handles: Vec::new(),
        })
    }
}

impl<S: CatalogStore> CatalogSystem<S> {
    pub fn with_reference_policy(mut self, references: ReferencePolicy) -> Self {
        self.service = self.service.with_reference_policy(references);
        self
    }

    pub async fn seed_demo_data(&self) -> Result<(), StoreError> {
        info!("Loading Northwind sample data");
        self.service.store().seed(CatalogSeed::northwind_sample()).await
    }

    /// Drops this handle on the store and waits for store tasks to finish.
    ///
    /// Store actors stop once every client is gone, so any router holding a
    /// clone of the service must be dropped first.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        info!(tasks = self.handles.len(), "Stopping catalog store");
        drop(self.service);

        for handle in self.handles {
            handle.await.inspect_err(|e| error!(error = %e, "Store task failed"))?;
        }

        info!("Catalog store stopped");
        Ok(())
    }
}
