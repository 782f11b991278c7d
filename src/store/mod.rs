//! Store access for the catalog tables.
//!
//! [`CatalogStore`] is the seam the product service is written against. Two
//! backends implement it: an in-memory [`actor`] that owns the tables inside a
//! single task, and a [`sqlite`] pool.

pub mod actor;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CatalogEntry, CatalogSeed, Category, OrderDetail, Product, ProductInsert, ProductRecord, Supplier};

pub use actor::{StoreActor, StoreClient, StoreRequest};
pub use sqlite::SqliteStore;

/// Errors raised by a catalog store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write targeted a row that changed or vanished since it was read.
    #[error("Concurrency conflict on {entity} {id}")]
    Conflict { entity: &'static str, id: i32 },
    #[error("Store database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Generated id {0} does not fit the id column")]
    IdOverflow(i64),
    /// A seeded row points at a row that is neither stored nor seeded.
    #[error("Seeded row references missing {entity} {id}")]
    DanglingReference { entity: &'static str, id: i32 },
    #[error("Store task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Reads and unit-of-work writes over the catalog tables.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Every product whose category and supplier both resolve, ordered by id.
    async fn list_products(&self) -> Result<Vec<CatalogEntry>, StoreError>;

    /// The product with its category, supplier and order details.
    async fn load_product(&self, id: i32) -> Result<Option<ProductRecord>, StoreError>;

    async fn find_product(&self, id: i32) -> Result<Option<Product>, StoreError>;
    async fn find_category(&self, id: i32) -> Result<Option<Category>, StoreError>;
    async fn find_supplier(&self, id: i32) -> Result<Option<Supplier>, StoreError>;

    /// Writes any placeholder rows and then the product, atomically.
    async fn insert_product(&self, insert: ProductInsert) -> Result<Product, StoreError>;

    /// Overwrites the stored row with `product`. `Conflict` when the row is gone.
    async fn save_product(&self, product: Product) -> Result<(), StoreError>;

    /// Removes the product's order details and then the product, atomically.
    /// Returns the number of order details removed. `Conflict` when the row is gone.
    async fn delete_product(&self, id: i32) -> Result<u64, StoreError>;

    async fn product_exists(&self, id: i32) -> Result<bool, StoreError>;
    async fn order_details_for(&self, product_id: i32) -> Result<Vec<OrderDetail>, StoreError>;

    /// Loads starting rows into the store. Either every row is written or none.
    async fn seed(&self, seed: CatalogSeed) -> Result<(), StoreError>;
}
