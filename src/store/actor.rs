use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument};

use super::{CatalogStore, StoreError};
use crate::domain::{
    CatalogEntry, CatalogSeed, Category, OrderDetail, Product, ProductInsert, ProductRecord, Supplier,
};

// =============================================================================
// 1. THE TABLES
// =============================================================================

/// In-memory rows for the four catalog tables.
///
/// Product ids are handed out from a high-water mark, so a deleted id is never
/// assigned again.
#[derive(Debug, Default)]
pub struct CatalogTables {
    categories: BTreeMap<i32, Category>,
    suppliers: BTreeMap<i32, Supplier>,
    products: BTreeMap<i32, Product>,
    order_details: Vec<OrderDetail>,
    last_product_id: i32,
}

impl CatalogTables {
    fn entry(&self, product: &Product) -> Option<CatalogEntry> {
        let category = self.categories.get(&product.category_id)?;
        let supplier = self.suppliers.get(&product.supplier_id)?;
        Some(CatalogEntry {
            product: product.clone(),
            category: category.clone(),
            supplier: supplier.clone(),
        })
    }

    fn list(&self) -> Vec<CatalogEntry> {
        self.products.values().filter_map(|p| self.entry(p)).collect()
    }

    fn record(&self, id: i32) -> Option<ProductRecord> {
        let entry = self.entry(self.products.get(&id)?)?;
        Some(ProductRecord {
            product: entry.product,
            category: entry.category,
            supplier: entry.supplier,
            orderdetails: self.details_for(id),
        })
    }

    fn details_for(&self, product_id: i32) -> Vec<OrderDetail> {
        self.order_details
            .iter()
            .filter(|d| d.product_id == product_id)
            .cloned()
            .collect()
    }

    fn insert(&mut self, insert: ProductInsert) -> Result<Product, StoreError> {
        let id = self
            .last_product_id
            .checked_add(1)
            .ok_or(StoreError::IdOverflow(i64::from(self.last_product_id) + 1))?;

        if let Some(category) = insert.placeholder_category {
            self.categories.entry(category.category_id).or_insert(category);
        }
        if let Some(supplier) = insert.placeholder_supplier {
            self.suppliers.entry(supplier.supplier_id).or_insert(supplier);
        }

        let product = Product::new(
            id,
            insert.product.product_name,
            insert.product.category_id,
            insert.product.supplier_id,
        );
        self.last_product_id = id;
        self.products.insert(id, product.clone());
        Ok(product)
    }

    fn save(&mut self, product: Product) -> Result<(), StoreError> {
        match self.products.get_mut(&product.product_id) {
            Some(stored) => {
                *stored = product;
                Ok(())
            }
            None => Err(StoreError::Conflict { entity: "product", id: product.product_id }),
        }
    }

    fn delete(&mut self, id: i32) -> Result<u64, StoreError> {
        if !self.products.contains_key(&id) {
            return Err(StoreError::Conflict { entity: "product", id });
        }
        let before = self.order_details.len();
        self.order_details.retain(|d| d.product_id != id);
        let removed = (before - self.order_details.len()) as u64;
        self.products.remove(&id);
        Ok(removed)
    }

    /// Applies the seed only if every reference in it resolves against the
    /// stored rows or the seed itself.
    fn seed(&mut self, seed: CatalogSeed) -> Result<(), StoreError> {
        let has_category = |id: i32| {
            self.categories.contains_key(&id) || seed.categories.iter().any(|c| c.category_id == id)
        };
        let has_supplier = |id: i32| {
            self.suppliers.contains_key(&id) || seed.suppliers.iter().any(|s| s.supplier_id == id)
        };
        let has_product = |id: i32| {
            self.products.contains_key(&id) || seed.products.iter().any(|p| p.product_id == id)
        };

        for product in &seed.products {
            if !has_category(product.category_id) {
                return Err(StoreError::DanglingReference { entity: "category", id: product.category_id });
            }
            if !has_supplier(product.supplier_id) {
                return Err(StoreError::DanglingReference { entity: "supplier", id: product.supplier_id });
            }
        }
        if let Some(detail) = seed.order_details.iter().find(|d| !has_product(d.product_id)) {
            return Err(StoreError::DanglingReference { entity: "product", id: detail.product_id });
        }

        for category in seed.categories {
            self.categories.insert(category.category_id, category);
        }
        for supplier in seed.suppliers {
            self.suppliers.insert(supplier.supplier_id, supplier);
        }
        for product in seed.products {
            self.last_product_id = self.last_product_id.max(product.product_id);
            self.products.insert(product.product_id, product);
        }
        self.order_details.extend(seed.order_details);
        Ok(())
    }
}

// =============================================================================
// 2. THE MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum StoreRequest {
    ListProducts {
        respond_to: Response<Vec<CatalogEntry>>,
    },
    LoadProduct {
        id: i32,
        respond_to: Response<Option<ProductRecord>>,
    },
    FindProduct {
        id: i32,
        respond_to: Response<Option<Product>>,
    },
    FindCategory {
        id: i32,
        respond_to: Response<Option<Category>>,
    },
    FindSupplier {
        id: i32,
        respond_to: Response<Option<Supplier>>,
    },
    InsertProduct {
        insert: ProductInsert,
        respond_to: Response<Product>,
    },
    SaveProduct {
        product: Product,
        respond_to: Response<()>,
    },
    DeleteProduct {
        id: i32,
        respond_to: Response<u64>,
    },
    ProductExists {
        id: i32,
        respond_to: Response<bool>,
    },
    OrderDetailsFor {
        product_id: i32,
        respond_to: Response<Vec<OrderDetail>>,
    },
    Seed {
        seed: CatalogSeed,
        respond_to: Response<()>,
    },
}

// =============================================================================
// 3. THE ACTOR
// =============================================================================

/// Owns the catalog tables and applies one request at a time.
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    tables: CatalogTables,
}

impl StoreActor {
    pub fn new(buffer_size: usize) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            tables: CatalogTables::default(),
        };
        (actor, StoreClient::new(sender))
    }

    /// Runs until every client handle has been dropped.
    #[instrument(name = "store_actor", skip(self))]
    pub async fn run(mut self) {
        info!("StoreActor starting");
        while let Some(msg) = self.receiver.recv().await {
            self.handle(msg);
        }
        info!("StoreActor stopped");
    }

    fn handle(&mut self, msg: StoreRequest) {
        match msg {
            StoreRequest::ListProducts { respond_to } => {
                let _ = respond_to.send(Ok(self.tables.list()));
            }
            StoreRequest::LoadProduct { id, respond_to } => {
                let _ = respond_to.send(Ok(self.tables.record(id)));
            }
            StoreRequest::FindProduct { id, respond_to } => {
                let _ = respond_to.send(Ok(self.tables.products.get(&id).cloned()));
            }
            StoreRequest::FindCategory { id, respond_to } => {
                let _ = respond_to.send(Ok(self.tables.categories.get(&id).cloned()));
            }
            StoreRequest::FindSupplier { id, respond_to } => {
                let _ = respond_to.send(Ok(self.tables.suppliers.get(&id).cloned()));
            }
            StoreRequest::InsertProduct { insert, respond_to } => {
                let result = self.tables.insert(insert);
                if let Ok(product) = &result {
                    debug!(product_id = product.product_id, "Product inserted");
                }
                let _ = respond_to.send(result);
            }
            StoreRequest::SaveProduct { product, respond_to } => {
                let _ = respond_to.send(self.tables.save(product));
            }
            StoreRequest::DeleteProduct { id, respond_to } => {
                let result = self.tables.delete(id);
                if let Ok(removed) = &result {
                    debug!(product_id = id, order_details = removed, "Product deleted");
                }
                let _ = respond_to.send(result);
            }
            StoreRequest::ProductExists { id, respond_to } => {
                let _ = respond_to.send(Ok(self.tables.products.contains_key(&id)));
            }
            StoreRequest::OrderDetailsFor { product_id, respond_to } => {
                let _ = respond_to.send(Ok(self.tables.details_for(product_id)));
            }
            StoreRequest::Seed { seed, respond_to } => {
                let _ = respond_to.send(self.tables.seed(seed));
            }
        }
    }
}

// =============================================================================
// 4. THE CLIENT
// =============================================================================

/// Cheap handle to a running [`StoreActor`].
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub(crate) fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::Unavailable("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| StoreError::Unavailable("Actor dropped".to_string()))?
    }
}

#[async_trait]
impl CatalogStore for StoreClient {
    async fn list_products(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        self.request(|respond_to| StoreRequest::ListProducts { respond_to }).await
    }

    async fn load_product(&self, id: i32) -> Result<Option<ProductRecord>, StoreError> {
        self.request(|respond_to| StoreRequest::LoadProduct { id, respond_to }).await
    }

    async fn find_product(&self, id: i32) -> Result<Option<Product>, StoreError> {
        self.request(|respond_to| StoreRequest::FindProduct { id, respond_to }).await
    }

    async fn find_category(&self, id: i32) -> Result<Option<Category>, StoreError> {
        self.request(|respond_to| StoreRequest::FindCategory { id, respond_to }).await
    }

    async fn find_supplier(&self, id: i32) -> Result<Option<Supplier>, StoreError> {
        self.request(|respond_to| StoreRequest::FindSupplier { id, respond_to }).await
    }

    async fn insert_product(&self, insert: ProductInsert) -> Result<Product, StoreError> {
        self.request(|respond_to| StoreRequest::InsertProduct { insert, respond_to }).await
    }

    async fn save_product(&self, product: Product) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::SaveProduct { product, respond_to }).await
    }

    async fn delete_product(&self, id: i32) -> Result<u64, StoreError> {
        self.request(|respond_to| StoreRequest::DeleteProduct { id, respond_to }).await
    }

    async fn product_exists(&self, id: i32) -> Result<bool, StoreError> {
        self.request(|respond_to| StoreRequest::ProductExists { id, respond_to }).await
    }

    async fn order_details_for(&self, product_id: i32) -> Result<Vec<OrderDetail>, StoreError> {
        self.request(|respond_to| StoreRequest::OrderDetailsFor { product_id, respond_to })
            .await
    }

    async fn seed(&self, seed: CatalogSeed) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Seed { seed, respond_to }).await
    }
}
