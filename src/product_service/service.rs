use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::dtos::{ProductDto, UpdateProductDto};
use super::error::ProductError;
use crate::domain::{Category, NewProduct, ProductInsert, ProductRecord, Supplier};
use crate::store::{CatalogStore, StoreError};

/// What Create does with a category or supplier id that does not resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Write a row holding only the referenced id.
    #[default]
    Placeholder,
    /// Refuse the request.
    Reject,
}

/// The five product operations over a [`CatalogStore`].
pub struct ProductService<S> {
    store: Arc<S>,
    references: ReferencePolicy,
}

impl<S> Clone for ProductService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            references: self.references,
        }
    }
}

impl<S: CatalogStore> ProductService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            references: ReferencePolicy::default(),
        }
    }

    pub fn with_reference_policy(mut self, references: ReferencePolicy) -> Self {
        self.references = references;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductDto>, ProductError> {
        let entries = self.store.list_products().await?;
        debug!(count = entries.len(), "Listed products");
        Ok(entries.into_iter().map(ProductDto::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> Result<ProductRecord, ProductError> {
        self.store
            .load_product(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Creates a product from the payload's name and its two references.
    ///
    /// # Notes
    /// Only `product_name` is taken from the payload. Pricing, stock and
    /// packaging fields are accepted but not stored.
    #[instrument(skip(self, dto), fields(product_name = %dto.product_name))]
    pub async fn create_product(&self, dto: ProductDto) -> Result<ProductDto, ProductError> {
        let category_id = dto.category.category_id;
        let supplier_id = dto.supplier.supplier_id;

        let (category, placeholder_category) = match self.store.find_category(category_id).await? {
            Some(category) => (category, None),
            None => {
                let category = self.placeholder("category", category_id, Category::placeholder)?;
                (category.clone(), Some(category))
            }
        };
        let (supplier, placeholder_supplier) = match self.store.find_supplier(supplier_id).await? {
            Some(supplier) => (supplier, None),
            None => {
                let supplier = self.placeholder("supplier", supplier_id, Supplier::placeholder)?;
                (supplier.clone(), Some(supplier))
            }
        };

        let insert = ProductInsert {
            product: NewProduct {
                product_name: dto.product_name,
                category_id,
                supplier_id,
            },
            placeholder_category,
            placeholder_supplier,
        };
        let product = self.store.insert_product(insert).await?;

        info!(product_id = product.product_id, "Product created");
        Ok(ProductDto::from_parts(product, &category, &supplier))
    }

    #[instrument(skip(self, dto))]
    pub async fn update_product(
        &self,
        id: i32,
        dto: UpdateProductDto,
    ) -> Result<UpdateProductDto, ProductError> {
        if id != dto.product_id {
            warn!(body_id = dto.product_id, "Product id mismatch");
            return Err(ProductError::IdMismatch { path: id, body: dto.product_id });
        }

        let mut product = self
            .store
            .find_product(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;
        dto.apply_to(&mut product);

        match self.store.save_product(product).await {
            Ok(()) => {
                info!("Product updated");
                Ok(dto)
            }
            Err(StoreError::Conflict { .. }) => Err(self.recheck_conflict(id).await),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> Result<(), ProductError> {
        if self.store.find_product(id).await?.is_none() {
            return Err(ProductError::NotFound(id));
        }

        match self.store.delete_product(id).await {
            Ok(order_details) => {
                info!(order_details, "Product deleted");
                Ok(())
            }
            Err(StoreError::Conflict { .. }) => Err(self.recheck_conflict(id).await),
            Err(e) => Err(e.into()),
        }
    }

    fn placeholder<T>(
        &self,
        entity: &'static str,
        id: i32,
        build: impl FnOnce(i32) -> T,
    ) -> Result<T, ProductError> {
        match self.references {
            ReferencePolicy::Placeholder => {
                debug!(entity, id, "Creating placeholder row");
                Ok(build(id))
            }
            ReferencePolicy::Reject => Err(ProductError::UnresolvedReference { entity, id }),
        }
    }

    /// A stale write is only a miss if the row is gone. Otherwise it is fatal.
    async fn recheck_conflict(&self, id: i32) -> ProductError {
        match self.store.product_exists(id).await {
            Ok(false) => ProductError::NotFound(id),
            Ok(true) => {
                error!(product_id = id, "Concurrency conflict on an existing product");
                ProductError::Conflict(id)
            }
            Err(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CatalogSeed, Product};
    use crate::mock_framework::{create_mock_store, expect_find_product, expect_product_exists, expect_save_product, expect_delete_product};
    use crate::product_service::{CategoryDto, SupplierDto};
    use crate::store::StoreActor;

    async fn seeded_service() -> ProductService<crate::store::StoreClient> {
        let (actor, client) = StoreActor::new(10);
        tokio::spawn(actor.run());
        client.seed(CatalogSeed::northwind_sample()).await.unwrap();
        ProductService::new(client)
    }

    fn create_payload(name: &str, category_id: i32, supplier_id: i32) -> ProductDto {
        ProductDto {
            product_id: 0,
            product_name: name.to_string(),
            quantity_per_unit: Some("1 box".to_string()),
            unit_price: Some(99.0),
            units_in_stock: Some(7),
            units_on_order: None,
            reorder_level: None,
            discontinued: false,
            category: CategoryDto { category_id, category_name: String::new() },
            supplier: SupplierDto { supplier_id, company_name: String::new() },
        }
    }

    fn update_payload(id: i32, name: &str) -> UpdateProductDto {
        UpdateProductDto {
            product_id: id,
            product_name: name.to_string(),
            quantity_per_unit: None,
            unit_price: Some(20.0),
            units_in_stock: Some(1),
            units_on_order: Some(0),
            reorder_level: Some(0),
            discontinued: false,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_keeps_name_and_references() {
        let service = seeded_service().await;

        let created = service.create_product(create_payload("Ikura", 2, 1)).await.unwrap();
        assert_eq!(created.category.category_name, "Condiments");
        assert_eq!(created.supplier.company_name, "Exotic Liquids");

        let record = service.get_product(created.product_id).await.unwrap();
        assert_eq!(record.product.product_name, "Ikura");
        assert_eq!(record.category.category_id, 2);
        assert_eq!(record.supplier.supplier_id, 1);
    }

    #[tokio::test]
    async fn test_create_copies_only_the_name() {
        let service = seeded_service().await;

        let created = service.create_product(create_payload("Ikura", 1, 1)).await.unwrap();
        assert_eq!(created.unit_price, None);
        assert_eq!(created.units_in_stock, None);
        assert_eq!(created.quantity_per_unit, None);

        let record = service.get_product(created.product_id).await.unwrap();
        assert_eq!(record.product.unit_price, None);
    }

    #[tokio::test]
    async fn test_create_with_unknown_category_writes_placeholder() {
        let service = seeded_service().await;

        let created = service.create_product(create_payload("Ikura", 7, 1)).await.unwrap();
        assert_eq!(created.category, CategoryDto { category_id: 7, category_name: String::new() });

        let category = service.store().find_category(7).await.unwrap().unwrap();
        assert_eq!(category, Category::new(7, ""));
        let record = service.get_product(created.product_id).await.unwrap();
        assert_eq!(record.category.category_id, 7);
    }

    #[tokio::test]
    async fn test_reject_policy_refuses_unknown_supplier() {
        let service = seeded_service().await.with_reference_policy(ReferencePolicy::Reject);

        let result = service.create_product(create_payload("Ikura", 1, 42)).await;
        assert!(matches!(
            result,
            Err(ProductError::UnresolvedReference { entity: "supplier", id: 42 })
        ));
        assert!(service.store().find_supplier(42).await.unwrap().is_none());
        assert_eq!(service.list_products().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_update_with_mismatched_id_changes_nothing() {
        let service = seeded_service().await;

        let result = service.update_product(1, update_payload(2, "Renamed")).await;
        assert!(matches!(result, Err(ProductError::IdMismatch { path: 1, body: 2 })));

        let chai = service.get_product(1).await.unwrap();
        assert_eq!(chai.product.product_name, "Chai");
        let chang = service.get_product(2).await.unwrap();
        assert_eq!(chang.product.product_name, "Chang");
    }

    #[tokio::test]
    async fn test_update_overwrites_and_echoes_payload() {
        let service = seeded_service().await;

        let payload = update_payload(1, "Chai Latte");
        let echoed = service.update_product(1, payload.clone()).await.unwrap();
        assert_eq!(echoed, payload);

        let record = service.get_product(1).await.unwrap();
        assert_eq!(record.product.product_name, "Chai Latte");
        assert_eq!(record.product.quantity_per_unit, None);
        assert_eq!(record.product.unit_price, Some(20.0));
        assert_eq!(record.category.category_id, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_of_missing_product_are_not_found() {
        let service = seeded_service().await;

        let update = service.update_product(999, update_payload(999, "Nothing")).await;
        assert!(matches!(update, Err(ProductError::NotFound(999))));
        let delete = service.delete_product(999).await;
        assert!(matches!(delete, Err(ProductError::NotFound(999))));
        assert_eq!(service.list_products().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_delete_cascades_and_then_get_is_not_found() {
        let service = seeded_service().await;

        service.delete_product(1).await.unwrap();

        assert!(matches!(service.get_product(1).await, Err(ProductError::NotFound(1))));
        assert!(service.store().order_details_for(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_conflict_on_vanished_row_is_not_found() {
        let (client, mut receiver) = create_mock_store(10);
        let service = ProductService::new(client);

        let task = tokio::spawn(async move { service.update_product(5, update_payload(5, "Tofu")).await });

        let (id, responder) = expect_find_product(&mut receiver).await.expect("Expected FindProduct");
        assert_eq!(id, 5);
        responder.send(Ok(Some(Product::new(5, "Tofu", 1, 1)))).unwrap();

        let (product, responder) = expect_save_product(&mut receiver).await.expect("Expected SaveProduct");
        assert_eq!(product.unit_price, Some(20.0));
        responder.send(Err(StoreError::Conflict { entity: "product", id: 5 })).unwrap();

        let (id, responder) = expect_product_exists(&mut receiver).await.expect("Expected ProductExists");
        assert_eq!(id, 5);
        responder.send(Ok(false)).unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(ProductError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_update_conflict_on_live_row_is_fatal() {
        let (client, mut receiver) = create_mock_store(10);
        let service = ProductService::new(client);

        let task = tokio::spawn(async move { service.update_product(5, update_payload(5, "Tofu")).await });

        let (_, responder) = expect_find_product(&mut receiver).await.expect("Expected FindProduct");
        responder.send(Ok(Some(Product::new(5, "Tofu", 1, 1)))).unwrap();
        let (_, responder) = expect_save_product(&mut receiver).await.expect("Expected SaveProduct");
        responder.send(Err(StoreError::Conflict { entity: "product", id: 5 })).unwrap();
        let (_, responder) = expect_product_exists(&mut receiver).await.expect("Expected ProductExists");
        responder.send(Ok(true)).unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(ProductError::Conflict(5))));
    }

    #[tokio::test]
    async fn test_delete_conflict_rechecks_once() {
        let (client, mut receiver) = create_mock_store(10);
        let service = ProductService::new(client);

        let task = tokio::spawn(async move { service.delete_product(8).await });

        let (_, responder) = expect_find_product(&mut receiver).await.expect("Expected FindProduct");
        responder.send(Ok(Some(Product::new(8, "Konbu", 1, 1)))).unwrap();
        let (id, responder) = expect_delete_product(&mut receiver).await.expect("Expected DeleteProduct");
        assert_eq!(id, 8);
        responder.send(Err(StoreError::Conflict { entity: "product", id: 8 })).unwrap();
        let (_, responder) = expect_product_exists(&mut receiver).await.expect("Expected ProductExists");
        responder.send(Ok(false)).unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(ProductError::NotFound(8))));
        assert!(receiver.try_recv().is_err());
    }
}
