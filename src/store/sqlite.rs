use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info, instrument};

use super::{CatalogStore, StoreError};
use crate::domain::{
    CatalogEntry, CatalogSeed, Category, OrderDetail, Product, ProductInsert, ProductRecord, Supplier,
};

const SCHEMA: [&str; 4] = [
    r"
    CREATE TABLE IF NOT EXISTS categories (
        category_id INTEGER PRIMARY KEY,
        category_name TEXT NOT NULL DEFAULT ''
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS suppliers (
        supplier_id INTEGER PRIMARY KEY,
        company_name TEXT NOT NULL DEFAULT ''
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS products (
        product_id INTEGER PRIMARY KEY AUTOINCREMENT,
        product_name TEXT NOT NULL,
        supplier_id INTEGER NOT NULL REFERENCES suppliers (supplier_id),
        category_id INTEGER NOT NULL REFERENCES categories (category_id),
        quantity_per_unit TEXT,
        unit_price REAL,
        units_in_stock INTEGER,
        units_on_order INTEGER,
        reorder_level INTEGER,
        discontinued INTEGER NOT NULL DEFAULT 0
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS order_details (
        order_id INTEGER NOT NULL,
        product_id INTEGER NOT NULL REFERENCES products (product_id),
        unit_price REAL NOT NULL,
        quantity INTEGER NOT NULL,
        discount REAL NOT NULL DEFAULT 0,
        PRIMARY KEY (order_id, product_id)
    )
    ",
];

const PRODUCT_COLUMNS: &str = "p.product_id, p.product_name, p.supplier_id, p.category_id, \
    p.quantity_per_unit, p.unit_price, p.units_in_stock, p.units_on_order, p.reorder_level, \
    p.discontinued";

/// Catalog tables in a SQLite database, reached through a sqlx pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database and makes sure the schema exists.
    ///
    /// In-memory databases are private to a connection, so they always get a
    /// pool of one that is never recycled.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let in_memory = database_url.contains(":memory:");
        let max_connections = if in_memory { 1 } else { max_connections };

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if in_memory {
            // The database lives only as long as its connection.
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.migrate().await?;

        info!(database_url, max_connections, "SQLite store ready");
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        supplier_id: row.try_get("supplier_id")?,
        category_id: row.try_get("category_id")?,
        quantity_per_unit: row.try_get("quantity_per_unit")?,
        unit_price: row.try_get("unit_price")?,
        units_in_stock: row.try_get("units_in_stock")?,
        units_on_order: row.try_get("units_on_order")?,
        reorder_level: row.try_get("reorder_level")?,
        discontinued: row.try_get("discontinued")?,
    })
}

fn entry_from_row(row: &SqliteRow) -> Result<CatalogEntry, sqlx::Error> {
    let product = product_from_row(row)?;
    let category = Category::new(product.category_id, row.try_get::<String, _>("category_name")?);
    let supplier = Supplier::new(product.supplier_id, row.try_get::<String, _>("company_name")?);
    Ok(CatalogEntry { product, category, supplier })
}

fn order_detail_from_row(row: &SqliteRow) -> Result<OrderDetail, sqlx::Error> {
    Ok(OrderDetail {
        order_id: row.try_get("order_id")?,
        product_id: row.try_get("product_id")?,
        unit_price: row.try_get("unit_price")?,
        quantity: row.try_get("quantity")?,
        discount: row.try_get("discount")?,
    })
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn list_products(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS}, c.category_name, s.company_name
             FROM products p
             JOIN categories c ON c.category_id = p.category_id
             JOIN suppliers s ON s.supplier_id = p.supplier_id
             ORDER BY p.product_id"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let entries = rows
            .iter()
            .map(entry_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn load_product(&self, id: i32) -> Result<Option<ProductRecord>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS}, c.category_name, s.company_name
             FROM products p
             JOIN categories c ON c.category_id = p.category_id
             JOIN suppliers s ON s.supplier_id = p.supplier_id
             WHERE p.product_id = ?"
        );
        let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await? else {
            return Ok(None);
        };
        let entry = entry_from_row(&row)?;
        let orderdetails = self.order_details_for(id).await?;

        Ok(Some(ProductRecord {
            product: entry.product,
            category: entry.category,
            supplier: entry.supplier,
            orderdetails,
        }))
    }

    async fn find_product(&self, id: i32) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.product_id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    async fn find_category(&self, id: i32) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query("SELECT category_id, category_name FROM categories WHERE category_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let category = row
            .map(|row| -> Result<Category, sqlx::Error> {
                Ok(Category::new(row.try_get("category_id")?, row.try_get::<String, _>("category_name")?))
            })
            .transpose()?;
        Ok(category)
    }

    async fn find_supplier(&self, id: i32) -> Result<Option<Supplier>, StoreError> {
        let row = sqlx::query("SELECT supplier_id, company_name FROM suppliers WHERE supplier_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let supplier = row
            .map(|row| -> Result<Supplier, sqlx::Error> {
                Ok(Supplier::new(row.try_get("supplier_id")?, row.try_get::<String, _>("company_name")?))
            })
            .transpose()?;
        Ok(supplier)
    }

    #[instrument(skip(self, insert), fields(product_name = %insert.product.product_name))]
    async fn insert_product(&self, insert: ProductInsert) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(category) = &insert.placeholder_category {
            sqlx::query("INSERT OR IGNORE INTO categories (category_id, category_name) VALUES (?, ?)")
                .bind(category.category_id)
                .bind(&category.category_name)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(supplier) = &insert.placeholder_supplier {
            sqlx::query("INSERT OR IGNORE INTO suppliers (supplier_id, company_name) VALUES (?, ?)")
                .bind(supplier.supplier_id)
                .bind(&supplier.company_name)
                .execute(&mut *tx)
                .await?;
        }

        let new = insert.product;
        let rowid = sqlx::query(
            "INSERT INTO products (product_name, category_id, supplier_id) VALUES (?, ?, ?)",
        )
        .bind(&new.product_name)
        .bind(new.category_id)
        .bind(new.supplier_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        let id = i32::try_from(rowid).map_err(|_| StoreError::IdOverflow(rowid))?;

        tx.commit().await?;
        debug!(product_id = id, "Product inserted");
        Ok(Product::new(id, new.product_name, new.category_id, new.supplier_id))
    }

    #[instrument(skip(self, product), fields(product_id = product.product_id))]
    async fn save_product(&self, product: Product) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE products SET product_name = ?, supplier_id = ?, category_id = ?,
                 quantity_per_unit = ?, unit_price = ?, units_in_stock = ?, units_on_order = ?,
                 reorder_level = ?, discontinued = ?
             WHERE product_id = ?",
        )
        .bind(&product.product_name)
        .bind(product.supplier_id)
        .bind(product.category_id)
        .bind(&product.quantity_per_unit)
        .bind(product.unit_price)
        .bind(product.units_in_stock)
        .bind(product.units_on_order)
        .bind(product.reorder_level)
        .bind(product.discontinued)
        .bind(product.product_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict { entity: "product", id: product.product_id });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: i32) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM order_details WHERE product_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM products WHERE product_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Err(StoreError::Conflict { entity: "product", id });
        }
        tx.commit().await?;
        debug!(product_id = id, order_details = removed, "Product deleted");
        Ok(removed)
    }

    async fn product_exists(&self, id: i32) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM products WHERE product_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn order_details_for(&self, product_id: i32) -> Result<Vec<OrderDetail>, StoreError> {
        let rows = sqlx::query(
            "SELECT order_id, product_id, unit_price, quantity, discount
             FROM order_details WHERE product_id = ? ORDER BY order_id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        let details = rows
            .iter()
            .map(order_detail_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(details)
    }

    #[instrument(skip_all)]
    async fn seed(&self, seed: CatalogSeed) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for category in &seed.categories {
            sqlx::query("INSERT OR REPLACE INTO categories (category_id, category_name) VALUES (?, ?)")
                .bind(category.category_id)
                .bind(&category.category_name)
                .execute(&mut *tx)
                .await?;
        }
        for supplier in &seed.suppliers {
            sqlx::query("INSERT OR REPLACE INTO suppliers (supplier_id, company_name) VALUES (?, ?)")
                .bind(supplier.supplier_id)
                .bind(&supplier.company_name)
                .execute(&mut *tx)
                .await?;
        }
        for p in &seed.products {
            sqlx::query(
                "INSERT OR REPLACE INTO products (product_id, product_name, supplier_id, category_id,
                     quantity_per_unit, unit_price, units_in_stock, units_on_order, reorder_level,
                     discontinued)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(p.product_id)
            .bind(&p.product_name)
            .bind(p.supplier_id)
            .bind(p.category_id)
            .bind(&p.quantity_per_unit)
            .bind(p.unit_price)
            .bind(p.units_in_stock)
            .bind(p.units_on_order)
            .bind(p.reorder_level)
            .bind(p.discontinued)
            .execute(&mut *tx)
            .await?;
        }
        for d in &seed.order_details {
            sqlx::query(
                "INSERT OR REPLACE INTO order_details (order_id, product_id, unit_price, quantity, discount)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(d.order_id)
            .bind(d.product_id)
            .bind(d.unit_price)
            .bind(d.quantity)
            .bind(d.discount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(products = seed.products.len(), "Seeded catalog");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewProduct;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:", 4).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_with_placeholders_links_new_rows() {
        let store = memory_store().await;

        let insert = ProductInsert {
            product: NewProduct {
                product_name: "Chai".to_string(),
                category_id: 7,
                supplier_id: 3,
            },
            placeholder_category: Some(Category::placeholder(7)),
            placeholder_supplier: Some(Supplier::placeholder(3)),
        };
        let product = store.insert_product(insert).await.unwrap();
        assert_eq!(product.product_id, 1);

        let category = store.find_category(7).await.unwrap().unwrap();
        assert_eq!(category, Category::new(7, ""));

        let record = store.load_product(product.product_id).await.unwrap().unwrap();
        assert_eq!(record.product.product_name, "Chai");
        assert_eq!(record.supplier.supplier_id, 3);
        assert!(record.orderdetails.is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_reference_violates_foreign_key() {
        let store = memory_store().await;

        let insert = ProductInsert {
            product: NewProduct {
                product_name: "Dangling".to_string(),
                category_id: 1,
                supplier_id: 1,
            },
            placeholder_category: None,
            placeholder_supplier: None,
        };
        let result = store.insert_product(insert).await;
        assert!(matches!(result, Err(StoreError::Database(_))));
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_with_dangling_reference_writes_nothing() {
        let store = memory_store().await;
        let mut seed = CatalogSeed::northwind_sample();
        seed.products.push(Product::new(50, "Orphan", 99, 1));

        let result = store.seed(seed).await;
        assert!(matches!(result, Err(StoreError::Database(_))));
        assert!(!store.product_exists(50).await.unwrap());
        assert!(store.list_products().await.unwrap().is_empty());
        assert!(store.find_category(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seeded_rows_round_trip_through_queries() {
        let store = memory_store().await;
        store.seed(CatalogSeed::northwind_sample()).await.unwrap();

        let listed = store.list_products().await.unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].category.category_name, "Beverages");
        assert_eq!(listed[3].supplier.company_name, "New Orleans Cajun Delights");

        let chai = store.find_product(1).await.unwrap().unwrap();
        assert_eq!(chai.unit_price, Some(18.0));
        assert_eq!(chai.units_in_stock, Some(39));
        assert!(!chai.discontinued);
    }

    #[tokio::test]
    async fn test_save_and_delete_report_conflict_for_missing_rows() {
        let store = memory_store().await;
        store.seed(CatalogSeed::northwind_sample()).await.unwrap();

        let mut chang = store.find_product(2).await.unwrap().unwrap();
        chang.discontinued = true;
        chang.unit_price = None;
        store.save_product(chang).await.unwrap();
        let stored = store.find_product(2).await.unwrap().unwrap();
        assert!(stored.discontinued);
        assert_eq!(stored.unit_price, None);

        let ghost = Product::new(99, "Ghost", 1, 1);
        assert!(matches!(
            store.save_product(ghost).await,
            Err(StoreError::Conflict { id: 99, .. })
        ));
        assert!(matches!(
            store.delete_product(99).await,
            Err(StoreError::Conflict { id: 99, .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_order_details_first() {
        let store = memory_store().await;
        store.seed(CatalogSeed::northwind_sample()).await.unwrap();

        assert_eq!(store.delete_product(1).await.unwrap(), 2);
        assert!(!store.product_exists(1).await.unwrap());
        assert!(store.order_details_for(1).await.unwrap().is_empty());
        assert_eq!(store.order_details_for(4).await.unwrap().len(), 1);
    }
}
