use serde::{Deserialize, Serialize};

use super::{Category, OrderDetail, Supplier};

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: i32,
    pub product_name: String,
    pub supplier_id: i32,
    pub category_id: i32,
    pub quantity_per_unit: Option<String>,
    pub unit_price: Option<f64>,
    pub units_in_stock: Option<i16>,
    pub units_on_order: Option<i16>,
    pub reorder_level: Option<i16>,
    pub discontinued: bool,
}

impl Product {
    /// Creates a product carrying only a name and its two references.
    ///
    /// # Notes
    /// Stock, pricing and packaging fields start out empty. The id is only
    /// meaningful once the store has assigned one.
    pub fn new(product_id: i32, product_name: impl Into<String>, category_id: i32, supplier_id: i32) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            supplier_id,
            category_id,
            quantity_per_unit: None,
            unit_price: None,
            units_in_stock: None,
            units_on_order: None,
            reorder_level: None,
            discontinued: false,
        }
    }
}

/// Payload for inserting a new product. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub product_name: String,
    pub category_id: i32,
    pub supplier_id: i32,
}

/// One unit of work for product creation.
///
/// Placeholder rows, when present, are written before the product so its
/// references resolve.
#[derive(Debug, Clone)]
pub struct ProductInsert {
    pub product: NewProduct,
    pub placeholder_category: Option<Category>,
    pub placeholder_supplier: Option<Supplier>,
}

/// A product joined with its category and supplier, as listed.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub product: Product,
    pub category: Category,
    pub supplier: Supplier,
}

/// The full product graph returned by a single-product lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
    pub supplier: Supplier,
    pub orderdetails: Vec<OrderDetail>,
}
