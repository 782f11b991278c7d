use serde::{Deserialize, Serialize};

use crate::domain::{CatalogEntry, Category, Product, Supplier};

// DTOs for the product endpoints

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub category_id: i32,
    #[serde(default)]
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDto {
    pub supplier_id: i32,
    #[serde(default)]
    pub company_name: String,
}

/// A product with its category and supplier summaries. Used for listing,
/// as the create payload and as the create response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(default)]
    pub product_id: i32,
    pub product_name: String,
    #[serde(default)]
    pub quantity_per_unit: Option<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub units_in_stock: Option<i16>,
    #[serde(default)]
    pub units_on_order: Option<i16>,
    #[serde(default)]
    pub reorder_level: Option<i16>,
    #[serde(default)]
    pub discontinued: bool,
    pub category: CategoryDto,
    pub supplier: SupplierDto,
}

/// Full replacement of a product's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductDto {
    pub product_id: i32,
    pub product_name: String,
    #[serde(default)]
    pub quantity_per_unit: Option<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub units_in_stock: Option<i16>,
    #[serde(default)]
    pub units_on_order: Option<i16>,
    #[serde(default)]
    pub reorder_level: Option<i16>,
    #[serde(default)]
    pub discontinued: bool,
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            category_id: category.category_id,
            category_name: category.category_name.clone(),
        }
    }
}

impl From<&Supplier> for SupplierDto {
    fn from(supplier: &Supplier) -> Self {
        Self {
            supplier_id: supplier.supplier_id,
            company_name: supplier.company_name.clone(),
        }
    }
}

impl ProductDto {
    pub fn from_parts(product: Product, category: &Category, supplier: &Supplier) -> Self {
        Self {
            product_id: product.product_id,
            product_name: product.product_name,
            quantity_per_unit: product.quantity_per_unit,
            unit_price: product.unit_price,
            units_in_stock: product.units_in_stock,
            units_on_order: product.units_on_order,
            reorder_level: product.reorder_level,
            discontinued: product.discontinued,
            category: category.into(),
            supplier: supplier.into(),
        }
    }
}

impl From<CatalogEntry> for ProductDto {
    fn from(entry: CatalogEntry) -> Self {
        Self::from_parts(entry.product, &entry.category, &entry.supplier)
    }
}

impl UpdateProductDto {
    /// Copies every field onto `product`. Empty fields clear the stored value.
    pub fn apply_to(&self, product: &mut Product) {
        product.product_name = self.product_name.clone();
        product.quantity_per_unit = self.quantity_per_unit.clone();
        product.unit_price = self.unit_price;
        product.units_in_stock = self.units_in_stock;
        product.units_on_order = self.units_on_order;
        product.reorder_level = self.reorder_level;
        product.discontinued = self.discontinued;
    }
}
