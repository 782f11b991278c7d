//! Starting data for a catalog store.

use super::{Category, OrderDetail, Product, Supplier};

/// Rows loaded into an empty store, in dependency order.
#[derive(Debug, Clone, Default)]
pub struct CatalogSeed {
    pub categories: Vec<Category>,
    pub suppliers: Vec<Supplier>,
    pub products: Vec<Product>,
    pub order_details: Vec<OrderDetail>,
}

impl CatalogSeed {
    /// A small slice of the Northwind sample database.
    pub fn northwind_sample() -> Self {
        let categories = vec![
            Category::new(1, "Beverages"),
            Category::new(2, "Condiments"),
        ];
        let suppliers = vec![
            Supplier::new(1, "Exotic Liquids"),
            Supplier::new(2, "New Orleans Cajun Delights"),
        ];

        let mut chai = Product::new(1, "Chai", 1, 1);
        chai.quantity_per_unit = Some("10 boxes x 20 bags".to_string());
        chai.unit_price = Some(18.0);
        chai.units_in_stock = Some(39);
        chai.units_on_order = Some(0);
        chai.reorder_level = Some(10);

        let mut chang = Product::new(2, "Chang", 1, 1);
        chang.quantity_per_unit = Some("24 - 12 oz bottles".to_string());
        chang.unit_price = Some(19.0);
        chang.units_in_stock = Some(17);
        chang.units_on_order = Some(40);
        chang.reorder_level = Some(25);

        let mut syrup = Product::new(3, "Aniseed Syrup", 2, 1);
        syrup.quantity_per_unit = Some("12 - 550 ml bottles".to_string());
        syrup.unit_price = Some(10.0);
        syrup.units_in_stock = Some(13);
        syrup.units_on_order = Some(70);
        syrup.reorder_level = Some(25);

        let mut seasoning = Product::new(4, "Chef Anton's Cajun Seasoning", 2, 2);
        seasoning.quantity_per_unit = Some("48 - 6 oz jars".to_string());
        seasoning.unit_price = Some(22.0);
        seasoning.units_in_stock = Some(53);
        seasoning.units_on_order = Some(0);
        seasoning.reorder_level = Some(0);

        let order_details = vec![
            OrderDetail::new(10248, 1, 14.4, 12),
            OrderDetail::new(10249, 1, 14.4, 9),
            OrderDetail::new(10250, 2, 15.2, 10),
            OrderDetail::new(10251, 4, 17.6, 6),
        ];

        Self {
            categories,
            suppliers,
            products: vec![chai, chang, syrup, seasoning],
            order_details,
        }
    }
}
