use serde::{Deserialize, Serialize};

/// One line of an order. Always references an existing product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order_id: i32,
    pub product_id: i32,
    pub unit_price: f64,
    pub quantity: i16,
    pub discount: f64,
}

impl OrderDetail {
    pub fn new(order_id: i32, product_id: i32, unit_price: f64, quantity: i16) -> Self {
        Self {
            order_id,
            product_id,
            unit_price,
            quantity,
            discount: 0.0,
        }
    }
}
