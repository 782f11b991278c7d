use serde::{Deserialize, Serialize};

/// A company supplying products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub supplier_id: i32,
    pub company_name: String,
}

impl Supplier {
    pub fn new(supplier_id: i32, company_name: impl Into<String>) -> Self {
        Self {
            supplier_id,
            company_name: company_name.into(),
        }
    }

    pub fn placeholder(supplier_id: i32) -> Self {
        Self::new(supplier_id, "")
    }
}
