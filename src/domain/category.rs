use serde::{Deserialize, Serialize};

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: i32,
    pub category_name: String,
}

impl Category {
    pub fn new(category_id: i32, category_name: impl Into<String>) -> Self {
        Self {
            category_id,
            category_name: category_name.into(),
        }
    }

    /// A row holding nothing but the id a caller referenced.
    pub fn placeholder(category_id: i32) -> Self {
        Self::new(category_id, "")
    }
}
