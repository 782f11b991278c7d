use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(i32),
    #[error("Product id mismatch: path {path}, body {body}")]
    IdMismatch { path: i32, body: i32 },
    #[error("Unresolved reference: {entity} {id}")]
    UnresolvedReference { entity: &'static str, id: i32 },
    #[error("Product {0} was modified concurrently")]
    Conflict(i32),
    #[error("Product store error: {0}")]
    Store(#[from] StoreError),
}
