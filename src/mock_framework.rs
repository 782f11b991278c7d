//! # Mock Framework
//!
//! Utilities for testing the product service against a scripted store.
//!
//! Use [`create_mock_store`] to get a client and a receiver.
//! Then use helpers like [`expect_find_product`] or [`expect_save_product`] to
//! assert what the service asked for and decide what the store answers.

use tokio::sync::mpsc;

use crate::domain::Product;
use crate::store::actor::Response;
use crate::store::{StoreClient, StoreRequest};

/// Creates a store client whose requests land on a receiver the test controls.
///
/// No actor runs behind the channel, so the test can answer with outcomes a
/// real store only produces under races, such as a conflict on a live row.
pub fn create_mock_store(buffer_size: usize) -> (StoreClient, mpsc::Receiver<StoreRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Helper to verify that the next message is a FindProduct request
pub async fn expect_find_product(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(i32, Response<Option<Product>>)> {
    match receiver.recv().await {
        Some(StoreRequest::FindProduct { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a SaveProduct request
pub async fn expect_save_product(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Product, Response<()>)> {
    match receiver.recv().await {
        Some(StoreRequest::SaveProduct { product, respond_to }) => Some((product, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a DeleteProduct request
pub async fn expect_delete_product(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(i32, Response<u64>)> {
    match receiver.recv().await {
        Some(StoreRequest::DeleteProduct { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a ProductExists request
pub async fn expect_product_exists(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(i32, Response<bool>)> {
    match receiver.recv().await {
        Some(StoreRequest::ProductExists { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CatalogStore;

    #[tokio::test]
    async fn test_mock_store() {
        let (client, mut receiver) = create_mock_store(10);

        let lookup = tokio::spawn(async move { client.find_product(3).await });

        let (id, responder) = expect_find_product(&mut receiver).await.expect("Expected FindProduct request");
        assert_eq!(id, 3);
        responder.send(Ok(Some(Product::new(3, "Aniseed Syrup", 2, 1)))).unwrap();

        let result = lookup.await.unwrap().unwrap();
        assert_eq!(result.map(|p| p.product_name), Some("Aniseed Syrup".to_string()));
    }
}
