//! Terminal view of the product list.
//!
//! The view fetches the list once. Until products arrive it shows a loading
//! placeholder, and a failed fetch is logged and leaves it there.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, instrument};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Product list request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// The fields the view shows for each product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedProduct {
    pub product_id: i32,
    pub product_name: String,
}

/// Either a bare array or a reference-preserving `$values` wrapper.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductListing {
    Plain(Vec<ListedProduct>),
    Preserved {
        #[serde(rename = "$values")]
        values: Vec<ListedProduct>,
    },
}

impl ProductListing {
    pub fn into_products(self) -> Vec<ListedProduct> {
        match self {
            ProductListing::Plain(products) => products,
            ProductListing::Preserved { values } => values,
        }
    }
}

#[derive(Debug, Default)]
pub enum CatalogView {
    #[default]
    Loading,
    Loaded(Vec<ListedProduct>),
}

impl CatalogView {
    /// Fetches the list and moves to `Loaded`. On failure the error is logged
    /// and the view stays as it was.
    pub async fn load(&mut self, client: &reqwest::Client, base_url: &str) {
        match fetch_products(client, base_url).await {
            Ok(products) => *self = CatalogView::Loaded(products),
            Err(e) => error!(error = %e, "Error fetching data"),
        }
    }
}

impl fmt::Display for CatalogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogView::Loaded(products) if !products.is_empty() => {
                writeln!(f, "Northwind Final Project")?;
                for product in products {
                    writeln!(f, "  Product Id: {} - {}", product.product_id, product.product_name)?;
                }
                Ok(())
            }
            _ => writeln!(f, "Loading..."),
        }
    }
}

#[instrument(skip(client))]
pub async fn fetch_products(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<Vec<ListedProduct>, ViewError> {
    let url = format!("{}/Products", base_url.trim_end_matches('/'));
    let listing: ProductListing = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let products = listing.into_products();
    debug!(count = products.len(), "Fetched products");
    Ok(products)
}
