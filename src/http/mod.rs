//! HTTP endpoints for the product catalog.

mod error;
mod handlers;

use axum::routing::get;
use axum::Router;

use crate::product_service::ProductService;
use crate::store::CatalogStore;

pub use error::{ApiError, ErrorBody};

/// Shared state handed to every handler.
pub struct AppState<S> {
    pub service: ProductService<S>,
    /// Wrap list responses as `{"$id": "1", "$values": [...]}`.
    pub preserve_references: bool,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            preserve_references: self.preserve_references,
        }
    }
}

impl<S: CatalogStore> AppState<S> {
    pub fn new(service: ProductService<S>) -> Self {
        Self {
            service,
            preserve_references: false,
        }
    }

    pub fn with_preserved_references(mut self, preserve_references: bool) -> Self {
        self.preserve_references = preserve_references;
        self
    }
}

/// Builds the router. The capitalised `/Products` paths serve the same handlers.
pub fn router<S: CatalogStore>(state: AppState<S>) -> Router {
    let router = Router::new();
    let router = product_routes(router, "/products");
    let router = product_routes(router, "/Products");
    router.with_state(state)
}

fn product_routes<S: CatalogStore>(
    router: Router<AppState<S>>,
    base: &str,
) -> Router<AppState<S>> {
    router
        .route(
            base,
            get(handlers::list_products::<S>).post(handlers::create_product::<S>),
        )
        .route(
            &format!("{base}/:id"),
            get(handlers::get_product::<S>)
                .put(handlers::update_product::<S>)
                .delete(handlers::delete_product::<S>),
        )
}
