use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::error::ApiError;
use super::AppState;
use crate::product_service::{ProductDto, UpdateProductDto};
use crate::store::CatalogStore;

type ApiResult<T> = Result<T, ApiError>;

/// GET /products
pub async fn list_products<S: CatalogStore>(State(state): State<AppState<S>>) -> ApiResult<Response> {
    let products = state.service.list_products().await?;
    if state.preserve_references {
        return Ok(Json(json!({ "$id": "1", "$values": products })).into_response());
    }
    Ok(Json(products).into_response())
}

/// GET /products/:id
pub async fn get_product<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i32>,
) -> ApiResult<Response> {
    let record = state.service.get_product(id).await?;
    Ok(Json(record).into_response())
}

/// POST /products
pub async fn create_product<S: CatalogStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<ProductDto>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(dto) = payload?;
    let created = state.service.create_product(dto).await?;
    let location = format!("/products/{}", created.product_id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)).into_response())
}

/// PUT /products/:id
pub async fn update_product<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateProductDto>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(dto) = payload?;
    let updated = state.service.update_product(id, dto).await?;
    Ok(Json(updated).into_response())
}

/// DELETE /products/:id
pub async fn delete_product<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
