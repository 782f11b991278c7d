use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::product_service::ProductError;

/// JSON body sent with every error status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub title: String,
}

/// Everything a product endpoint can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error("Invalid request body: {}", .0.body_text())]
    Payload(#[from] JsonRejection),
}

impl ProductError {
    fn status(&self) -> StatusCode {
        match self {
            ProductError::NotFound(_) => StatusCode::NOT_FOUND,
            ProductError::IdMismatch { .. } | ProductError::UnresolvedReference { .. } => {
                StatusCode::BAD_REQUEST
            }
            ProductError::Conflict(_) | ProductError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Product(e) => e.status(),
            // A well-formed body of the wrong shape is a bad request, not 422.
            ApiError::Payload(rejection) => match rejection.status() {
                StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
                status => status,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else if let ApiError::Payload(_) = &self {
            debug!(error = %self, "Rejected request body");
        }
        let body = ErrorBody {
            status: status.as_u16(),
            title: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
