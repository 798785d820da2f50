//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Catalog store failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to decode catalog row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("catalog query timed out")]
    Timeout,

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("catalog error")]
    Catalog(#[from] CatalogError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Catalog(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        // Internal details stay in the log.
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            AppError::Catalog(e) => {
                tracing::error!(error = %e, "catalog store error");
                "catalog temporarily unavailable".to_string()
            }
            AppError::BadRequest(_) => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_errors_map_to_service_unavailable() {
        let response = AppError::from(CatalogError::Timeout).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn bad_request_keeps_message() {
        let err = AppError::BadRequest("page must be a positive integer".to_string());
        assert_eq!(err.to_string(), "bad request: page must be a positive integer");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
