//! Error types for bookmarks-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// HTTP-facing error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// bookmarks-common error
    #[error("Common error: {0}")]
    Common(#[from] bookmarks_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Common(ref err) => {
                let status = match err {
                    bookmarks_common::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    bookmarks_common::Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, "COMMON_ERROR", err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;
