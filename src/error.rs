//! Request-boundary error taxonomy.
//!
//! Every fallible request path resolves to one of these variants, which map
//! onto HTTP statuses in `IntoResponse`. Token verification failures of any
//! kind (expired, malformed, bad signature) collapse into `Authentication`
//! before reaching this layer, so the response never tells a caller why a
//! credential was rejected.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed shape or length validation.
    #[error("validation failed")]
    Validation(Vec<String>),

    /// No credential, or a credential that did not verify.
    #[error("authentication required")]
    Authentication,

    /// Valid credential, insufficient role.
    #[error("admin access required")]
    Authorization,

    /// Slug lookup miss.
    #[error("not found")]
    NotFound,

    /// The caller exhausted its window.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Storage collaborator failure. Logged in full, surfaced opaquely.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Persistence(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": errors }),
            ),
            ApiError::Authentication => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Authentication required" }),
            ),
            ApiError::Authorization => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Admin access required" }),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Post not found" })),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": "Rate limit exceeded. Please try again later." }),
            ),
            ApiError::Persistence(detail) => {
                tracing::error!("persistence failure: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
