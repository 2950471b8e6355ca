pub mod direct;
pub mod proxy;
pub mod server;

use axum::{
    Json,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::submission::SubmissionError;

pub use server::{direct_router, proxy_router, run_api_server, run_proxy_server};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidSubmission(#[from] SubmissionError),
    #[error("Not found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidSubmission(e) => {
                warn!("Rejected submission: {}", e);
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Anything that is not an exact (method, path) match. A bare `OPTIONS`
/// (not a CORS preflight) is answered with an empty 200 on every path.
pub async fn not_found(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    ApiError::NotFound.into_response()
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
