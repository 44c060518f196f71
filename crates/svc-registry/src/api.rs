//! HTTP boundary of the registry, built with axum.
//!
//! # Rust Learning Note
//!
//! ## One endpoint, method as the operation selector
//!
//! ```rust,ignore
//! Router::new().route("/services", any(services_handler))
//! ```
//!
//! `any` hands every method to the same handler, which then matches on the
//! `Method` extractor. The body is taken as raw `Bytes` (wrapped in a
//! `Result` so a failed read becomes our own error instead of axum's
//! automatic rejection); POST decodes it as JSON, DELETE reads it as the
//! plain-text ServiceURL.
//!
//! | Method | Success | Failure |
//! |--------|---------|---------|
//! | POST   | 200     | 400     |
//! | DELETE | 200     | 500     |
//! | other  | -       | 405     |

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use std::sync::Arc;
use svc_common::{ErrorResponse, Registration};
use tracing::{error, info};

use crate::storage::Registry;

/// Path of the registration endpoint.
pub const SERVICES_PATH: &str = "/services";

/// Creates the API router.
pub fn create_router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route(SERVICES_PATH, any(services_handler))
        .route("/health", get(health_handler))
        .with_state(registry)
}

async fn services_handler(
    State(registry): State<Arc<Registry>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<StatusCode, ApiError> {
    info!("Request received: {} {}", method, SERVICES_PATH);

    match method {
        Method::POST => {
            let body = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
            let registration = Registration::from_json(&body)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;

            info!(
                "Adding service: {} with URL: {}",
                registration.service_name, registration.service_url
            );

            registry
                .add(registration)
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;

            Ok(StatusCode::OK)
        }

        Method::DELETE => {
            let body = body.map_err(|e| ApiError::Internal(e.body_text()))?;
            let payload = String::from_utf8(body.to_vec())
                .map_err(|e| ApiError::Internal(format!("ServiceURL is not UTF-8: {}", e)))?;
            let url = payload.trim();

            info!("Removing service at URL {}", url);

            registry
                .remove(url)
                .map_err(|e| ApiError::Internal(e.to_string()))?;

            Ok(StatusCode::OK)
        }

        other => Err(ApiError::MethodNotAllowed(other)),
    }
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

/// API error type.
///
/// Converted into a status code plus an [`ErrorResponse`] body. The body is
/// diagnostic only.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
    MethodNotAllowed(Method),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::MethodNotAllowed(method) => (
                StatusCode::METHOD_NOT_ALLOWED,
                format!("Method {} not allowed on {}", method, SERVICES_PATH),
            ),
        };

        error!("API error: {} - {}", status, message);

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
