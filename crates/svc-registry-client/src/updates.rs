//! Endpoint that receives patches pushed by the registry.
//!
//! Mount the router in the service's own HTTP server and register
//! `<service url>/services` as the `ServiceUpdateURL`.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    routing::any,
    Router,
};
use std::sync::Arc;
use svc_common::Patch;
use tracing::{info, warn};

use crate::providers::Providers;

/// Path the update endpoint is mounted at.
pub const UPDATE_PATH: &str = "/services";

/// Creates the router for the update endpoint.
pub fn update_router(providers: Arc<Providers>) -> Router {
    Router::new()
        .route(UPDATE_PATH, any(update_handler))
        .with_state(providers)
}

async fn update_handler(
    State(providers): State<Arc<Providers>>,
    method: Method,
    body: Bytes,
) -> StatusCode {
    if method != Method::POST {
        return StatusCode::METHOD_NOT_ALLOWED;
    }

    match Patch::from_json(&body) {
        Ok(patch) => {
            info!(
                "Update received: {} added, {} removed",
                patch.added.len(),
                patch.removed.len()
            );
            providers.update(&patch);
            StatusCode::OK
        }
        Err(e) => {
            warn!("Ignoring malformed patch: {}", e);
            StatusCode::BAD_REQUEST
        }
    }
}
