//! Service registry client implementation.
//!
//! # Rust Learning Note
//!
//! ## POST Request with JSON Body
//!
//! ```rust,ignore
//! // 1. Serialize to JSON
//! let body = serde_json::to_vec(&registration)?;
//!
//! // 2. Build request
//! let req = Request::builder()
//!     .method("POST")
//!     .uri(uri)
//!     .header("content-type", "application/json")
//!     .body(Full::new(Bytes::from(body)))?;
//!
//! // 3. Send
//! let resp = self.client.request(req).await?;
//! ```
//!
//! Each step can fail, and each failure is mapped into our own `Error` with
//! `map_err` before `?` propagates it.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use svc_common::{Error, ErrorResponse, Registration, Result};
use tracing::debug;

/// Path of the registry's registration endpoint.
const SERVICES_PATH: &str = "/services";

/// Service registry client.
///
/// Holds one pooled hyper client; clone-free reuse across calls keeps
/// connections alive.
pub struct RegistryClient {
    /// Base URL of the service registry (e.g., "http://localhost:3000").
    base_url: String,

    /// Hyper HTTP client (reusable, pooled connections).
    client: Client<HttpConnector, Full<Bytes>>,
}

impl RegistryClient {
    /// Creates a new service registry client.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registers a service.
    ///
    /// Fails if the registry rejected the registration, which includes the
    /// case where the registry could not reach `service_update_url` with the
    /// initial dependency patch. The registration is stored even then.
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        debug!(
            "Registering {} at {} with {}",
            registration.service_name, registration.service_url, self.base_url
        );

        let body = serde_json::to_vec(registration)
            .map_err(|e| Error::Protocol(format!("Failed to serialize registration: {}", e)))?;

        self.send("POST", "application/json", Bytes::from(body)).await?;

        debug!("Registered {}", registration.service_url);
        Ok(())
    }

    /// Removes the registration for `service_url`.
    pub async fn deregister(&self, service_url: &str) -> Result<()> {
        debug!("Deregistering {} from {}", service_url, self.base_url);

        self.send("DELETE", "text/plain", Bytes::from(service_url.to_string()))
            .await?;

        debug!("Deregistered {}", service_url);
        Ok(())
    }

    async fn send(&self, method: &str, content_type: &str, body: Bytes) -> Result<()> {
        let url = format!("{}{}", self.base_url, SERVICES_PATH);

        // Parse URI
        let uri: Uri = url
            .parse()
            .map_err(|e| Error::Protocol(format!("Invalid URI: {}", e)))?;

        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Full::new(body))
            .map_err(|e| Error::Protocol(format!("Failed to build request: {}", e)))?;

        // Send request
        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| Error::Protocol(format!("HTTP request failed: {}", e)))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        // The body is diagnostic only; fall back to the bare status.
        let detail = match resp.into_body().collect().await {
            Ok(collected) => serde_json::from_slice::<ErrorResponse>(&collected.to_bytes())
                .map(|e| format!(": {}", e.error))
                .unwrap_or_default(),
            Err(_) => String::new(),
        };

        Err(Error::Protocol(format!(
            "Registry returned status: {}{}",
            status, detail
        )))
    }
}
