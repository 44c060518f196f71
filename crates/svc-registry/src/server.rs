//! Service registry server implementation.
//!
//! # Rust Learning Note
//!
//! ## Graceful Shutdown
//!
//! The server does not install signal handlers itself. Whoever starts it
//! passes a `CancellationToken` and cancels it to stop accepting requests:
//!
//! ```rust,ignore
//! let shutdown = CancellationToken::new();
//! tokio::spawn(server.run(shutdown.clone()));
//! // ... later
//! shutdown.cancel();
//! ```
//!
//! In-flight requests are allowed to finish. Detached notification rounds
//! are not awaited.

use axum::Router;
use std::sync::Arc;
use svc_common::Result;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[cfg(unix)]
use tokio::net::UnixListener;

use crate::{
    api::create_router, config::RegistryConfig, notify::Notifier, storage::Registry,
    transport::TransportConfig,
};

/// Service registry server.
///
/// Owns the one `Registry` instance of the process and hands it to the
/// HTTP handlers through axum state.
pub struct RegistryServer {
    registry: Arc<Registry>,
    transport: TransportConfig,
    router: Router,
}

impl RegistryServer {
    /// Creates a server delivering patches over HTTP as configured.
    pub fn new(config: &RegistryConfig) -> Self {
        info!(
            "Patch delivery: timeout {:?}, at most {} in flight",
            config.delivery.timeout, config.delivery.max_in_flight
        );
        let notifier = Notifier::http(config.delivery.timeout, config.delivery.max_in_flight);
        let registry = Arc::new(Registry::new(notifier));

        Self::with_registry(registry, config.transport())
    }

    /// Creates a server around an existing registry.
    pub fn with_registry(registry: Arc<Registry>, transport: TransportConfig) -> Self {
        let router = create_router(Arc::clone(&registry));

        Self {
            registry,
            transport,
            router,
        }
    }

    /// Returns a reference to the registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Binds the configured transport and serves until `shutdown` is
    /// cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        info!("Starting registry server: {}", self.transport.describe());

        // Clone transport config to avoid borrowing issues
        let transport = self.transport.clone();

        match transport {
            TransportConfig::Tcp { host, port } => {
                let addr = format!("{}:{}", host, port);
                info!("Binding to TCP: {}", addr);

                let listener = TcpListener::bind(&addr).await?;
                self.serve(listener, shutdown).await?;
            }

            #[cfg(unix)]
            TransportConfig::UnixSocket { path } => {
                self.run_unix_socket(&path, shutdown).await?;
            }
        }

        Ok(())
    }

    /// Serves on an already bound TCP listener.
    ///
    /// Binding to port 0 beforehand gives an ephemeral port whose address
    /// is known before the server starts.
    pub async fn serve(self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await?;

        info!("Registry server stopped");
        Ok(())
    }

    #[cfg(unix)]
    async fn run_unix_socket(
        self,
        path: &std::path::Path,
        shutdown: CancellationToken,
    ) -> Result<()> {
        info!("Binding to Unix socket: {}", path.display());

        // Remove old socket file if it exists
        if path.exists() {
            std::fs::remove_file(path)?;
        }

        let listener = UnixListener::bind(path)?;
        info!("Server listening on {}", path.display());

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await?;

        info!("Registry server stopped");
        Ok(())
    }
}
