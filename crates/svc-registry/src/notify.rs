//! Patch delivery: the direct bootstrap push and the concurrent fan-out.
//!
//! # Rust Learning Note
//!
//! ## Supervised fire-and-forget
//!
//! A fan-out round is one spawned supervisor task that owns a `JoinSet`:
//!
//! ```rust,ignore
//! let handle = notifier.fan_out(deliveries); // returns immediately
//! // dropping `handle` detaches the round, awaiting it yields a FanOutReport
//! ```
//!
//! Every delivery runs as its own task and holds one semaphore permit, so a
//! slow consumer only occupies its own slot. The supervisor joins every task,
//! logs failures and drops them. Nothing is retried.

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;
use std::time::Duration;
use svc_common::{Error, Patch, Result};
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, warn};

/// Upper bound for a single outbound patch POST.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for concurrently running fan-out deliveries.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Sends a patch to a service's update endpoint.
#[async_trait]
pub trait PatchSender: Send + Sync {
    async fn send_patch(&self, update_url: &str, patch: &Patch) -> Result<()>;
}

/// `PatchSender` that POSTs JSON over HTTP/1.1.
///
/// The response status is logged but not acted upon: a patch counts as
/// delivered once the consumer answered at all.
pub struct HttpPatchSender {
    /// Hyper HTTP client (reusable, pooled connections).
    client: Client<HttpConnector, Full<Bytes>>,

    /// Applied to every request, connect included.
    timeout: Duration,
}

impl HttpPatchSender {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();

        Self { client, timeout }
    }
}

impl Default for HttpPatchSender {
    fn default() -> Self {
        Self::new(DEFAULT_DELIVERY_TIMEOUT)
    }
}

#[async_trait]
impl PatchSender for HttpPatchSender {
    async fn send_patch(&self, update_url: &str, patch: &Patch) -> Result<()> {
        let body = serde_json::to_vec(patch)
            .map_err(|e| Error::Internal(format!("Failed to serialize patch: {}", e)))?;

        let uri: Uri = update_url
            .parse()
            .map_err(|e| Error::delivery(update_url, format!("invalid URI: {}", e)))?;

        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| Error::delivery(update_url, format!("failed to build request: {}", e)))?;

        let resp = match tokio::time::timeout(self.timeout, self.client.request(req)).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => return Err(Error::delivery(update_url, e.to_string())),
            Err(_) => {
                return Err(Error::delivery(
                    update_url,
                    format!("timed out after {:?}", self.timeout),
                ))
            }
        };

        if !resp.status().is_success() {
            warn!(
                "Update endpoint {} answered patch with status {}",
                update_url,
                resp.status()
            );
        }

        Ok(())
    }
}

/// One patch addressed to one consumer.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// ServiceURL of the consumer, for diagnostics.
    pub consumer: String,
    pub update_url: String,
    pub patch: Patch,
}

/// Outcome of a fan-out round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Dispatches patches through a [`PatchSender`].
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn PatchSender>,
    permits: Arc<Semaphore>,
}

impl Notifier {
    pub fn new(sender: Arc<dyn PatchSender>, max_in_flight: usize) -> Self {
        Self {
            sender,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Notifier backed by [`HttpPatchSender`].
    pub fn http(timeout: Duration, max_in_flight: usize) -> Self {
        Self::new(Arc::new(HttpPatchSender::new(timeout)), max_in_flight)
    }

    /// Delivers one patch and waits for the outcome.
    pub async fn push(&self, update_url: &str, patch: &Patch) -> Result<()> {
        debug!("Pushing patch to {}", update_url);
        self.sender.send_patch(update_url, patch).await
    }

    /// Starts a fan-out round in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fan_out(&self, deliveries: Vec<Delivery>) -> JoinHandle<FanOutReport> {
        let sender = Arc::clone(&self.sender);
        let permits = Arc::clone(&self.permits);

        tokio::spawn(async move { Self::supervise(sender, permits, deliveries).await })
    }

    async fn supervise(
        sender: Arc<dyn PatchSender>,
        permits: Arc<Semaphore>,
        deliveries: Vec<Delivery>,
    ) -> FanOutReport {
        let mut report = FanOutReport::default();
        let mut join_set = JoinSet::new();

        for delivery in deliveries {
            let permit = match Arc::clone(&permits).acquire_owned().await {
                Ok(p) => p,
                Err(e) => {
                    error!(
                        "Delivery semaphore closed, dropping patch for {}: {}",
                        delivery.consumer, e
                    );
                    report.failed += 1;
                    continue;
                }
            };

            let sender = Arc::clone(&sender);
            join_set.spawn(async move {
                let _permit = permit;
                let result = sender.send_patch(&delivery.update_url, &delivery.patch).await;
                (delivery, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((delivery, Ok(()))) => {
                    debug!("Notified {} at {}", delivery.consumer, delivery.update_url);
                    report.delivered += 1;
                }
                Ok((delivery, Err(e))) => {
                    warn!("Dropping notification for {}: {}", delivery.consumer, e);
                    report.failed += 1;
                }
                Err(e) => {
                    if e.is_panic() {
                        error!("Notification task panicked: {}", e);
                    } else {
                        warn!("Notification task cancelled: {}", e);
                    }
                    report.failed += 1;
                }
            }
        }

        report
    }
}
