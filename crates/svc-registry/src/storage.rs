//! In-memory registration table and the dependency notification protocol.
//!
//! # Rust Learning Note
//!
//! ## Short critical sections
//!
//! The table is a `parking_lot::RwLock<Vec<Registration>>`. Its guards are
//! not `Send`, so the compiler refuses any `async fn` that keeps one alive
//! across an `.await`:
//!
//! ```rust,ignore
//! let patch = {
//!     let table = self.registrations.read();
//!     // ... build the patch from a snapshot
//! }; // guard dropped here
//! self.notifier.push(url, &patch).await // network I/O, lock already released
//! ```
//!
//! Every mutation holds the write lock only for the change itself. Patches
//! are sent after the lock is released, so `add` and `remove` are not atomic
//! end to end: a reader may see a new registration before its bootstrap push
//! or fan-out has finished, and side effects of concurrent calls may
//! interleave. A slow consumer can never stall registry mutations.

use parking_lot::RwLock;
use std::sync::Arc;
use svc_common::{Error, Patch, Registration, Result, ResultExt};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::notify::{Delivery, FanOutReport, Notifier, PatchSender, DEFAULT_MAX_IN_FLIGHT};

/// The authoritative set of live registrations.
///
/// Constructed explicitly and shared as `Arc<Registry>` with the HTTP
/// handlers. At most one registration exists per ServiceURL.
pub struct Registry {
    /// Registrations in insertion order.
    registrations: RwLock<Vec<Registration>>,
    notifier: Notifier,
}

impl Registry {
    /// Creates an empty registry that delivers patches through `notifier`.
    pub fn new(notifier: Notifier) -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
            notifier,
        }
    }

    /// Creates an empty registry around a custom sender.
    pub fn with_sender(sender: Arc<dyn PatchSender>) -> Self {
        Self::new(Notifier::new(sender, DEFAULT_MAX_IN_FLIGHT))
    }

    /// Adds a registration, replacing any existing one with the same URL.
    ///
    /// After storing it, pushes the already-live dependencies to the new
    /// service and announces the service to every other registration that
    /// depends on its name. Only a failed bootstrap push is returned; the
    /// registration stays in place either way.
    ///
    /// A replacement under a different ServiceName also retires the old
    /// name: the announcement carries the old entry in `Removed` alongside
    /// the new one in `Added`, so dependents of either name stay in sync.
    pub async fn add(&self, registration: Registration) -> Result<()> {
        registration.validate()?;

        let replaced = {
            let mut table = self.registrations.write();
            match table
                .iter()
                .position(|r| r.service_url == registration.service_url)
            {
                Some(index) => Some(std::mem::replace(
                    &mut table[index],
                    registration.clone(),
                )),
                None => {
                    table.push(registration.clone());
                    None
                }
            }
        };

        let mut announcement = Patch::added(vec![registration.entry()]);
        match &replaced {
            Some(old) if old.service_name != registration.service_name => {
                info!(
                    "Renamed service at URL {}: {} -> {}",
                    registration.service_url, old.service_name, registration.service_name
                );
                announcement.removed.push(old.entry());
            }
            Some(_) => info!(
                "Updated service: {} with URL: {}",
                registration.service_name, registration.service_url
            ),
            None => info!(
                "Added service: {} with URL: {}",
                registration.service_name, registration.service_url
            ),
        }

        let bootstrap = self.send_required_services(&registration).await;

        self.notify(announcement, &registration.service_url);

        bootstrap
    }

    /// Removes the registration for `service_url` and announces the
    /// removal to its dependents.
    ///
    /// Fails with [`Error::ServiceNotFound`] if no such registration exists,
    /// including when a concurrent call removed it first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn remove(&self, service_url: &str) -> Result<()> {
        // Lookup and deletion happen under one write lock so that exactly
        // one of several concurrent removals wins and notifies.
        let removed = {
            let mut table = self.registrations.write();
            let index = table
                .iter()
                .position(|r| r.service_url == service_url)
                .ok_or_else(|| Error::service_not_found(service_url))?;
            table.remove(index)
        };

        info!(
            "Removed service: {} at URL: {}",
            removed.service_name, removed.service_url
        );

        self.notify(Patch::removed(vec![removed.entry()]), service_url);
        Ok(())
    }

    /// Returns a snapshot of all registrations in table order.
    pub fn registrations(&self) -> Vec<Registration> {
        self.registrations.read().clone()
    }

    /// Looks up a registration by its URL.
    pub fn find(&self, service_url: &str) -> Option<Registration> {
        self.registrations
            .read()
            .iter()
            .find(|r| r.service_url == service_url)
            .cloned()
    }

    /// Returns the number of registrations.
    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    /// Pushes the already-registered dependencies of `registration` to its
    /// update endpoint.
    ///
    /// Nothing is sent for a service without dependencies. A service that has
    /// dependencies but none of them live receives an empty patch.
    async fn send_required_services(&self, registration: &Registration) -> Result<()> {
        if registration.required_services.is_empty() {
            return Ok(());
        }

        let patch = {
            let table = self.registrations.read();
            Patch::added(
                table
                    .iter()
                    .filter(|r| r.service_url != registration.service_url)
                    .filter(|r| registration.requires(&r.service_name))
                    .map(Registration::entry)
                    .collect(),
            )
        };

        debug!(
            "Sending {} live dependencies to {}",
            patch.added.len(),
            registration.service_url
        );

        self.notifier
            .push(&registration.service_update_url, &patch)
            .await
            .context(format!(
                "Bootstrap push to {} failed",
                registration.service_url
            ))
    }

    /// Fans `patch` out to every registration that depends on one of its
    /// entries, skipping the registration at `origin_url`.
    ///
    /// Each consumer gets only the entries it declared interest in. The
    /// round runs detached; the returned handle may be awaited or dropped.
    /// Returns `None` when nobody is interested.
    pub(crate) fn notify(
        &self,
        patch: Patch,
        origin_url: &str,
    ) -> Option<JoinHandle<FanOutReport>> {
        let deliveries: Vec<Delivery> = {
            let table = self.registrations.read();
            table
                .iter()
                .filter(|consumer| consumer.service_url != origin_url)
                .filter_map(|consumer| {
                    let relevant = patch.filter_for(&consumer.required_services);
                    (!relevant.is_empty()).then(|| Delivery {
                        consumer: consumer.service_url.clone(),
                        update_url: consumer.service_update_url.clone(),
                        patch: relevant,
                    })
                })
                .collect()
        };

        if deliveries.is_empty() {
            debug!("No dependents to notify about change at {}", origin_url);
            return None;
        }

        debug!(
            "Notifying {} dependent(s) about change at {}",
            deliveries.len(),
            origin_url
        );
        Some(self.notifier.fan_out(deliveries))
    }
}
