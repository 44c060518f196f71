//! Local table of known providers, maintained from registry patches.

use parking_lot::RwLock;
use std::collections::HashMap;
use svc_common::{Error, Patch, Result, ServiceName};
use tracing::debug;

/// URLs of the services this process depends on, by name.
///
/// Fed by the patches the registry pushes to the service's update endpoint.
#[derive(Debug, Default)]
pub struct Providers {
    services: RwLock<HashMap<ServiceName, Vec<String>>>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a patch: added URLs are appended once, removed URLs dropped.
    pub fn update(&self, patch: &Patch) {
        let mut services = self.services.write();

        for entry in &patch.added {
            let urls = services.entry(entry.name.clone()).or_default();
            if !urls.contains(&entry.url) {
                debug!("Provider added: {} at {}", entry.name, entry.url);
                urls.push(entry.url.clone());
            }
        }

        for entry in &patch.removed {
            if let Some(urls) = services.get_mut(&entry.name) {
                urls.retain(|url| url != &entry.url);
                debug!("Provider removed: {} at {}", entry.name, entry.url);
                if urls.is_empty() {
                    services.remove(&entry.name);
                }
            }
        }
    }

    /// Returns a URL for `name`, the earliest known provider first.
    pub fn get(&self, name: &ServiceName) -> Result<String> {
        self.services
            .read()
            .get(name)
            .and_then(|urls| urls.first().cloned())
            .ok_or_else(|| Error::not_found(format!("provider for service {}", name)))
    }

    /// Returns every known URL for `name`.
    pub fn all(&self, name: &ServiceName) -> Vec<String> {
        self.services.read().get(name).cloned().unwrap_or_default()
    }
}
