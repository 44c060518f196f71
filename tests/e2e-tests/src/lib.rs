//! E2E test framework for the service registry.
//!
//! Everything runs in-process on ephemeral loopback ports: a real registry
//! server plus HTTP consumers that record the patches pushed to them.


pub use consumer::{dead_address, PatchInbox};
pub use registry::RegistryHarness;

use std::time::Duration;

/// Upper bound when waiting for an expected patch.
pub const PATCH_WAIT: Duration = Duration::from_secs(5);

/// How long a consumer must stay silent to count as "received nothing".
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);
