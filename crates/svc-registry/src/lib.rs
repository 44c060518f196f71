//! # Service Registry
//!
//! In-memory service registry with dependency-change push notifications.
//!
//! Services register by URL and name the services they depend on. The
//! registry pushes the already-live dependencies to each newcomer and
//! announces every later arrival or departure, filtered per consumer, to
//! the services that declared interest in it.
//!
//! This crate provides:
//! - The registration table and notification protocol (`storage`, `notify`)
//! - The `/services` HTTP endpoint (`api`)
//! - Server bootstrap over TCP or Unix domain sockets (`server`, `transport`)
//! - YAML configuration (`config`) and the `svc-registry` executable

pub mod api;
pub mod config;
pub mod notify;
pub mod server;
pub mod storage;
pub mod transport;

// Re-export commonly used items
pub use config::RegistryConfig;
pub use notify::{HttpPatchSender, Notifier, PatchSender};
pub use server::RegistryServer;
pub use storage::Registry;
