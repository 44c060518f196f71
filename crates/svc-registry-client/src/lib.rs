//! # Service Registry Client
//!
//! What a service needs to take part in the registry:
//! - `RegistryClient`: register and deregister over HTTP
//! - `Providers`: local view of the dependencies this service requires
//! - `update_router`: the endpoint that receives patches pushed by the registry

pub mod client;
pub mod providers;
pub mod updates;

// Re-export commonly used items
pub use client::RegistryClient;
pub use providers::Providers;
pub use updates::update_router;
