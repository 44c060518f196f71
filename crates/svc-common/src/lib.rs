//! # Service Registry Common
//!
//! Types shared by the registry server and the services that talk to it.
//!
//! This crate provides:
//! - The error type used across the workspace
//! - The wire data model (`Registration`, `Patch`, `PatchEntry`)

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{Error, Result, ResultExt};
pub use types::{ErrorResponse, Patch, PatchEntry, Registration, ServiceName};
