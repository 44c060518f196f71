//! Error types for the service registry.
//!
//! # Rust Learning Note
//!
//! Rust doesn't have exceptions - it uses `Result<T, E>` for error handling.
//!
//! ```rust
//! use svc_common::{Error, Result};
//!
//! fn remove(url: &str) -> Result<()> {
//!     Err(Error::service_not_found(url))
//! }
//!
//! fn caller() -> Result<()> {
//!     // `?` propagates the error to our own caller
//!     remove("http://localhost:4000")?;
//!     Ok(())
//! }
//! ```
//!
//! The registry distinguishes caller mistakes (`Validation`, `Decode`,
//! `ServiceNotFound`) from third-party unavailability (`Delivery`). Only the
//! former ever fail a registry operation outright.

use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for registry operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A requested resource was not found.
    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
    },

    /// No registration exists for the given service URL.
    #[error("Service at URL {url} not found")]
    ServiceNotFound {
        url: String,
    },

    /// Invalid input or configuration.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// A payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A patch could not be delivered to a service's update endpoint.
    #[error("Delivery to {url} failed: {reason}")]
    Delivery {
        url: String,
        reason: String,
    },

    /// HTTP protocol error (bad URI, unexpected status, ...).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Internal error (shouldn't happen in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error (wraps std::io::Error).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context.
    #[error("{message}: {source}")]
    WithContext {
        message: String,
        source: Box<Error>,
    },
}

impl Error {
    /// Creates a NotFound error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a ServiceNotFound error naming the URL.
    pub fn service_not_found(url: impl Into<String>) -> Self {
        Self::ServiceNotFound { url: url.into() }
    }

    /// Creates a Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a Delivery error.
    pub fn delivery(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Delivery {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error was caused by an unreachable peer
    /// rather than by the request itself.
    pub fn is_delivery(&self) -> bool {
        match self {
            Error::Delivery { .. } => true,
            Error::WithContext { source, .. } => source.is_delivery(),
            _ => false,
        }
    }

    /// Adds context to an error.
    ///
    /// # Example
    /// ```
    /// use svc_common::{Error, Result};
    ///
    /// fn inner() -> Result<()> {
    ///     Err(Error::not_found("provider"))
    /// }
    ///
    /// fn outer() -> Result<()> {
    ///     inner().map_err(|e| e.context("Failed to resolve dependency"))
    /// }
    /// ```
    pub fn context(self, message: impl Into<String>) -> Self {
        Self::WithContext {
            message: message.into(),
            source: Box::new(self),
        }
    }
}

// Convenience methods for Result types
pub trait ResultExt<T> {
    /// Adds context to an error result.
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(message))
    }
}
