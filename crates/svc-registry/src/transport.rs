//! Listening transports for the registry server.
//!
//! # Rust Learning Note
//!
//! ## Conditional Compilation
//!
//! ```rust,ignore
//! #[cfg(unix)]
//! UnixSocket { path: PathBuf },
//! ```
//!
//! The `UnixSocket` variant only exists on Unix targets. Every `match` on
//! `TransportConfig` carries the same `#[cfg(unix)]` arm, so the compiler
//! still checks exhaustiveness on each platform.

#[cfg(unix)]
use std::path::PathBuf;

/// Default registry host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Well-known registry port.
pub const DEFAULT_PORT: u16 = 3000;

/// Where the registry server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    /// TCP socket.
    Tcp { host: String, port: u16 },

    /// Unix domain socket (Unix only).
    #[cfg(unix)]
    UnixSocket { path: PathBuf },
}

impl TransportConfig {
    /// Creates a TCP transport config.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Creates a Unix domain socket config (Unix only).
    #[cfg(unix)]
    pub fn unix_socket(path: impl Into<PathBuf>) -> Self {
        Self::UnixSocket { path: path.into() }
    }

    /// Returns a human-readable description of the transport.
    pub fn describe(&self) -> String {
        match self {
            TransportConfig::Tcp { host, port } => format!("TCP on {}:{}", host, port),

            #[cfg(unix)]
            TransportConfig::UnixSocket { path } => {
                format!("Unix domain socket at {}", path.display())
            }
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::tcp(DEFAULT_HOST, DEFAULT_PORT)
    }
}
