//! Standalone service registry server.
//!
//! ```text
//! svc-registry                              # 127.0.0.1:3000
//! svc-registry --config registry.yaml       # YAML configuration
//! svc-registry --port 4100 --debug          # CLI overrides
//! svc-registry --unix-socket /tmp/reg.sock  # Unix socket (Unix only)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

use svc_registry::{RegistryConfig, RegistryServer};

/// In-memory service registry with dependency notifications
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Unix domain socket to listen on instead of TCP (overrides config)
    #[cfg(unix)]
    #[arg(long, value_name = "PATH")]
    unix_socket: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;

    initialize_logging(if args.debug { "debug" } else { config.log_level.as_str() });

    info!("Service registry starting...");
    if let Some(path) = &args.config {
        info!("Config file: {}", path.display());
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        signal_token.cancel();
    });

    let server = RegistryServer::new(&config);
    info!("Press Ctrl+C to stop");

    server
        .run(shutdown)
        .await
        .context("Registry server failed")?;

    info!("Shutting down registry service.");
    Ok(())
}

fn load_config(args: &Args) -> Result<RegistryConfig> {
    let mut config = match &args.config {
        Some(path) => RegistryConfig::load_from_file(path)?,
        None => RegistryConfig::default(),
    };

    if let Some(host) = &args.host {
        config.listen.host = host.clone();
    }
    if let Some(port) = args.port {
        config.listen.port = port;
    }
    #[cfg(unix)]
    if let Some(path) = &args.unix_socket {
        config.listen.unix_socket = Some(path.clone());
    }

    config.validate()?;
    Ok(config)
}

fn initialize_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    #[cfg(unix)]
    {
        let (mut sigterm, mut sigint) = match (
            signal::unix::signal(signal::unix::SignalKind::terminate()),
            signal::unix::signal(signal::unix::SignalKind::interrupt()),
        ) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            _ => {
                tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C");
                let _ = signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM signal");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT signal");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
        info!("Received Ctrl+C signal");
    }
}
