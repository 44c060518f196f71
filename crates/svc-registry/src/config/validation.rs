use super::*;
use anyhow::{anyhow, Result};

/// Validate the complete configuration
pub fn validate_config(config: &RegistryConfig) -> Result<()> {
    validate_listen_config(&config.listen)?;
    validate_delivery_config(&config.delivery)?;
    validate_log_level(&config.log_level)
}

fn validate_listen_config(listen: &ListenConfig) -> Result<()> {
    if listen.unix_socket.is_none() && listen.host.trim().is_empty() {
        return Err(anyhow!("Listen host cannot be empty"));
    }

    #[cfg(not(unix))]
    if listen.unix_socket.is_some() {
        return Err(anyhow!("Unix sockets are not supported on this platform"));
    }

    Ok(())
}

fn validate_delivery_config(delivery: &DeliveryConfig) -> Result<()> {
    if delivery.timeout.is_zero() {
        return Err(anyhow!("Delivery timeout must be greater than 0"));
    }

    if delivery.max_in_flight == 0 {
        return Err(anyhow!("Delivery max_in_flight must be greater than 0"));
    }

    Ok(())
}

fn validate_log_level(level: &str) -> Result<()> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(anyhow!("Invalid log level: {}, must be one of: trace, debug, info, warn, error", level))
    }
}
