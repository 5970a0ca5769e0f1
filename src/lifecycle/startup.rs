//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration, then apply CLI overrides
//! - Bind the listener once everything else is ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use tokio::net::TcpListener;

use crate::config::{load_config, validate_config, ConfigError, ProxyConfig};

/// Resolve the effective configuration.
///
/// Without a path the built-in defaults are used. `host` and `port` replace
/// the matching half of `listener.bind_address`.
pub fn prepare_config(
    path: Option<&Path>,
    host: Option<IpAddr>,
    port: Option<u16>,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    if host.is_some() || port.is_some() {
        // Validated above (or a default), so it parses.
        let mut addr: SocketAddr = config
            .listener
            .bind_address
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8080)));
        if let Some(host) = host {
            addr.set_ip(host);
        }
        if let Some(port) = port {
            addr.set_port(port);
        }
        config.listener.bind_address = addr.to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Bind the inbound listener.
pub async fn bind(config: &ProxyConfig) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}
