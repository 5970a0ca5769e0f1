//! QQ OAuth proxy.
//!
//! Re-exposes the QQ Connect OAuth endpoints as a standards-shaped OAuth
//! surface: Bearer token types, merged error strings and a `/me` identity
//! endpoint.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 OAUTH PROXY                  │
//!   Client Request    │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   ──────────────────┼─▶│  http  │──▶│  oauth   │──▶│  upstream  │──┼──▶ graph.qq.com
//!                     │  │ server │   │ handlers │   │   client   │  │
//!   Client Response   │  └────────┘   └────┬─────┘   └────────────┘  │
//!   ◀─────────────────┼──── reshape ───────┤                         │
//!                     │                    ▼                         │
//!                     │              ┌──────────┐                    │
//!                     │              │ registry │ token → client id  │
//!                     │              └──────────┘                    │
//!                     │   config · observability · lifecycle         │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use qq_oauth_proxy::http::HttpServer;
use qq_oauth_proxy::lifecycle::{startup, Shutdown};
use qq_oauth_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "qq-oauth-proxy")]
#[command(about = "Standards-shaped OAuth front for QQ Connect", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overriding the configuration.
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to bind, overriding the configuration.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = startup::prepare_config(cli.config.as_deref(), cli.host, cli.port)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("qq-oauth-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Checked by validation.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let server = HttpServer::new(config)?;
    let listener = startup::bind(server.config()).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
