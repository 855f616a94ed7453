//! minircd - a small IRC-style chat server.
//!
//! One tokio task per client connection, one shared registry of sessions
//! and channels, and a table of command handlers.

mod config;
mod error;
mod handlers;
mod http;
mod metrics;
mod motd;
mod network;
mod replies;
mod state;

use crate::config::Config;
use crate::handlers::Registry;
use crate::motd::Motd;
use crate::network::Gateway;
use crate::state::{Matrix, ServerInfo};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("MINIRCD_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = if Path::new(&config_path).exists() {
        Config::load(&config_path).map_err(|e| {
            error!(path = %config_path, error = %e, "Failed to load config");
            e
        })?
    } else {
        warn!(path = %config_path, "Config file not found, using defaults");
        Config::default()
    };

    info!(
        server = %config.server.name,
        version = %config.server.version,
        "Starting minircd"
    );

    metrics::init();
    if config.metrics.port != 0 {
        tokio::spawn(http::run_http_server(config.metrics.port));
    }

    let motd = Motd::load(&config.motd.file);
    let matrix = Arc::new(Matrix::new(
        ServerInfo::from_config(&config.server),
        motd,
        config.limits.send_timeout(),
    ));
    let registry = Arc::new(Registry::new());

    let gateway = Gateway::bind(&config, matrix, registry).await?;
    info!(address = %gateway.local_addr()?, "Accepting connections");
    gateway.run().await?;

    info!("Server stopped");
    Ok(())
}
