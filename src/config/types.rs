//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_description, default_motd_file, default_ping_interval, default_server_name,
    default_version,
};
use super::limits::LimitsConfig;
use super::listen::ListenConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
///
/// Every section is optional; an empty file yields a working local server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity.
    #[serde(default)]
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Message of the day source.
    #[serde(default)]
    pub motd: MotdConfig,
    /// Per-connection limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Prometheus endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server hostname used as the prefix of every server reply.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Free-form description shown in WHOIS.
    #[serde(default = "default_description")]
    pub description: String,
    /// Version string reported in the registration burst.
    #[serde(default = "default_version")]
    pub version: String,
    /// Seconds of inactivity before the server sends a keepalive PING.
    /// 0 disables keepalives. No timeout is enforced either way.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,
}

impl ServerConfig {
    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_secs > 0).then(|| Duration::from_secs(self.ping_interval_secs))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            description: default_description(),
            version: default_version(),
            ping_interval_secs: default_ping_interval(),
        }
    }
}

/// Message of the day configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MotdConfig {
    /// Path to the MOTD text file, read once at startup.
    #[serde(default = "default_motd_file")]
    pub file: String,
}

impl Default for MotdConfig {
    fn default() -> Self {
        Self {
            file: default_motd_file(),
        }
    }
}

/// Prometheus metrics endpoint configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Port for the `/metrics` HTTP endpoint. 0 or absent disables it.
    #[serde(default)]
    pub port: u16,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
