//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, MotdConfig, MetricsConfig)
//! - [`listen`]: Network listener configuration (ListenConfig)
//! - [`limits`]: Per-connection limits (LimitsConfig)
//! - [`defaults`]: serde default functions

mod defaults;
mod limits;
mod listen;
mod types;

pub use types::{Config, ServerConfig};
