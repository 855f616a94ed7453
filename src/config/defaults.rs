//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::SocketAddr;

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "irc.localhost".to_string()
}

pub fn default_description() -> String {
    "minircd chat server".to_string()
}

pub fn default_version() -> String {
    format!("minircd-{}", env!("CARGO_PKG_VERSION"))
}

/// Keepalive PING interval in seconds; 0 disables it.
pub fn default_ping_interval() -> u64 {
    0
}

// =============================================================================
// Listen Defaults
// =============================================================================

pub fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 6667))
}

// =============================================================================
// MOTD Defaults
// =============================================================================

pub fn default_motd_file() -> String {
    "motd.txt".to_string()
}

// =============================================================================
// Limits Defaults
// =============================================================================

pub fn default_max_line_len() -> usize {
    minirc_proto::MAX_LINE_LEN
}

pub fn default_send_queue() -> usize {
    256
}

pub fn default_send_timeout() -> u64 {
    10
}
