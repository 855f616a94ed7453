//! Per-connection limits.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{default_max_line_len, default_send_queue, default_send_timeout};

/// Limits applied to every connection.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Longest accepted inbound line in bytes; longer lines are truncated.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Capacity of each session's outbound queue.
    #[serde(default = "default_send_queue")]
    pub send_queue: usize,
    /// Seconds a delivery may wait on a full outbound queue before it is
    /// counted as failed.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

impl LimitsConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs.max(1))
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
            send_queue: default_send_queue(),
            send_timeout_secs: default_send_timeout(),
        }
    }
}
