//! Prometheus metrics collection for minircd.
//!
//! Metrics are process-wide and optional: until [`init`] runs every
//! recording helper is a no-op, which keeps unit tests free of global state.

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Total messages queued to sessions other than the sender.
pub static MESSAGES_SENT: OnceLock<IntCounter> = OnceLock::new();

/// Deliveries that failed because the recipient was closed or stalled.
pub static DELIVERY_FAILURES: OnceLock<IntCounter> = OnceLock::new();

/// Commands processed by type.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command errors by type and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Currently connected sessions, registered or not.
pub static CONNECTED_USERS: OnceLock<IntGauge> = OnceLock::new();

/// Channels with at least one member.
pub static ACTIVE_CHANNELS: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at server startup. Registration failures are logged and the
/// affected metric stays disabled.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(MESSAGES_SENT, IntCounter::new("irc_messages_sent_total", "Total messages sent"));
    register!(DELIVERY_FAILURES, IntCounter::new("irc_delivery_failures_total", "Deliveries to closed or stalled sessions"));
    register!(CONNECTED_USERS, IntGauge::new("irc_connected_users", "Currently connected users"));
    register!(ACTIVE_CHANNELS, IntGauge::new("irc_active_channels", "Active channels"));
    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("irc_command_total", "Commands processed by type"), &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("irc_command_errors_total", "Command errors by type"), &["command", "error"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

#[inline]
pub fn inc_messages_sent() {
    if let Some(c) = MESSAGES_SENT.get() {
        c.inc();
    }
}

#[inline]
pub fn inc_delivery_failures() {
    if let Some(c) = DELIVERY_FAILURES.get() {
        c.inc();
    }
}

#[inline]
pub fn set_connected_users(count: usize) {
    if let Some(g) = CONNECTED_USERS.get() {
        g.set(count as i64);
    }
}

#[inline]
pub fn set_active_channels(count: usize) {
    if let Some(g) = ACTIVE_CHANNELS.get() {
        g.set(count as i64);
    }
}

/// Record a command execution.
#[inline]
pub fn record_command(command: &str) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}
