//! Timing constants for every bounded wait in a measurement.

use std::time::Duration;

/// Deadlines and quiescence windows used across the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// How long to wait for the readiness line.
    pub server_start: Duration,
    /// Initial navigation deadline.
    pub page_load: Duration,
    /// Grace period between SIGTERM and SIGKILL.
    pub server_shutdown: Duration,
    /// How long to keep waiting for an exit after SIGKILL.
    pub kill_wait: Duration,
    /// Pause after an observed exit so the OS can finish cleaning up.
    pub settle: Duration,
    /// Window without network activity that counts as idle.
    pub network_idle: Duration,
    /// Upper bound for any single network-idle wait.
    pub network_idle_max: Duration,
    /// Upper bound for the selector to become visible.
    pub selector: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            server_start: Duration::from_secs(30),
            page_load: Duration::from_secs(30),
            server_shutdown: Duration::from_secs(3),
            kill_wait: Duration::from_secs(1),
            settle: Duration::from_millis(100),
            network_idle: Duration::from_millis(500),
            network_idle_max: Duration::from_secs(30),
            selector: Duration::from_secs(60),
        }
    }
}
