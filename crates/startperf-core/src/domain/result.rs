//! Assembled measurement result.

use std::time::Duration;

use super::Timestamp;

/// Timestamps of the hot-reload measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadTimings {
    /// Just before the sentinel write.
    pub at_file_change: Timestamp,
    /// Just after the sentinel write.
    pub at_file_changed: Timestamp,
    /// Network went idle again after the write.
    pub at_reload_complete: Timestamp,
}

impl ReloadTimings {
    /// Time from the completed write to the reload settling.
    pub fn reload_duration(&self) -> Duration {
        self.at_reload_complete.since(self.at_file_changed)
    }
}

/// Every timestamp recorded during one run, all on the same clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementResult {
    pub at_start: Timestamp,
    pub at_server_up: Timestamp,
    pub at_first_paint: Timestamp,
    pub at_app_load: Timestamp,
    /// Present only when a reload file was supplied and found.
    pub reload: Option<ReloadTimings>,
}

impl MeasurementResult {
    pub fn server_ready_duration(&self) -> Duration {
        self.at_server_up.since(self.at_start)
    }

    pub fn first_paint_duration(&self) -> Duration {
        self.at_first_paint.since(self.at_start)
    }

    pub fn app_load_duration(&self) -> Duration {
        self.at_app_load.since(self.at_start)
    }

    pub fn reload_duration(&self) -> Option<Duration> {
        self.reload.as_ref().map(ReloadTimings::reload_duration)
    }
}
