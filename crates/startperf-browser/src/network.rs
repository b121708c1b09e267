//! Network idle detection from request lifecycle events.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

/// Requests currently in flight and the time of the last change.
#[derive(Debug)]
pub struct NetworkActivity {
    in_flight: HashSet<String>,
    last_change: Instant,
}

impl NetworkActivity {
    pub fn new(now: Instant) -> Self {
        Self {
            in_flight: HashSet::new(),
            last_change: now,
        }
    }

    pub fn request_started(&mut self, id: &str, now: Instant) {
        self.in_flight.insert(id.to_string());
        self.last_change = now;
    }

    /// Finished or failed. Unknown ids are ignored.
    pub fn request_settled(&mut self, id: &str, now: Instant) {
        if self.in_flight.remove(id) {
            self.last_change = now;
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// True once nothing has been in flight for `window`, counting from
    /// whichever is later: the last change or `since`.
    ///
    /// Measuring from `since` means a network that was already quiet still
    /// has to stay quiet for a full window after the wait begins.
    pub fn is_idle(&self, since: Instant, window: Duration, now: Instant) -> bool {
        self.in_flight.is_empty() && now.saturating_duration_since(self.last_change.max(since)) >= window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    #[test]
    fn idle_after_quiet_window() {
        let t0 = Instant::now();
        let mut net = NetworkActivity::new(t0);
        net.request_started("1", ms(t0, 0));
        net.request_started("2", ms(t0, 10));
        net.request_settled("1", ms(t0, 100));
        assert!(!net.is_idle(t0, WINDOW, ms(t0, 900)));

        net.request_settled("2", ms(t0, 200));
        assert!(!net.is_idle(t0, WINDOW, ms(t0, 699)));
        assert!(net.is_idle(t0, WINDOW, ms(t0, 700)));
    }

    #[test]
    fn quiet_network_still_waits_full_window_from_start() {
        let t0 = Instant::now();
        let net = NetworkActivity::new(t0);
        let since = ms(t0, 10_000);
        assert!(!net.is_idle(since, WINDOW, ms(t0, 10_100)));
        assert!(net.is_idle(since, WINDOW, ms(t0, 10_500)));
    }

    #[test]
    fn unknown_completion_does_not_reset_window() {
        let t0 = Instant::now();
        let mut net = NetworkActivity::new(t0);
        net.request_settled("ghost", ms(t0, 400));
        assert_eq!(net.in_flight(), 0);
        assert!(net.is_idle(t0, WINDOW, ms(t0, 500)));
    }
}
