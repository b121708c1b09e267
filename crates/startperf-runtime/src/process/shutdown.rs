//! Graceful group shutdown with SIGTERM → SIGKILL escalation.
//!
//! # Strategy
//! 1. Send SIGTERM to the group (leader fallback) and wait up to the grace period
//! 2. If no exit was observed, send SIGKILL the same way
//! 3. Wait briefly for the exit to be reported
//! 4. Pause for the settle delay so the OS can finish tearing down the group
//!
//! Nothing here returns an error: delivery failures are logged and the ladder
//! continues, because teardown must not become a new failure source.

use std::time::Duration;

use startperf_core::{ExitInfo, Timeouts};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use super::group::{Delivery, ProcessGroup, TerminationSignal};

/// Timings of the two-tier escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    /// Wait between SIGTERM and SIGKILL.
    pub grace: Duration,
    /// Wait for an exit report after SIGKILL.
    pub kill_wait: Duration,
    /// Pause after an observed exit.
    pub settle: Duration,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::from(&Timeouts::default())
    }
}

impl From<&Timeouts> for EscalationPolicy {
    fn from(timeouts: &Timeouts) -> Self {
        Self {
            grace: timeouts.server_shutdown,
            kill_wait: timeouts.kill_wait,
            settle: timeouts.settle,
        }
    }
}

/// How a shutdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The leader had already exited; the group got one SIGTERM for stragglers.
    AlreadyExited(ExitInfo),
    /// Exited within the grace period after SIGTERM.
    Graceful(ExitInfo),
    /// Exited after SIGKILL.
    Forced(ExitInfo),
    /// No exit was reported even after SIGKILL.
    Unconfirmed,
}

/// Stop a process group, observing exits through `exit`.
pub async fn terminate_group(
    group: &ProcessGroup,
    exit: &mut watch::Receiver<Option<ExitInfo>>,
    policy: &EscalationPolicy,
) -> ShutdownOutcome {
    let already = *exit.borrow();
    if let Some(info) = already {
        // Forked workers can outlive the shell that started them
        let _ = group.deliver(TerminationSignal::Terminate);
        sleep(policy.settle).await;
        return ShutdownOutcome::AlreadyExited(info);
    }

    send(group, TerminationSignal::Terminate);
    if let Some(info) = wait_for_exit(exit, policy.grace).await {
        sleep(policy.settle).await;
        return ShutdownOutcome::Graceful(info);
    }

    warn!(pgid = group.id(), "Force killing server process group...");
    send(group, TerminationSignal::Kill);
    if let Some(info) = wait_for_exit(exit, policy.kill_wait).await {
        sleep(policy.settle).await;
        return ShutdownOutcome::Forced(info);
    }

    ShutdownOutcome::Unconfirmed
}

fn send(group: &ProcessGroup, signal: TerminationSignal) {
    match group.deliver(signal) {
        Delivery::Group => debug!(pgid = group.id(), %signal, "signaled process group"),
        Delivery::Leader => debug!(pid = group.leader(), %signal, "signaled group leader"),
        Delivery::Failed(e) => {
            warn!(pid = group.leader(), %signal, error = %e, "Error terminating server");
        }
    }
}

async fn wait_for_exit(
    exit: &mut watch::Receiver<Option<ExitInfo>>,
    limit: Duration,
) -> Option<ExitInfo> {
    match timeout(limit, exit.wait_for(Option::is_some)).await {
        Ok(Ok(info)) => *info,
        // Reaper gone without reporting: nothing left to wait on
        Ok(Err(_)) | Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::process::group::tests::RecordingSignals;
    use tokio::time::Instant;

    fn policy() -> EscalationPolicy {
        EscalationPolicy {
            grace: Duration::from_secs(3),
            kill_wait: Duration::from_secs(1),
            settle: Duration::from_millis(100),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_exit_skips_sigkill() {
        let signals = Arc::new(RecordingSignals::default());
        let group = ProcessGroup::new(100, signals.clone());
        let (tx, mut rx) = watch::channel(None);

        tokio::spawn(async move {
            sleep(Duration::from_millis(500)).await;
            tx.send_replace(Some(ExitInfo::from_signal(15)));
            tx
        });

        let started = Instant::now();
        let outcome = terminate_group(&group, &mut rx, &policy()).await;

        assert_eq!(outcome, ShutdownOutcome::Graceful(ExitInfo::from_signal(15)));
        assert_eq!(started.elapsed(), Duration::from_millis(600));
        assert_eq!(signals.sent(), vec![("group", 100, TerminationSignal::Terminate)]);
    }

    #[tokio::test(start_paused = true)]
    async fn escalates_after_grace() {
        let signals = Arc::new(RecordingSignals::default());
        let group = ProcessGroup::new(100, signals.clone());
        let (tx, mut rx) = watch::channel(None);

        tokio::spawn(async move {
            sleep(Duration::from_millis(3200)).await;
            tx.send_replace(Some(ExitInfo::from_signal(9)));
            tx
        });

        let outcome = terminate_group(&group, &mut rx, &policy()).await;

        assert_eq!(outcome, ShutdownOutcome::Forced(ExitInfo::from_signal(9)));
        assert_eq!(
            signals.sent(),
            vec![
                ("group", 100, TerminationSignal::Terminate),
                ("group", 100, TerminationSignal::Kill)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn same_ladder_on_leader_when_group_fails() {
        let signals = Arc::new(RecordingSignals::failing_group());
        let group = ProcessGroup::new(7, signals.clone());
        let (_tx, mut rx) = watch::channel(None);

        let outcome = terminate_group(&group, &mut rx, &policy()).await;

        assert_eq!(outcome, ShutdownOutcome::Unconfirmed);
        let direct: Vec<_> = signals
            .sent()
            .into_iter()
            .filter(|(target, _, _)| *target == "process")
            .map(|(_, _, signal)| signal)
            .collect();
        assert_eq!(direct, vec![TerminationSignal::Terminate, TerminationSignal::Kill]);
    }

    #[tokio::test(start_paused = true)]
    async fn already_exited_leader_sends_one_sweep() {
        let signals = Arc::new(RecordingSignals::default());
        let group = ProcessGroup::new(5, signals.clone());
        let (_tx, mut rx) = watch::channel(Some(ExitInfo::from_code(0)));

        let outcome = terminate_group(&group, &mut rx, &policy()).await;

        assert_eq!(outcome, ShutdownOutcome::AlreadyExited(ExitInfo::from_code(0)));
        assert_eq!(signals.sent().len(), 1);
    }
}
