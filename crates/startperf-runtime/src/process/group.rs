//! Process-group signaling with a direct-pid fallback.
//!
//! The dev server runs as the leader of its own process group, so the group
//! id equals the leader's pid. Signaling the group reaches every worker the
//! command forked; if that fails (already reaped, permissions), the leader is
//! signaled directly.

use std::fmt;
use std::io;
use std::sync::Arc;

use tracing::debug;

/// Signals used to stop a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    /// SIGTERM
    Terminate,
    /// SIGKILL
    Kill,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Terminate => "SIGTERM",
            Self::Kill => "SIGKILL",
        })
    }
}

/// OS binding for delivering signals.
pub trait SignalSender: Send + Sync {
    /// Signal every process in group `pgid`.
    fn signal_group(&self, pgid: u32, signal: TerminationSignal) -> io::Result<()>;

    /// Signal the single process `pid`.
    fn signal_process(&self, pid: u32, signal: TerminationSignal) -> io::Result<()>;
}

/// Where a signal ended up.
#[derive(Debug)]
pub enum Delivery {
    Group,
    Leader,
    Failed(io::Error),
}

/// A process group identified by its leader.
#[derive(Clone)]
pub struct ProcessGroup {
    leader: u32,
    signals: Arc<dyn SignalSender>,
}

impl ProcessGroup {
    pub fn new(leader: u32, signals: Arc<dyn SignalSender>) -> Self {
        Self { leader, signals }
    }

    /// Group id, which is the leader's pid.
    pub const fn id(&self) -> u32 {
        self.leader
    }

    pub const fn leader(&self) -> u32 {
        self.leader
    }

    /// Deliver `signal` to the group, falling back to the leader alone.
    pub fn deliver(&self, signal: TerminationSignal) -> Delivery {
        match self.signals.signal_group(self.leader, signal) {
            Ok(()) => Delivery::Group,
            Err(group_err) => {
                debug!(pgid = self.leader, %signal, error = %group_err, "group signal failed, signaling leader");
                match self.signals.signal_process(self.leader, signal) {
                    Ok(()) => Delivery::Leader,
                    Err(e) => Delivery::Failed(e),
                }
            }
        }
    }
}

impl fmt::Debug for ProcessGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessGroup")
            .field("leader", &self.leader)
            .finish_non_exhaustive()
    }
}

/// Signal delivery through `nix`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NixSignals;

#[cfg(unix)]
mod unix {
    use std::io;

    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    use super::{NixSignals, SignalSender, TerminationSignal};

    const fn to_nix(signal: TerminationSignal) -> Signal {
        match signal {
            TerminationSignal::Terminate => Signal::SIGTERM,
            TerminationSignal::Kill => Signal::SIGKILL,
        }
    }

    fn to_pid(raw: u32) -> io::Result<Pid> {
        i32::try_from(raw)
            .map(Pid::from_raw)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("pid {raw} out of range")))
    }

    impl SignalSender for NixSignals {
        fn signal_group(&self, pgid: u32, signal: TerminationSignal) -> io::Result<()> {
            signal::killpg(to_pid(pgid)?, to_nix(signal)).map_err(io::Error::other)
        }

        fn signal_process(&self, pid: u32, signal: TerminationSignal) -> io::Result<()> {
            signal::kill(to_pid(pid)?, to_nix(signal)).map_err(io::Error::other)
        }
    }
}

#[cfg(not(unix))]
impl SignalSender for NixSignals {
    fn signal_group(&self, _pgid: u32, _signal: TerminationSignal) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "process groups are only supported on Unix",
        ))
    }

    fn signal_process(&self, _pid: u32, _signal: TerminationSignal) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "signals are only supported on Unix",
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records deliveries; can be told to fail group or direct signals.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSignals {
        fail_group: bool,
        fail_process: bool,
        sent: Mutex<Vec<(&'static str, u32, TerminationSignal)>>,
    }

    impl RecordingSignals {
        /// Group delivery fails, direct delivery succeeds.
        pub(crate) fn failing_group() -> Self {
            Self {
                fail_group: true,
                ..Self::default()
            }
        }

        /// Every delivery fails.
        pub(crate) fn failing_all() -> Self {
            Self {
                fail_group: true,
                fail_process: true,
                ..Self::default()
            }
        }

        pub(crate) fn sent(&self) -> Vec<(&'static str, u32, TerminationSignal)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl SignalSender for RecordingSignals {
        fn signal_group(&self, pgid: u32, signal: TerminationSignal) -> io::Result<()> {
            self.sent.lock().unwrap().push(("group", pgid, signal));
            if self.fail_group {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            } else {
                Ok(())
            }
        }

        fn signal_process(&self, pid: u32, signal: TerminationSignal) -> io::Result<()> {
            self.sent.lock().unwrap().push(("process", pid, signal));
            if self.fail_process {
                Err(io::Error::from(io::ErrorKind::NotFound))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn group_signal_is_preferred() {
        let signals = Arc::new(RecordingSignals::default());
        let group = ProcessGroup::new(4242, signals.clone());

        assert!(matches!(group.deliver(TerminationSignal::Terminate), Delivery::Group));
        assert_eq!(signals.sent(), vec![("group", 4242, TerminationSignal::Terminate)]);
    }

    #[test]
    fn falls_back_to_leader() {
        let signals = Arc::new(RecordingSignals::failing_group());
        let group = ProcessGroup::new(4242, signals.clone());

        assert!(matches!(group.deliver(TerminationSignal::Kill), Delivery::Leader));
        assert_eq!(
            signals.sent(),
            vec![
                ("group", 4242, TerminationSignal::Kill),
                ("process", 4242, TerminationSignal::Kill)
            ]
        );
    }

    #[test]
    fn reports_total_failure() {
        let signals = Arc::new(RecordingSignals::failing_all());
        let group = ProcessGroup::new(1, signals);
        assert!(matches!(
            group.deliver(TerminationSignal::Terminate),
            Delivery::Failed(_)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nix_signals_reach_a_real_group() {
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .process_group(0)
            .spawn()
            .expect("failed to spawn sleep");
        let pid = child.id().expect("no PID");

        let group = ProcessGroup::new(pid, Arc::new(NixSignals));
        assert!(matches!(group.deliver(TerminationSignal::Terminate), Delivery::Group));

        let status = child.wait().await.unwrap();
        assert!(!status.success());
    }
}
