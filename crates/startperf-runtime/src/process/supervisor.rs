//! Dev server lifecycle: spawn into a dedicated process group, stream output,
//! and tear the whole group down.
//!
//! The supervisor only knows how to start and stop a shell command. Readiness
//! is decided by the [`OutputWatcher`] returned from [`ProcessSupervisor::start`].

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use startperf_core::{ExitInfo, MeasureError, OutputSinkPort, ServerState, StreamKind};
use tokio::process::Command;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::group::{NixSignals, ProcessGroup, SignalSender, TerminationSignal};
use super::shutdown::{EscalationPolicy, ShutdownOutcome, terminate_group};
use super::stream::spawn_stream_reader;
use super::watcher::OutputWatcher;

/// Spawns dev server commands and owns their termination policy.
pub struct ProcessSupervisor {
    sink: Arc<dyn OutputSinkPort>,
    signals: Arc<dyn SignalSender>,
    policy: EscalationPolicy,
}

impl ProcessSupervisor {
    /// Create a supervisor that echoes server output to `sink`.
    pub fn new(sink: Arc<dyn OutputSinkPort>) -> Self {
        Self {
            sink,
            signals: Arc::new(NixSignals),
            policy: EscalationPolicy::default(),
        }
    }

    /// Override the SIGTERM → SIGKILL timings.
    #[must_use]
    pub const fn with_policy(mut self, policy: EscalationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the OS signal binding.
    #[must_use]
    pub fn with_signals(mut self, signals: Arc<dyn SignalSender>) -> Self {
        self.signals = signals;
        self
    }

    /// Run `command` through `sh -c` in the current directory, as the leader
    /// of a new process group.
    ///
    /// Returns the process handle and a watcher over its merged output.
    pub fn start(&self, command: &str) -> Result<(ServerProcess, OutputWatcher), MeasureError> {
        self.sink.status(&format!("Starting dev server with: {command}"));

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| MeasureError::ServerSpawn {
            command: command.to_string(),
            source,
        })?;

        let pid = child.id().ok_or_else(|| MeasureError::ServerSpawn {
            command: command.to_string(),
            source: std::io::Error::other("child exited before its PID was read"),
        })?;
        debug!(pid, "dev server spawned");

        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_stream_reader(
                stdout,
                StreamKind::Stdout,
                Arc::clone(&self.sink),
                line_tx.clone(),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_stream_reader(
                stderr,
                StreamKind::Stderr,
                Arc::clone(&self.sink),
                line_tx,
            ));
        }

        let (exit_tx, exit_rx) = watch::channel(None);
        let reaper = tokio::spawn(async move {
            let info = match child.wait().await {
                Ok(status) => exit_info(status),
                Err(e) => {
                    warn!(pid, error = %e, "failed to wait on dev server");
                    ExitInfo {
                        code: None,
                        signal: None,
                    }
                }
            };
            debug!(pid, exit = %info, "dev server exited");
            exit_tx.send_replace(Some(info));
        });

        let server = ServerProcess {
            pid,
            group: ProcessGroup::new(pid, Arc::clone(&self.signals)),
            state: ServerState::Starting,
            exit: exit_rx.clone(),
            readers,
            reaper,
            policy: self.policy,
            status: Arc::clone(&self.sink),
        };
        self.sink.status("Waiting for server to start...");
        let watcher = OutputWatcher::new(line_rx, exit_rx).with_status(Arc::clone(&self.sink));
        Ok((server, watcher))
    }
}

#[cfg(unix)]
fn exit_info(status: ExitStatus) -> ExitInfo {
    use std::os::unix::process::ExitStatusExt;
    ExitInfo {
        code: status.code(),
        signal: status.signal(),
    }
}

#[cfg(not(unix))]
fn exit_info(status: ExitStatus) -> ExitInfo {
    ExitInfo {
        code: status.code(),
        signal: None,
    }
}

/// A running (or finished) dev server and its process group.
pub struct ServerProcess {
    pid: u32,
    group: ProcessGroup,
    state: ServerState,
    exit: watch::Receiver<Option<ExitInfo>>,
    readers: Vec<JoinHandle<()>>,
    reaper: JoinHandle<()>,
    policy: EscalationPolicy,
    status: Arc<dyn OutputSinkPort>,
}

impl ServerProcess {
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    pub const fn process_group_id(&self) -> u32 {
        self.group.id()
    }

    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Exit status, once the leader has been reaped.
    pub fn exit_info(&self) -> Option<ExitInfo> {
        *self.exit.borrow()
    }

    /// Record that the readiness line was seen.
    pub fn mark_ready(&mut self) {
        self.advance(ServerState::Ready);
    }

    fn advance(&mut self, next: ServerState) {
        if self.state.can_advance_to(next) {
            debug!(pid = self.pid, from = %self.state, to = %next, "server state change");
            self.state = next;
        } else {
            debug!(pid = self.pid, from = %self.state, to = %next, "ignoring backward state change");
        }
    }

    /// Stop the whole process group. Idempotent, never fails.
    pub async fn terminate(&mut self) {
        if self.state >= ServerState::Terminating {
            return;
        }
        self.advance(ServerState::Terminating);
        debug!(pid = self.pid, "terminating process group");
        self.status.status("Terminating dev server...");

        match terminate_group(&self.group, &mut self.exit, &self.policy).await {
            ShutdownOutcome::AlreadyExited(exit) => {
                debug!(pid = self.pid, %exit, "dev server had already exited");
                self.status.status("Dev server terminated");
            }
            ShutdownOutcome::Graceful(exit) | ShutdownOutcome::Forced(exit) => {
                debug!(pid = self.pid, %exit, "dev server exit observed");
                self.status.status("Dev server terminated");
            }
            ShutdownOutcome::Unconfirmed => {
                warn!(pid = self.pid, "dev server did not report exit after SIGKILL");
                self.reaper.abort();
            }
        }

        // Orphaned grandchildren can keep the pipes open
        for reader in &self.readers {
            reader.abort();
        }
        self.advance(ServerState::Terminated);
    }
}

// Note: Drop is not async, so the escalation ladder can't run here.
// Callers should terminate() explicitly; this is a last resort.
impl Drop for ServerProcess {
    fn drop(&mut self) {
        if self.state != ServerState::Terminated && self.exit_info().is_none() {
            let _ = self.group.deliver(TerminationSignal::Kill);
        }
        for reader in &self.readers {
            reader.abort();
        }
    }
}
