//! Readiness detection over the merged output of a server process.
//!
//! Both reader tasks push into a single channel, so the watcher sees one
//! ordered sequence of lines regardless of which stream produced them. The
//! first matching line resolves the wait; everything after it is left to the
//! passthrough sink.

use std::sync::Arc;
use std::time::Duration;

use startperf_core::{ExitInfo, MeasureError, OutputLine, OutputSinkPort, ReadinessPattern};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use super::ansi::strip_ansi;
use super::sink::NoopOutputSink;

/// Consumes a server's output lines and exit notifications to decide readiness.
pub struct OutputWatcher {
    lines: mpsc::UnboundedReceiver<OutputLine>,
    exit: watch::Receiver<Option<ExitInfo>>,
    status: Arc<dyn OutputSinkPort>,
}

impl OutputWatcher {
    pub fn new(
        lines: mpsc::UnboundedReceiver<OutputLine>,
        exit: watch::Receiver<Option<ExitInfo>>,
    ) -> Self {
        Self {
            lines,
            exit,
            status: Arc::new(NoopOutputSink),
        }
    }

    /// Announce readiness on `sink`.
    #[must_use]
    pub fn with_status(mut self, sink: Arc<dyn OutputSinkPort>) -> Self {
        self.status = sink;
        self
    }

    fn announce_ready(&self, line: &OutputLine, pattern: &ReadinessPattern) {
        debug!(stream = %line.stream, "readiness line matched");
        self.status.status(&format!("Server ready at {pattern}"));
    }

    /// Wait for the first line containing `pattern`, stripped of ANSI escapes.
    ///
    /// # Errors
    ///
    /// - [`MeasureError::ServerStartTimeout`] if `timeout` elapses first
    /// - [`MeasureError::ServerCrash`] if the process exits abnormally before
    ///   any matching line. Exits caused by SIGTERM/SIGKILL (or code 143) are
    ///   not crashes; the wait then runs until the deadline.
    pub async fn await_pattern(
        &mut self,
        pattern: &ReadinessPattern,
        timeout: Duration,
    ) -> Result<OutputLine, MeasureError> {
        let deadline = sleep_until(Instant::now() + timeout);
        tokio::pin!(deadline);

        let mut streams_open = true;
        let mut exit_pending = true;

        loop {
            tokio::select! {
                biased;

                line = self.lines.recv(), if streams_open => match line {
                    Some(line) => {
                        if pattern.matches(&strip_ansi(&line.text)) {
                            self.announce_ready(&line, pattern);
                            return Ok(line);
                        }
                    }
                    None => {
                        debug!("server output streams closed");
                        streams_open = false;
                    }
                },

                changed = self.exit.changed(), if exit_pending => {
                    exit_pending = false;
                    if changed.is_err() {
                        continue;
                    }
                    let Some(exit) = *self.exit.borrow_and_update() else {
                        exit_pending = true;
                        continue;
                    };

                    // Lines written just before exit may still be queued
                    if let Some(line) = self.drain_for(pattern) {
                        self.announce_ready(&line, pattern);
                        return Ok(line);
                    }

                    if exit.is_expected_termination() {
                        debug!(%exit, "server terminated by signal while waiting for readiness");
                    } else {
                        return Err(MeasureError::ServerCrash { exit });
                    }
                },

                () = &mut deadline => {
                    return Err(MeasureError::ServerStartTimeout {
                        pattern: pattern.to_string(),
                        timeout,
                    });
                }
            }
        }
    }

    fn drain_for(&mut self, pattern: &ReadinessPattern) -> Option<OutputLine> {
        while let Ok(line) = self.lines.try_recv() {
            if pattern.matches(&strip_ansi(&line.text)) {
                return Some(line);
            }
        }
        None
    }
}
