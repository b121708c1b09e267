//! Lifecycle state and exit information of the supervised server.

use std::fmt;

/// Conventional exit code of a shell whose child died from SIGTERM (128 + 15).
const SIGTERM_EXIT_CODE: i32 = 143;
const SIGTERM: i32 = 15;
const SIGKILL: i32 = 9;

/// Lifecycle of a server process. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServerState {
    Starting,
    Ready,
    Terminating,
    Terminated,
}

impl ServerState {
    /// Whether moving from `self` to `next` respects the forward-only order.
    pub fn can_advance_to(self, next: Self) -> bool {
        next > self
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Terminating => "terminating",
            Self::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// How the server process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Terminating signal number, if the process was killed by a signal.
    pub signal: Option<i32>,
}

impl ExitInfo {
    pub const fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub const fn from_signal(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    /// Exits caused by our own SIGTERM/SIGKILL, including a shell reporting
    /// 143 for a child it lost to SIGTERM.
    pub const fn is_expected_termination(&self) -> bool {
        matches!(self.signal, Some(SIGTERM | SIGKILL))
            || matches!(self.code, Some(SIGTERM_EXIT_CODE))
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(signal)) => write!(f, "signal {signal}"),
            (None, None) => f.write_str("unknown exit status"),
        }
    }
}
