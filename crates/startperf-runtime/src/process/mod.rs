//! Process supervision infrastructure for the dev server.
//!
//! # Structure
//!
//! - `ProcessSupervisor` / `ServerProcess` - Spawning into a process group and teardown
//! - `OutputWatcher` - Readiness detection over merged stdout/stderr
//! - `ProcessGroup` / `SignalSender` - Group signaling with leader fallback
//! - `terminate_group` - SIGTERM → SIGKILL escalation ladder
//! - `strip_ansi` - Line normalization before matching

mod ansi;
mod group;
pub mod shutdown;
mod sink;
mod stream;
mod supervisor;
mod watcher;

// Re-export commonly used types
pub use ansi::strip_ansi;
pub use group::{Delivery, NixSignals, ProcessGroup, SignalSender, TerminationSignal};
pub use shutdown::{EscalationPolicy, ShutdownOutcome, terminate_group};
pub use sink::NoopOutputSink;
pub use supervisor::{ProcessSupervisor, ServerProcess};
pub use watcher::OutputWatcher;
