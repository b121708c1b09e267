//! Domain types for a measurement session.

mod clock;
mod options;
mod output;
mod readiness;
mod result;
mod server;

pub use clock::{Clock, Timestamp};
pub use options::{DEFAULT_COMMAND, DEFAULT_URL, DEFAULT_WAIT_FOR, LogLevel, Options};
pub use output::{OutputLine, StreamKind};
pub use readiness::ReadinessPattern;
pub use result::{MeasurementResult, ReloadTimings};
pub use server::{ExitInfo, ServerState};
