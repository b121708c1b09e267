//! Error taxonomy for a measurement run.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::ExitInfo;
use crate::ports::BrowserError;

/// Everything that can end (or degrade) a measurement run.
///
/// All variants except [`MeasureError::FileNotFoundForReload`] are fatal: they
/// abort the pipeline after cleanup has run.
#[derive(Debug, Error)]
pub enum MeasureError {
    /// No output line contained the readiness pattern before the deadline.
    #[error("Server start timeout: no output containing \"{pattern}\" within {}ms", timeout.as_millis())]
    ServerStartTimeout { pattern: String, timeout: Duration },

    /// The server exited abnormally before it became ready.
    #[error("Server exited before becoming ready ({exit})")]
    ServerCrash { exit: ExitInfo },

    /// The shell could not be spawned at all.
    #[error("Failed to start dev server with `{command}`: {source}")]
    ServerSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The root navigation returned a non-success status.
    #[error("Failed to load page {url}: {status}")]
    PageLoadFailure { url: String, status: u16 },

    /// The awaited selector never became visible.
    #[error("Timed out after {}ms waiting for element: {selector}", timeout.as_millis())]
    SelectorTimeout { selector: String, timeout: Duration },

    /// The browser automation session could not be started.
    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailure(String),

    /// Any other failure reported by the browser session.
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// The reload trigger file does not exist. Non-fatal.
    #[error("File {} not found, skipping reload test", .0.display())]
    FileNotFoundForReload(PathBuf),

    /// Reading or writing the reload trigger file failed.
    #[error("Reload file error: {0}")]
    Io(#[from] std::io::Error),

    /// A second run was started while one is still active.
    #[error("A measurement is already running in this session")]
    SessionBusy,
}

impl MeasureError {
    /// Whether this error aborts the run.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::FileNotFoundForReload(_))
    }
}
