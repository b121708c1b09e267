//! Options for a single measurement session.

use std::path::PathBuf;
use std::time::Duration;

use super::ReadinessPattern;
use crate::timeouts::Timeouts;

/// Default URL the dev server is expected to announce.
pub const DEFAULT_URL: &str = "http://localhost:4200";
/// Default command used to start the dev server.
pub const DEFAULT_COMMAND: &str = "pnpm start";
/// Default selector that marks the app as loaded.
pub const DEFAULT_WAIT_FOR: &str = "body";

/// Verbosity of diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Everything, including progress messages.
    Log,
    /// Warnings and errors.
    #[default]
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Equivalent `tracing` filter directive.
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Log => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Immutable configuration for one measurement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// URL to load; also the source of the readiness pattern.
    pub url: String,
    /// File to touch to trigger a hot reload.
    pub file: Option<PathBuf>,
    /// Shell command that starts the dev server.
    pub command: String,
    /// Extra arguments appended to `command`.
    pub extra_args: Vec<String>,
    /// Selector that must become visible for the app to count as loaded.
    pub wait_for_selector: String,
    /// Upper bound for the initial navigation.
    pub page_load_timeout: Duration,
    /// Upper bound for the readiness line to appear.
    pub server_start_timeout: Duration,
    /// Diagnostic verbosity.
    pub log_level: LogLevel,
}

impl Default for Options {
    fn default() -> Self {
        let timeouts = Timeouts::default();
        Self {
            url: DEFAULT_URL.to_string(),
            file: None,
            command: DEFAULT_COMMAND.to_string(),
            extra_args: Vec::new(),
            wait_for_selector: DEFAULT_WAIT_FOR.to_string(),
            page_load_timeout: timeouts.page_load,
            server_start_timeout: timeouts.server_start,
            log_level: LogLevel::default(),
        }
    }
}

impl Options {
    /// Set the target URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the dev server command.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Set the reload trigger file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the selector to wait for.
    #[must_use]
    pub fn with_wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for_selector = selector.into();
        self
    }

    /// Set the readiness deadline.
    #[must_use]
    pub const fn with_server_start_timeout(mut self, timeout: Duration) -> Self {
        self.server_start_timeout = timeout;
        self
    }

    /// Set the navigation deadline.
    #[must_use]
    pub const fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    /// The command line actually handed to the shell.
    pub fn full_command(&self) -> String {
        if self.extra_args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.extra_args.join(" "))
        }
    }

    /// Readiness pattern derived from the URL.
    pub fn readiness_pattern(&self) -> ReadinessPattern {
        ReadinessPattern::from_url(&self.url)
    }
}
