//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the measurement pipeline expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No CDP or browser-driver types in any signature
//! - No process or terminal details
//! - Intent-based methods (navigate, wait for idle), not protocol commands

pub mod browser;
pub mod output_sink;

pub use browser::{BrowserError, BrowserLauncher, BrowserSession, NavigationResponse};
pub use output_sink::OutputSinkPort;

#[cfg(any(test, feature = "test-utils"))]
pub use browser::{MockBrowserLauncher, MockBrowserSession};
