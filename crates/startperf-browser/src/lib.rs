//! Chromium adapter for the startperf browser ports.
//!
//! Drives a real Chrome/Chromium over the DevTools protocol via
//! `chromiumoxide`.
//!
//! # Structure
//!
//! - [`LaunchConfig`] - Headless/headful, viewport and basic auth, from env
//! - [`ChromiumLauncher`] - [`BrowserLauncher`](startperf_core::BrowserLauncher) implementation
//! - [`ChromiumSession`] - One page: navigation, selector polling, network idle
//! - [`NetworkActivity`] - In-flight request bookkeeping for idle detection

mod config;
mod diagnostics;
mod launcher;
mod network;
mod session;

pub use config::{BasicAuth, LaunchConfig};
pub use diagnostics::is_failed_status;
pub use launcher::ChromiumLauncher;
pub use network::NetworkActivity;
pub use session::ChromiumSession;
