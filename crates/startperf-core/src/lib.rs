//! Core domain types and port definitions for startperf.
//!
//! This crate holds everything the measurement pipeline reasons about without
//! touching the OS or a browser: options, timestamps, server lifecycle state,
//! the readiness pattern, and the port traits adapters implement.
//!
//! # Structure
//!
//! - [`domain`] - Options, results, server state, output lines, clock
//! - [`ports`] - Browser session/launcher and output sink traits
//! - [`error`] - The `MeasureError` taxonomy shared by all adapters
//! - [`timeouts`] - Timing constants for every bounded wait

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod ports;
pub mod timeouts;

// Re-export commonly used types for convenience
pub use domain::{
    Clock, ExitInfo, LogLevel, MeasurementResult, Options, OutputLine, ReadinessPattern,
    ReloadTimings, ServerState, StreamKind, Timestamp,
};
pub use error::MeasureError;
pub use ports::{BrowserError, BrowserLauncher, BrowserSession, NavigationResponse, OutputSinkPort};
pub use timeouts::Timeouts;
