//! Presentation helpers for CLI output.

pub mod tables;

pub use tables::{format_ms, render_report, render_results};
