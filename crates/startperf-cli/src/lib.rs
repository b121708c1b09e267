//! Command-line adapter for startperf.
//!
//! Parses arguments, wires the runtime and the Chromium adapter together,
//! and renders the results table.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary target only
use dotenvy as _;
use tokio as _;

pub mod bootstrap;
pub mod error;
pub mod parser;
pub mod presentation;
pub mod sink;

pub use bootstrap::{build_pipeline, init_logging};
pub use error::CliError;
pub use parser::{Cli, LogLevelArg};
pub use sink::ConsoleSink;
