//! OS-facing runtime for startperf.
//!
//! # Structure
//!
//! - [`process`] - Dev server supervision and readiness detection
//! - [`reload`] - Reversible file mutation for the hot-reload measurement
//! - [`session`] - Per-run handle ownership and serialized cleanup
//! - [`pipeline`] - The end-to-end measurement sequence
//! - [`signals`] - SIGINT/SIGTERM/SIGQUIT interception

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod pipeline;
pub mod process;
pub mod reload;
pub mod session;
pub mod signals;

pub use pipeline::MeasurementPipeline;
pub use process::{NoopOutputSink, OutputWatcher, ProcessSupervisor, ServerProcess};
pub use session::Session;
pub use signals::{ShutdownSignal, SignalHandler};
