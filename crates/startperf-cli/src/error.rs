//! CLI error type and exit code mapping.

use startperf_core::MeasureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// The measurement itself failed.
    #[error(transparent)]
    Measurement(#[from] MeasureError),

    /// Argument parsing error, as rendered by clap.
    #[error("{0}")]
    Arguments(String),

    /// Signal handlers or logging could not be set up.
    #[error("Setup failed: {0}")]
    Setup(String),
}

impl CliError {
    /// Exit codes:
    /// - 0: Success
    /// - 1: Measurement failure
    /// - 2: Invalid arguments
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Measurement(_) | Self::Setup(_) => 1,
            Self::Arguments(_) => 2,
        }
    }

    /// Exit code for an error that may wrap a [`CliError`]; anything else is 1.
    pub fn from_anyhow(err: &anyhow::Error) -> u8 {
        err.downcast_ref::<Self>().map_or(1, Self::exit_code)
    }
}
