//! Composition root: logging and pipeline wiring.

use std::sync::Arc;

use startperf_browser::{ChromiumLauncher, LaunchConfig};
use startperf_core::LogLevel;
use startperf_runtime::{MeasurementPipeline, ProcessSupervisor};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::sink::ConsoleSink;

/// `RUST_LOG` wins when set; otherwise the `--log-level` mapping applies.
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()))
}

/// Install the global subscriber. Logs go to stderr so stdout carries only
/// server passthrough and the results.
pub fn init_logging(level: LogLevel) -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CliError::Setup(e.to_string()))
}

/// Wire the real supervisor and Chromium launcher.
pub fn build_pipeline() -> MeasurementPipeline {
    let supervisor = ProcessSupervisor::new(Arc::new(ConsoleSink));
    let config = LaunchConfig::from_env();
    debug!(headless = config.headless, auth = config.auth.is_some(), "browser configuration");
    let launcher = ChromiumLauncher::new(config);
    MeasurementPipeline::new(supervisor, Arc::new(launcher))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_select_filters() {
        // RUST_LOG is normally unset under cargo test
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(env_filter(LogLevel::Log).to_string(), "info");
            assert_eq!(env_filter(LogLevel::Error).to_string(), "error");
        }
    }
}
