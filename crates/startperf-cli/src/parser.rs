//! Command-line arguments.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use startperf_core::domain::{DEFAULT_COMMAND, DEFAULT_URL, DEFAULT_WAIT_FOR};
use startperf_core::{LogLevel, Options, Timeouts};

use crate::error::CliError;

/// Measures build and load performance for web applications.
#[derive(Debug, Parser)]
#[command(name = "build-start-perf-test")]
#[command(about = "Measures build and load performance for web applications")]
#[command(version)]
#[command(after_help = "Measures:
- Build time
- Time to first paint
- Time to app load (waiting for specified element)
- Time to finished reload after file changes

Examples:
  $ build-start-perf-test --url http://localhost:3000 --command \"npm run dev\"
  $ build-start-perf-test --file app.js --wait-for \".app-container\"")]
pub struct Cli {
    /// URL to load
    #[arg(short, long, default_value = DEFAULT_URL)]
    pub url: String,

    /// File to touch to trigger a reload
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Command to start dev server
    #[arg(short, long, default_value = DEFAULT_COMMAND)]
    pub command: String,

    /// Element selector to wait for
    #[arg(short, long = "wait-for", default_value = DEFAULT_WAIT_FOR)]
    pub wait_for: String,

    /// Set the log level
    #[arg(short, long = "log-level", value_enum, default_value_t = LogLevelArg::Warn)]
    pub log_level: LogLevelArg,

    /// Page load timeout in milliseconds
    #[arg(long = "page-load-timeout", value_name = "MS")]
    pub page_load_timeout: Option<u64>,

    /// How long to wait for the dev server to print the URL, in milliseconds
    #[arg(long = "server-timeout", value_name = "MS")]
    pub server_timeout: Option<u64>,

    /// Extra arguments appended to the dev server command
    #[arg(last = true)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Log,
    Warn,
    Error,
}

impl From<LogLevelArg> for LogLevel {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Log => Self::Log,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Error => Self::Error,
        }
    }
}

impl Cli {
    /// Parse `args`. Help and version requests are printed here and come
    /// back as `Ok(None)`.
    pub fn parse_args<I, T>(args: I) -> Result<Option<Self>, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Ok(Some(cli)),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                let _ = e.print();
                Ok(None)
            }
            Err(e) => Err(CliError::Arguments(e.render().to_string())),
        }
    }

    /// Resolve flags against the default timings.
    pub fn to_options(&self) -> Options {
        let defaults = Timeouts::default();
        Options {
            url: self.url.clone(),
            file: self.file.clone(),
            command: self.command.clone(),
            extra_args: self.extra_args.clone(),
            wait_for_selector: self.wait_for.clone(),
            page_load_timeout: self
                .page_load_timeout
                .map_or(defaults.page_load, Duration::from_millis),
            server_start_timeout: self
                .server_timeout
                .map_or(defaults.server_start, Duration::from_millis),
            log_level: self.log_level.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let options = Cli::parse_from(["build-start-perf-test"]).to_options();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from([
            "build-start-perf-test",
            "-u",
            "http://localhost:3000/",
            "-f",
            "app.js",
            "-c",
            "npm run dev",
            "-w",
            ".app-container",
            "-l",
            "log",
        ]);
        assert_eq!(cli.url, "http://localhost:3000/");
        assert_eq!(cli.file, Some(PathBuf::from("app.js")));
        assert_eq!(cli.command, "npm run dev");
        assert_eq!(cli.wait_for, ".app-container");
        assert_eq!(cli.log_level, LogLevelArg::Log);
    }

    #[test]
    fn test_timeouts_and_trailing_args() {
        let options = Cli::parse_from([
            "build-start-perf-test",
            "--page-load-timeout",
            "45000",
            "--server-timeout",
            "90000",
            "--",
            "--port",
            "4300",
        ])
        .to_options();
        assert_eq!(options.page_load_timeout, Duration::from_secs(45));
        assert_eq!(options.server_start_timeout, Duration::from_secs(90));
        assert_eq!(options.full_command(), "pnpm start --port 4300");
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let err = Cli::parse_args(["build-start-perf-test", "--log-level", "debug"]).unwrap_err();
        assert!(matches!(err, CliError::Arguments(ref msg) if msg.contains("debug")));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_help_is_not_an_error() {
        assert!(Cli::parse_args(["build-start-perf-test", "--help"]).unwrap().is_none());
        assert!(Cli::parse_args(["build-start-perf-test", "--version"]).unwrap().is_none());
    }

    #[test]
    fn test_parse_args_accepts_valid_flags() {
        let cli = Cli::parse_args(["build-start-perf-test", "-c", "npm run dev"])
            .unwrap()
            .unwrap();
        assert_eq!(cli.command, "npm run dev");
    }
}
