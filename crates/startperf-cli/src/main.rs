//! CLI entry point - the composition root.
//!
//! Exit code 0 after printing results, 1 on any measurement failure.

use std::process::ExitCode;
use std::sync::Arc;

use startperf_cli::presentation::render_report;
use startperf_cli::{Cli, CliError, build_pipeline, init_logging};
use startperf_runtime::{Session, SignalHandler};

fn main() -> ExitCode {
    // Load .env so SHOW_BROWSER / AUTH_* can live next to the project
    dotenvy::dotenv().ok();

    let cli = match Cli::parse_args(std::env::args_os()) {
        Ok(Some(cli)) => cli,
        Ok(None) => return ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(e.exit_code());
        }
    };
    let options = cli.to_options();
    if let Err(e) = init_logging(options.log_level) {
        eprintln!("{e}");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(options)) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Measurement failed");
            eprintln!("{e:?}");
            ExitCode::from(CliError::from_anyhow(&e))
        }
    }
}

async fn run(options: startperf_core::Options) -> anyhow::Result<String> {
    let session = Arc::new(Session::new());
    SignalHandler::new(Arc::clone(&session))
        .install()
        .map_err(|e| CliError::Setup(format!("signal handlers: {e}")))?;

    let pipeline = build_pipeline();
    let result = pipeline
        .measure(&session, &options)
        .await
        .map_err(CliError::from)?;

    Ok(render_report(&result))
}
