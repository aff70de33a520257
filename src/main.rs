//! Prowl CLI entrypoint for pull request search.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use prowl::github::cancellation;
use prowl::telemetry::init_logging;
use prowl::{ProwlConfig, SearchError};
use tracing::debug;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report_failure(&mut io::stderr().lock(), &error),
    }
}

/// Writes `error` to `writer` and returns the failure exit code.
///
/// A failed write does not change the exit code.
fn report_failure<W: Write>(writer: &mut W, error: &SearchError) -> ExitCode {
    let _ignored = writeln!(writer, "{error}");
    ExitCode::FAILURE
}

async fn run() -> Result<(), SearchError> {
    let config = load_config()?;

    let (handle, signal) = cancellation();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling search");
            handle.cancel();
        }
    });

    let outcome = cli::search::run(&config, &signal).await;
    interrupt.abort();
    outcome
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`SearchError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<ProwlConfig, SearchError> {
    ProwlConfig::load().map_err(|error| SearchError::Configuration {
        message: error.to_string(),
    })
}
