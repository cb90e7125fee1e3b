use crate::infrastructure::config::AppSettings;
use crate::interfaces::cli::{self, exit_code, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Entry point for the `fhir-testgen` binary; returns the process exit code.
pub fn run() -> i32 {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let command = match Cli::try_parse() {
        Ok(cli) => cli.command,
        Err(err) => {
            let _ = err.print();
            // Help and version output are not failures.
            return if err.use_stderr() { 64 } else { 0 };
        }
    };

    let settings = match AppSettings::load() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!(error = %err, "Failed to load configuration");
            return exit_code(&err);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "Failed to start async runtime");
            return 1;
        }
    };

    match runtime.block_on(cli::execute(command, settings)) {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("{}", err);
            exit_code(&err)
        }
    }
}
