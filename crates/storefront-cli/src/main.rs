//! Storefront command-line client entry point.

use std::io::Write;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;

use commands::Session;
use config::ClientConfig;
use error::AppError;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ClientConfig::load() {
        Ok(config) => config,
        Err(err) => err.exit(),
    };

    // Initialize tracing subscriber. Logs go to stderr; stdout carries JSON results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::warn!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(config: ClientConfig) -> Result<(), AppError> {
    let session = Session::connect(&config.http_config())?;
    let output = session.execute(config.command).await?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
