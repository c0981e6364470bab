//! Pullsheet CLI entrypoint for pull request extraction.

use std::io::{self, Write};
use std::process::ExitCode;

use chrono::Utc;
use ortho_config::OrthoConfig;
use pullsheet::{
    CancelFlag, CsvSink, ExtractError, GraphqlGateway, PersonalAccessToken, PullsheetConfig,
    RangeSweep, StderrProgressSink, SweepSummary,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(summary) => {
            if write_summary(&summary).is_err() {
                return ExitCode::FAILURE;
            }
            if summary.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<SweepSummary, ExtractError> {
    let config = load_config()?;

    let token = PersonalAccessToken::new(config.resolve_token()?)?;
    let repository = config.require_repository()?;
    let endpoint = config.resolve_endpoint()?;
    let window = config.resolve_window(Utc::now())?;

    let cancel = CancelFlag::new();
    spawn_interrupt_listener(cancel.clone());

    let gateway = GraphqlGateway::new(token, repository, endpoint, cancel.clone())?;
    let mut sink = CsvSink::create(config.resolve_output())?;
    let progress = StderrProgressSink;
    let sweep = RangeSweep::new(&gateway, &progress, cancel);
    let summary = sweep.run(window, &mut sink).await?;
    sink.flush()?;
    Ok(summary)
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ExtractError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<PullsheetConfig, ExtractError> {
    PullsheetConfig::load().map_err(|error| ExtractError::Configuration {
        message: error.to_string(),
    })
}

/// Flips the cancel flag on the first interrupt so the sweep can stop
/// issuing queries and close the sink cleanly.
fn spawn_interrupt_listener(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.request();
        }
    });
}

fn write_summary(summary: &SweepSummary) -> Result<(), ExtractError> {
    let mut stdout = io::stdout().lock();
    summary.write_report(&mut stdout)
}
