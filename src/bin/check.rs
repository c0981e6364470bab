//! Connectivity check verifying the credential and endpoint.
//!
//! Issues one minimal query and prints the authenticated login. Never
//! touches the CSV output.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use pullsheet::{
    CancelFlag, ExtractError, GraphqlGateway, PersonalAccessToken, PullsheetConfig, RepositoryId,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(login) => {
            let mut stdout = io::stdout().lock();
            if writeln!(stdout, "Authenticated to GitHub as {login}.").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            if writeln!(io::stderr().lock(), "Connectivity check failed: {error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<String, ExtractError> {
    let config =
        PullsheetConfig::load().map_err(|error| ExtractError::Configuration {
            message: error.to_string(),
        })?;
    let token = PersonalAccessToken::new(config.resolve_token()?)?;
    let endpoint = config.resolve_endpoint()?;
    // The viewer query is repository-independent; any placeholder satisfies
    // the gateway's identity requirement when owner/repo are unset.
    let repository = config
        .require_repository()
        .or_else(|_| RepositoryId::new("octocat", "hello-world"))?;

    let gateway = GraphqlGateway::new(token, repository, endpoint, CancelFlag::new())?;
    gateway.viewer_login().await
}
