//! Application configuration loaded from CLI, environment, and files.
//!
//! Configuration values are merged from command-line arguments,
//! environment variables, and configuration files using ortho-config's
//! layered approach, with the following precedence (lowest to highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.pullsheet.toml` in current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `PULLSHEET_TOKEN`, `PULLSHEET_OWNER`,
//!    and friends, or legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--token`/`-t`, `--owner`/`-o`, …
//!
//! # Configuration File
//!
//! ```toml
//! token = "ghp_example"
//! owner = "microsoft"
//! repo = "vscode"
//! start_date = "2020-01-01"
//! output = "pull_requests.csv"
//! ```

use std::env;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, NaiveDate, Utc};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::github::error::ExtractError;
use crate::github::locator::{ApiEndpoint, RepositoryId};
use crate::sweep::TimeRange;

const DEFAULT_START_DATE: &str = "2020-01-01T00:00:00Z";
const DEFAULT_OUTPUT: &str = "pull_requests.csv";
const DEFAULT_API_URL: &str = "https://api.github.com/graphql";

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `PULLSHEET_TOKEN`, `GITHUB_TOKEN`, or `--token`: Authentication token
/// - `PULLSHEET_OWNER` or `--owner`: Repository owner
/// - `PULLSHEET_REPO` or `--repo`: Repository name
/// - `PULLSHEET_START_DATE` or `--start-date`: Window start
/// - `PULLSHEET_OUTPUT` or `--output`: CSV output path
/// - `PULLSHEET_API_URL` or `--api-url`: GraphQL endpoint override
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PULLSHEET",
    discovery(
        dotfile_name = ".pullsheet.toml",
        config_file_name = "pullsheet.toml",
        app_name = "pullsheet"
    )
)]
pub struct PullsheetConfig {
    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `PULLSHEET_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Repository owner (e.g., "microsoft").
    #[ortho_config(cli_short = 'o')]
    pub owner: Option<String>,

    /// Repository name (e.g., "vscode").
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Start of the extraction window, as an RFC 3339 timestamp or a
    /// `YYYY-MM-DD` date. The window always ends at the current instant.
    ///
    /// Defaults to `2020-01-01T00:00:00Z`.
    #[ortho_config(cli_short = 's')]
    pub start_date: Option<String>,

    /// Path of the CSV artifact to write.
    ///
    /// Defaults to `pull_requests.csv` in the working directory.
    #[ortho_config(cli_short = 'f')]
    pub output: Option<Utf8PathBuf>,

    /// GraphQL endpoint override, mainly for GitHub Enterprise hosts.
    #[ortho_config()]
    pub api_url: Option<String>,
}

impl Default for PullsheetConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: None,
            repo: None,
            start_date: None,
            output: None,
            api_url: None,
        }
    }
}

impl PullsheetConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MissingToken`] when no source provides a
    /// value.
    pub fn resolve_token(&self) -> Result<String, ExtractError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(ExtractError::MissingToken)
    }

    /// Returns the configured repository identity.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Configuration`] when owner or repo is
    /// missing or blank.
    pub fn require_repository(&self) -> Result<RepositoryId, ExtractError> {
        match (&self.owner, &self.repo) {
            (Some(owner), Some(repo)) => RepositoryId::new(owner, repo),
            (None, _) => Err(ExtractError::Configuration {
                message: "repository owner is required (use --owner or -o)".to_owned(),
            }),
            (_, None) => Err(ExtractError::Configuration {
                message: "repository name is required (use --repo or -r)".to_owned(),
            }),
        }
    }

    /// Resolves the extraction window from the configured start to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Configuration`] when the start date cannot
    /// be parsed and [`ExtractError::InvalidTimeRange`] when it does not
    /// precede `now`.
    pub fn resolve_window(&self, now: DateTime<Utc>) -> Result<TimeRange, ExtractError> {
        let raw = self.start_date.as_deref().unwrap_or(DEFAULT_START_DATE);
        let start = parse_start_date(raw)?;
        TimeRange::new(start, now)
    }

    /// Returns the configured output path or the default.
    #[must_use]
    pub fn resolve_output(&self) -> &Utf8Path {
        self.output
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new(DEFAULT_OUTPUT))
    }

    /// Returns the configured GraphQL endpoint or the default.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidUrl`] when the override cannot be
    /// parsed.
    pub fn resolve_endpoint(&self) -> Result<ApiEndpoint, ExtractError> {
        ApiEndpoint::parse(self.api_url.as_deref().unwrap_or(DEFAULT_API_URL))
    }
}

/// Parses a window start as RFC 3339 or as a bare date at midnight UTC.
fn parse_start_date(raw: &str) -> Result<DateTime<Utc>, ExtractError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(midnight.and_utc());
    }
    Err(ExtractError::Configuration {
        message: format!("start date '{raw}' is neither RFC 3339 nor YYYY-MM-DD"),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use crate::github::error::ExtractError;

    use super::{PullsheetConfig, parse_start_date};

    #[test]
    fn explicit_token_wins_over_environment() {
        let _guard = env_lock::lock_env([("GITHUB_TOKEN", Some("legacy-token"))]);
        let config = PullsheetConfig {
            token: Some("configured-token".to_owned()),
            ..PullsheetConfig::default()
        };
        assert_eq!(
            config.resolve_token().expect("token should resolve"),
            "configured-token"
        );
    }

    #[test]
    fn legacy_environment_token_is_a_fallback() {
        let _guard = env_lock::lock_env([("GITHUB_TOKEN", Some("legacy-token"))]);
        let config = PullsheetConfig::default();
        assert_eq!(
            config.resolve_token().expect("token should resolve"),
            "legacy-token"
        );
    }

    #[test]
    fn missing_token_everywhere_is_an_error() {
        let _guard = env_lock::lock_env([("GITHUB_TOKEN", None::<&str>)]);
        let config = PullsheetConfig::default();
        assert_eq!(config.resolve_token(), Err(ExtractError::MissingToken));
    }

    #[test]
    fn repository_requires_both_owner_and_repo() {
        let config = PullsheetConfig {
            owner: Some("microsoft".to_owned()),
            ..PullsheetConfig::default()
        };
        assert!(matches!(
            config.require_repository(),
            Err(ExtractError::Configuration { .. })
        ));

        let complete = PullsheetConfig {
            owner: Some("microsoft".to_owned()),
            repo: Some("vscode".to_owned()),
            ..PullsheetConfig::default()
        };
        let repository = complete
            .require_repository()
            .expect("repository should resolve");
        assert_eq!(repository.qualified(), "microsoft/vscode");
    }

    #[rstest]
    #[case("2020-01-01T00:00:00Z")]
    #[case("2020-01-01")]
    fn start_date_accepts_both_forms(#[case] raw: &str) {
        let parsed = parse_start_date(raw).expect("start date should parse");
        let expected = Utc
            .with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
            .single()
            .expect("expected timestamp should be valid");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn unparseable_start_date_is_a_configuration_error() {
        assert!(matches!(
            parse_start_date("January 1st, 2020"),
            Err(ExtractError::Configuration { .. })
        ));
    }

    #[test]
    fn window_defaults_to_twenty_twenty_and_ends_now() {
        let config = PullsheetConfig::default();
        let now = Utc
            .with_ymd_and_hms(2024, 6, 1, 12, 30, 45)
            .single()
            .expect("now should be valid");
        let window = config.resolve_window(now).expect("window should resolve");
        assert_eq!(
            window.start(),
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
                .single()
                .expect("start should be valid")
        );
        assert_eq!(window.end(), now);
    }

    #[test]
    fn start_after_now_is_rejected() {
        let config = PullsheetConfig {
            start_date: Some("2030-01-01".to_owned()),
            ..PullsheetConfig::default()
        };
        let now = Utc
            .with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
            .single()
            .expect("now should be valid");
        assert!(matches!(
            config.resolve_window(now),
            Err(ExtractError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn output_and_endpoint_have_sensible_defaults() {
        let config = PullsheetConfig::default();
        assert_eq!(config.resolve_output().as_str(), "pull_requests.csv");
        assert_eq!(
            config
                .resolve_endpoint()
                .expect("endpoint should resolve")
                .as_str(),
            "https://api.github.com/graphql"
        );
    }
}
