//! Reqwest-backed GraphQL gateway with retry and self-throttling.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::github::error::ExtractError;
use crate::github::locator::{ApiEndpoint, PersonalAccessToken, RepositoryId};
use crate::github::models::{PageCursor, SearchPage};
use crate::github::query::{PAGE_SIZE, SEARCH_DOCUMENT, VIEWER_DOCUMENT, search_expression};
use crate::github::rate_limit::{RateLimitStatus, ThrottlePolicy};
use crate::github::retry::RetryPolicy;
use crate::sweep::{CancelFlag, TimeRange};

use super::SearchGateway;
use super::payload::{Envelope, GraphqlErrorPayload, RateLimitPayload, SearchData, ViewerData};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("pullsheet/", env!("CARGO_PKG_VERSION"));

/// Pause applied when the API reports rate limit exhaustion without a
/// usable reset instant.
const RATE_LIMIT_FALLBACK_PAUSE: Duration = Duration::from_secs(60);

/// GraphQL gateway speaking to one endpoint with one credential.
pub struct GraphqlGateway {
    http: reqwest::Client,
    endpoint: ApiEndpoint,
    token: PersonalAccessToken,
    repository: RepositoryId,
    retry: RetryPolicy,
    throttle: ThrottlePolicy,
    cancel: CancelFlag,
}

impl GraphqlGateway {
    /// Creates a gateway with the default retry and throttle policies.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Configuration`] when the HTTP client cannot
    /// be constructed.
    pub fn new(
        token: PersonalAccessToken,
        repository: RepositoryId,
        endpoint: ApiEndpoint,
        cancel: CancelFlag,
    ) -> Result<Self, ExtractError> {
        Self::with_policies(
            token,
            repository,
            endpoint,
            cancel,
            RetryPolicy::default(),
            ThrottlePolicy::default(),
        )
    }

    /// Creates a gateway with explicit retry and throttle policies.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Configuration`] when the HTTP client cannot
    /// be constructed.
    pub fn with_policies(
        token: PersonalAccessToken,
        repository: RepositoryId,
        endpoint: ApiEndpoint,
        cancel: CancelFlag,
        retry: RetryPolicy,
        throttle: ThrottlePolicy,
    ) -> Result<Self, ExtractError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| ExtractError::Configuration {
                message: format!("failed to build HTTP client: {error}"),
            })?;
        Ok(Self {
            http,
            endpoint,
            token,
            repository,
            retry,
            throttle,
            cancel,
        })
    }

    /// Runs the minimal viewer query and returns the authenticated login.
    ///
    /// # Errors
    ///
    /// Propagates authentication, network, and schema failures from the
    /// underlying request.
    pub async fn viewer_login(&self) -> Result<String, ExtractError> {
        let data = self.execute(VIEWER_DOCUMENT, json!({})).await?;
        let viewer: ViewerData = decode_data(data)?;
        Ok(viewer.viewer.login)
    }

    /// Executes one document with retry, returning the raw `data` value.
    async fn execute(&self, document: &str, variables: Value) -> Result<Value, ExtractError> {
        let body = json!({ "query": document, "variables": variables });
        let mut attempts = 0_u32;
        loop {
            if self.cancel.is_cancelled() {
                return Err(ExtractError::Interrupted);
            }
            attempts += 1;
            let failure = match self.attempt(&body).await {
                Ok(data) => return Ok(data),
                Err(failure) => failure,
            };
            if !failure.retryable {
                return Err(failure.error);
            }
            if !self.retry.allows_another_attempt(attempts) {
                return Err(ExtractError::RetriesExhausted {
                    attempts,
                    message: failure.error.to_string(),
                });
            }
            let delay = failure
                .retry_after
                .unwrap_or_else(|| self.retry.delay_after_attempt(attempts));
            tracing::warn!(
                "attempt {attempts} failed ({error}); retrying in {delay:?}",
                error = failure.error
            );
            self.sleep_unless_cancelled(delay).await?;
        }
    }

    /// Sends the request once and classifies the outcome.
    async fn attempt(&self, body: &Value) -> Result<Value, AttemptFailure> {
        let response = match self
            .http
            .post(self.endpoint.url().clone())
            .bearer_auth(self.token.value())
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                return Err(AttemptFailure::transient(classify_transport_error(&error)));
            }
        };
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(error) => {
                return Err(AttemptFailure::transient(ExtractError::Network {
                    message: format!("failed to read response body: {error}"),
                }));
            }
        };
        classify_status(status, &text)?;
        let envelope: Envelope = serde_json::from_str(&text).map_err(|error| {
            AttemptFailure::permanent(ExtractError::Schema {
                message: format!("response is not a GraphQL envelope: {error}"),
            })
        })?;
        if let Some(errors) = envelope.errors.as_deref()
            && !errors.is_empty()
        {
            return Err(self.classify_graphql_errors(errors, envelope.data.as_ref()));
        }
        envelope.data.ok_or_else(|| {
            AttemptFailure::permanent(ExtractError::Schema {
                message: "response carries neither data nor errors".to_owned(),
            })
        })
    }

    /// Maps the GraphQL `errors` array onto the retry taxonomy.
    ///
    /// Primary rate limit exhaustion is retryable with a pause until the
    /// reported reset; every other query error is permanent.
    fn classify_graphql_errors(
        &self,
        errors: &[GraphqlErrorPayload],
        data: Option<&Value>,
    ) -> AttemptFailure {
        let messages = errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        if errors.iter().any(GraphqlErrorPayload::is_rate_limited) {
            let pause = data
                .and_then(|value| self.reset_pause(value))
                .unwrap_or(RATE_LIMIT_FALLBACK_PAUSE);
            return AttemptFailure::retryable_after(
                ExtractError::Api {
                    message: format!("rate limit exceeded: {messages}"),
                },
                pause,
            );
        }
        AttemptFailure::permanent(ExtractError::Api { message: messages })
    }

    /// Extracts a pause until the reported reset from partial `data`.
    fn reset_pause(&self, data: &Value) -> Option<Duration> {
        let payload: RateLimitPayload =
            serde_json::from_value(data.get("rateLimit")?.clone()).ok()?;
        let status = RateLimitStatus::from(payload);
        Some(status.pause_duration(Utc::now(), self.throttle.resume_buffer))
    }

    /// Pauses when the reported budget has dropped to the floor.
    async fn pause_if_low(&self, status: RateLimitStatus) -> Result<(), ExtractError> {
        if !status.is_at_floor(self.throttle.remaining_floor) {
            return Ok(());
        }
        let pause = status.pause_duration(Utc::now(), self.throttle.resume_buffer);
        if pause.is_zero() {
            return Ok(());
        }
        tracing::warn!(
            "rate limit budget low ({remaining} remaining); pausing {pause:?} until reset",
            remaining = status.remaining()
        );
        self.sleep_unless_cancelled(pause).await
    }

    /// Sleeps for `delay` unless cancellation is requested first.
    async fn sleep_unless_cancelled(&self, delay: Duration) -> Result<(), ExtractError> {
        tokio::select! {
            () = tokio::time::sleep(delay) => Ok(()),
            () = self.cancel.cancelled() => Err(ExtractError::Interrupted),
        }
    }
}

#[async_trait]
impl SearchGateway for GraphqlGateway {
    async fn search_page(
        &self,
        range: TimeRange,
        cursor: Option<PageCursor>,
    ) -> Result<SearchPage, ExtractError> {
        let variables = json!({
            "searchQuery": search_expression(&self.repository, range),
            "pageSize": PAGE_SIZE,
            "after": cursor.as_ref().map(PageCursor::as_str),
        });
        let data = self.execute(SEARCH_DOCUMENT, variables).await?;
        let decoded: SearchData = decode_data(data)?;
        let page = SearchPage::from(decoded);
        self.pause_if_low(page.rate_limit).await?;
        Ok(page)
    }
}

/// One attempt's failure, annotated for the retry loop.
struct AttemptFailure {
    error: ExtractError,
    retryable: bool,
    retry_after: Option<Duration>,
}

impl AttemptFailure {
    const fn transient(error: ExtractError) -> Self {
        Self {
            error,
            retryable: true,
            retry_after: None,
        }
    }

    const fn permanent(error: ExtractError) -> Self {
        Self {
            error,
            retryable: false,
            retry_after: None,
        }
    }

    const fn retryable_after(error: ExtractError, pause: Duration) -> Self {
        Self {
            error,
            retryable: true,
            retry_after: Some(pause),
        }
    }
}

/// Classifies a non-success HTTP status.
fn classify_status(status: StatusCode, body: &str) -> Result<(), AttemptFailure> {
    if status.is_server_error() {
        return Err(AttemptFailure::transient(ExtractError::Server {
            status: status.as_u16(),
            message: excerpt(body),
        }));
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AttemptFailure::transient(ExtractError::Network {
            message: format!("secondary rate limit (HTTP {status}): {}", excerpt(body)),
        }));
    }
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        if status == StatusCode::FORBIDDEN && is_rate_limit_hint(body) {
            return Err(AttemptFailure::transient(ExtractError::Network {
                message: format!("secondary rate limit (HTTP {status}): {}", excerpt(body)),
            }));
        }
        return Err(AttemptFailure::permanent(ExtractError::Authentication {
            message: format!("GitHub returned {status}: {}", excerpt(body)),
        }));
    }
    if !status.is_success() {
        return Err(AttemptFailure::permanent(ExtractError::Api {
            message: format!("HTTP {status}: {}", excerpt(body)),
        }));
    }
    Ok(())
}

/// Whether a 403 body looks like a secondary rate limit rather than a
/// permission failure.
fn is_rate_limit_hint(body: &str) -> bool {
    let lowered = body.to_lowercase();
    lowered.contains("rate limit") || lowered.contains("abuse")
}

/// Maps a reqwest transport failure onto the error taxonomy.
fn classify_transport_error(error: &reqwest::Error) -> ExtractError {
    let detail = if error.is_timeout() {
        format!("request timed out: {error}")
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    };
    ExtractError::Network { message: detail }
}

/// Decodes the `data` value into the expected shape.
fn decode_data<T: DeserializeOwned>(data: Value) -> Result<T, ExtractError> {
    serde_json::from_value(data).map_err(|error| ExtractError::Schema {
        message: error.to_string(),
    })
}

/// Bounded excerpt of a response body for error messages.
fn excerpt(body: &str) -> String {
    body.chars().take(200).collect()
}
