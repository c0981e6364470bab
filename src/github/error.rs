//! Error types exposed by the extraction layer.

use thiserror::Error;

/// Errors surfaced while loading configuration or communicating with GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// The API endpoint URL could not be parsed.
    #[error("API endpoint URL is invalid: {0}")]
    InvalidUrl(String),

    /// A time range bound was malformed or the range was empty.
    #[error("time range is invalid: {message}")]
    InvalidTimeRange {
        /// Description of the offending bound or width.
        message: String,
    },

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a permanent API error, including query errors.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response detail describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// GitHub returned a 5xx-class server error.
    #[error("GitHub server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code returned by GitHub.
        status: u16,
        /// Response body excerpt.
        message: String,
    },

    /// The response JSON did not match the expected shape.
    ///
    /// Structural mismatches cannot be fixed by retrying, so this is fatal
    /// for the query that produced it.
    #[error("response did not match the expected shape: {message}")]
    Schema {
        /// Decoder detail describing the mismatch.
        message: String,
    },

    /// The retry budget was exhausted by transient failures.
    #[error("giving up after {attempts} attempts: {message}")]
    RetriesExhausted {
        /// Number of attempts made, including the first.
        attempts: u32,
        /// The last transient failure observed.
        message: String,
    },

    /// Cancellation was requested while an operation was in flight.
    #[error("interrupted before completion")]
    Interrupted,

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Writing a CSV row failed.
    #[error("CSV error: {message}")]
    Csv {
        /// Error detail from the CSV writer.
        message: String,
    },
}

impl ExtractError {
    /// Returns true when retrying the same request could plausibly succeed.
    ///
    /// Transport failures and 5xx responses are transient; everything else
    /// (auth rejections, query errors, schema mismatches) is permanent.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Server { .. })
    }
}
