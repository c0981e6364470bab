//! Pullsheet library crate for extracting pull request metadata to CSV.
//!
//! The library speaks the GitHub GraphQL API to enumerate every pull request
//! created in a configured time window, working around the search API's
//! 1000-result cap by bisecting time ranges until each range fits, and
//! streams the extracted rows into a CSV sink page by page. Errors are
//! surfaced as friendly variants that the CLI can display directly.

pub mod config;
pub mod export;
pub mod github;
pub mod sweep;
pub mod telemetry;

pub use config::PullsheetConfig;
pub use export::CsvSink;
pub use github::{
    ApiEndpoint, AuthorType, ExtractError, GraphqlGateway, PageCursor, PersonalAccessToken,
    PullRequestRecord, RepositoryId, SearchGateway, SearchPage,
};
pub use sweep::{CancelFlag, FailedRange, RangeSweep, SweepSummary, TimeRange};
pub use telemetry::{NoopProgressSink, ProgressEvent, ProgressSink, StderrProgressSink};
