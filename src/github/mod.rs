//! GitHub GraphQL access: credential handling, query construction, and the
//! retrying, self-throttling search client.
//!
//! The gateway trait keeps the sweep logic independent of HTTP concerns so
//! it can be exercised against mocks. Errors are mapped into user-friendly
//! variants that the CLI can surface without exposing transport internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod query;
pub mod rate_limit;
pub mod retry;

pub use error::ExtractError;
pub use gateway::{GraphqlGateway, SearchGateway};
pub use locator::{ApiEndpoint, PersonalAccessToken, RepositoryId, RepositoryName, RepositoryOwner};
pub use models::{AuthorType, CursorPageInfo, PageCursor, PullRequestRecord, SearchPage};
pub use rate_limit::{RateLimitStatus, ThrottlePolicy};
pub use retry::RetryPolicy;

#[cfg(test)]
pub use gateway::MockSearchGateway;
