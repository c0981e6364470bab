//! Gateways for querying the GitHub GraphQL API.
//!
//! The trait-based design enables mocking in tests while the reqwest-backed
//! implementation handles real HTTP requests, retries, and throttling.

mod graphql;
mod payload;


pub use graphql::GraphqlGateway;

use async_trait::async_trait;

use crate::github::error::ExtractError;
use crate::github::models::{PageCursor, SearchPage};
use crate::sweep::TimeRange;

/// Gateway that can fetch one page of pull request search results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Fetches the page of results for `range` at `cursor`.
    ///
    /// A `None` cursor requests the first page. The returned page reports
    /// the range's total result count and the cursor for the next page,
    /// when one exists.
    async fn search_page(
        &self,
        range: TimeRange,
        cursor: Option<PageCursor>,
    ) -> Result<SearchPage, ExtractError>;
}
