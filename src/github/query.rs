//! GraphQL documents and search expression construction.

use crate::sweep::TimeRange;

use super::locator::RepositoryId;

/// Results requested per page; the search API maximum.
pub const PAGE_SIZE: u32 = 100;

/// Search document fetching one page of pull requests for a range.
///
/// The `rateLimit` object rides along with every page so the client can
/// throttle itself from the response body.
pub const SEARCH_DOCUMENT: &str = "\
query($searchQuery: String!, $pageSize: Int!, $after: String) {
  rateLimit {
    limit
    cost
    remaining
    resetAt
  }
  search(query: $searchQuery, type: ISSUE, first: $pageSize, after: $after) {
    issueCount
    pageInfo {
      hasNextPage
      endCursor
    }
    nodes {
      ... on PullRequest {
        number
        title
        createdAt
        mergedAt
        author {
          __typename
        }
        baseRefName
        comments {
          totalCount
        }
        additions
        deletions
      }
    }
  }
}";

/// Minimal document used by the connectivity check.
pub const VIEWER_DOCUMENT: &str = "query { viewer { login } }";

/// Builds the search expression scoping a query to one repository and range.
#[must_use]
pub fn search_expression(repository: &RepositoryId, range: TimeRange) -> String {
    format!(
        "repo:{} is:pr created:{}",
        repository.qualified(),
        range.search_filter()
    )
}
