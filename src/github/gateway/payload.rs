//! Wire payload types decoded from GraphQL response bodies.
//!
//! These mirror the JSON shape the API returns; conversions into the domain
//! models live alongside so callers outside the gateway never see wire
//! types. Every expected field is required here on purpose: a missing field
//! is a schema error, not something to paper over.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::github::models::{
    AuthorType, CursorPageInfo, PageCursor, PullRequestRecord, SearchPage,
};
use crate::github::rate_limit::RateLimitStatus;

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope {
    pub data: Option<serde_json::Value>,
    pub errors: Option<Vec<GraphqlErrorPayload>>,
}

/// One entry of the GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct GraphqlErrorPayload {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl GraphqlErrorPayload {
    /// Whether this error signals primary rate limit exhaustion.
    pub(super) fn is_rate_limited(&self) -> bool {
        self.kind.as_deref() == Some("RATE_LIMITED")
            || self.message.to_lowercase().contains("rate limit")
    }
}

/// The `data` object for the search document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchData {
    pub rate_limit: RateLimitPayload,
    pub search: SearchConnectionPayload,
}

/// The `rateLimit` object riding along with every search page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RateLimitPayload {
    pub limit: u32,
    pub cost: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl From<RateLimitPayload> for RateLimitStatus {
    fn from(payload: RateLimitPayload) -> Self {
        Self::new(
            payload.limit,
            payload.cost,
            payload.remaining,
            payload.reset_at,
        )
    }
}

/// The `search` connection for one page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchConnectionPayload {
    pub issue_count: u64,
    pub page_info: PageInfoPayload,
    pub nodes: Vec<PullRequestNodePayload>,
}

/// Cursor pagination state for one page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PageInfoPayload {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// One pull request node from the search results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PullRequestNodePayload {
    pub number: u64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub author: Option<AuthorPayload>,
    pub base_ref_name: String,
    pub comments: CommentConnectionPayload,
    pub additions: u64,
    pub deletions: u64,
}

/// The author object, reduced to its typename.
#[derive(Debug, Deserialize)]
pub(super) struct AuthorPayload {
    #[serde(rename = "__typename")]
    pub typename: String,
}

/// Comment count connection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CommentConnectionPayload {
    pub total_count: u64,
}

impl From<PullRequestNodePayload> for PullRequestRecord {
    fn from(node: PullRequestNodePayload) -> Self {
        let author_type =
            AuthorType::from_typename(node.author.as_ref().map(|author| author.typename.as_str()));
        Self {
            number: node.number,
            title: node.title,
            created_at: node.created_at,
            merged_at: node.merged_at,
            author_type,
            base_ref: node.base_ref_name,
            comments: node.comments.total_count,
            additions: node.additions,
            deletions: node.deletions,
        }
    }
}

impl From<SearchData> for SearchPage {
    fn from(data: SearchData) -> Self {
        let records = data
            .search
            .nodes
            .into_iter()
            .map(PullRequestRecord::from)
            .collect();
        let page_info = CursorPageInfo {
            has_next_page: data.search.page_info.has_next_page,
            end_cursor: data.search.page_info.end_cursor.map(PageCursor::new),
        };
        Self {
            records,
            total_count: data.search.issue_count,
            page_info,
            rate_limit: RateLimitStatus::from(data.rate_limit),
        }
    }
}

/// The `data` object for the viewer document.
#[derive(Debug, Deserialize)]
pub(super) struct ViewerData {
    pub viewer: ViewerPayload,
}

/// The authenticated viewer.
#[derive(Debug, Deserialize)]
pub(super) struct ViewerPayload {
    pub login: String,
}
