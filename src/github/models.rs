//! Domain models for extracted pull request data.

use chrono::{DateTime, Utc};

use super::rate_limit::RateLimitStatus;

/// Classification of the account that opened a pull request.
///
/// Derived from the GraphQL `author.__typename` field. The CSV output keeps
/// the upstream vocabulary, with a deleted author rendered as `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorType {
    /// A human user account.
    User,
    /// A bot or automation account.
    Bot,
    /// An organisation account.
    Organization,
    /// A placeholder account created during imports.
    Mannequin,
    /// An enterprise-managed user account.
    EnterpriseUserAccount,
    /// The author account no longer exists.
    Missing,
    /// A typename this tool does not recognise, carried through verbatim.
    Other(String),
}

impl AuthorType {
    /// Classifies an optional `__typename` value.
    #[must_use]
    pub fn from_typename(typename: Option<&str>) -> Self {
        match typename {
            None => Self::Missing,
            Some("User") => Self::User,
            Some("Bot") => Self::Bot,
            Some("Organization") => Self::Organization,
            Some("Mannequin") => Self::Mannequin,
            Some("EnterpriseUserAccount") => Self::EnterpriseUserAccount,
            Some(other) => Self::Other(other.to_owned()),
        }
    }

    /// Returns the CSV rendering of the author type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "User",
            Self::Bot => "Bot",
            Self::Organization => "Organization",
            Self::Mannequin => "Mannequin",
            Self::EnterpriseUserAccount => "EnterpriseUserAccount",
            Self::Missing => "null",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

/// Immutable metadata extracted from one pull request search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    /// Pull request number, unique within the repository.
    pub number: u64,
    /// Pull request title.
    pub title: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Merge timestamp; absent for unmerged or still-open pull requests.
    pub merged_at: Option<DateTime<Utc>>,
    /// Classification of the authoring account.
    pub author_type: AuthorType,
    /// Name of the branch the pull request targets.
    pub base_ref: String,
    /// Number of discussion comments.
    pub comments: u64,
    /// Lines added.
    pub additions: u64,
    /// Lines deleted.
    pub deletions: u64,
}

/// Opaque pagination token returned by the search API.
///
/// Absence means the start of a range; a page that returns no cursor marks
/// the range as exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(String);

impl PageCursor {
    /// Wraps a cursor token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Cursor-based pagination state reported with each page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPageInfo {
    /// Whether another page follows this one.
    pub has_next_page: bool,
    /// Cursor for the next page, when one follows.
    pub end_cursor: Option<PageCursor>,
}

/// One page of search results together with its pagination and quota state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    /// Records decoded from this page.
    pub records: Vec<PullRequestRecord>,
    /// Total number of results the whole range matches.
    pub total_count: u64,
    /// Pagination state for the range being paged.
    pub page_info: CursorPageInfo,
    /// Rate limit state reported with this response.
    pub rate_limit: RateLimitStatus,
}
