//! Half-open time ranges over pull request creation timestamps.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::github::ExtractError;

/// Minimum width a range must exceed before it may be bisected again.
const MIN_BISECT_SECONDS: i64 = 2;

/// Half-open interval `[start, end)` used as a creation-time query filter.
///
/// Bounds are truncated to whole seconds on construction, so a range and
/// every sub-range produced by [`TimeRange::bisect`] stay expressible in the
/// search API's second-granular timestamp syntax without overlaps or gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a range from raw bounds, truncating both to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidTimeRange`] when a bound cannot be
    /// represented or when the truncated range is empty.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ExtractError> {
        let start = truncate_to_second(start)?;
        let end = truncate_to_second(end)?;
        if start >= end {
            return Err(ExtractError::InvalidTimeRange {
                message: format!("start {start} must precede end {end}"),
            });
        }
        Ok(Self { start, end })
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Range width in whole seconds.
    #[must_use]
    pub fn width_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Whether the range is wide enough to split into two non-empty halves.
    #[must_use]
    pub fn can_bisect(&self) -> bool {
        self.width_seconds() >= MIN_BISECT_SECONDS
    }

    /// Splits the range at its temporal midpoint.
    ///
    /// The midpoint is truncated to a whole second, so the halves tile the
    /// original range exactly: `left.end == right.start`, no gap, no
    /// overlap. Returns `None` for ranges too narrow to split.
    #[must_use]
    pub fn bisect(&self) -> Option<(Self, Self)> {
        if !self.can_bisect() {
            return None;
        }
        let half = (self.end - self.start) / 2;
        let mid = truncate_to_second(self.start + half).ok()?;
        let left = Self {
            start: self.start,
            end: mid,
        };
        let right = Self {
            start: mid,
            end: self.end,
        };
        Some((left, right))
    }

    /// Renders the range as a search-API creation filter.
    ///
    /// GitHub's `..` range syntax is inclusive at both ends, so the
    /// exclusive upper bound is rendered as one second earlier. Sibling
    /// ranges produced by bisection therefore never match the same second.
    #[must_use]
    pub fn search_filter(&self) -> String {
        let last_second = self.end - chrono::TimeDelta::seconds(1);
        format!(
            "{}..{}",
            format_bound(self.start),
            format_bound(last_second)
        )
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            format_bound(self.start),
            format_bound(self.end)
        )
    }
}

fn truncate_to_second(value: DateTime<Utc>) -> Result<DateTime<Utc>, ExtractError> {
    DateTime::from_timestamp(value.timestamp(), 0).ok_or_else(|| ExtractError::InvalidTimeRange {
        message: format!("timestamp {value} is out of range"),
    })
}

fn format_bound(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
