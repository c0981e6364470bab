//! Range-partitioned pagination driver.
//!
//! The search API caps any single query's total matches at
//! [`RESULT_CAP`], regardless of pagination. The sweep works around the
//! cap by probing each range's first page, bisecting ranges whose total
//! exceeds the cap, and paginating the rest. An explicit work queue keeps
//! failure isolation and cancellation checks uniform at every step and
//! avoids unbounded recursion on pathological inputs.

use std::collections::VecDeque;
use std::io::Write;

use crate::export::CsvSink;
use crate::github::{ExtractError, SearchGateway, SearchPage};
use crate::telemetry::{ProgressEvent, ProgressSink};

use super::cancel::CancelFlag;
use super::range::TimeRange;
use super::summary::{FailedRange, SweepSummary};

/// Hard ceiling the search API places on one query's total matches.
pub const RESULT_CAP: u64 = 1000;

/// How processing one range ended, from the queue's point of view.
enum RangeOutcome {
    /// The range was fully handled: completed, failed-and-recorded, or
    /// split back onto the queue.
    Finished,
    /// Cancellation was observed; stop draining the queue.
    Interrupted,
}

/// Sequential sweep over a work queue of time ranges.
pub struct RangeSweep<'a, Gateway>
where
    Gateway: SearchGateway,
{
    gateway: &'a Gateway,
    progress: &'a dyn ProgressSink,
    cancel: CancelFlag,
}

impl<'a, Gateway> RangeSweep<'a, Gateway>
where
    Gateway: SearchGateway,
{
    /// Creates a sweep over the provided gateway.
    #[must_use]
    pub const fn new(
        gateway: &'a Gateway,
        progress: &'a dyn ProgressSink,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            gateway,
            progress,
            cancel,
        }
    }

    /// Drains the window, streaming every record into the sink.
    ///
    /// Sub-ranges produced by bisection are pushed to the front of the
    /// queue so the sweep proceeds oldest-first; ordering across ranges is
    /// a friendliness property, not a correctness requirement.
    ///
    /// # Errors
    ///
    /// Returns fatal errors only (authentication, query, sink I/O).
    /// Transient failures that exhaust the retry budget and per-query
    /// schema mismatches are recorded as failed ranges in the summary and
    /// do not abort the run.
    pub async fn run<W: Write>(
        &self,
        window: TimeRange,
        sink: &mut CsvSink<W>,
    ) -> Result<SweepSummary, ExtractError> {
        let mut queue = VecDeque::from([window]);
        let mut summary = SweepSummary::default();
        while let Some(range) = queue.pop_front() {
            if self.cancel.is_cancelled() {
                summary.interrupted = true;
                break;
            }
            match self.process_range(range, &mut queue, sink, &mut summary).await? {
                RangeOutcome::Finished => {}
                RangeOutcome::Interrupted => {
                    summary.interrupted = true;
                    break;
                }
            }
        }
        if summary.interrupted {
            self.progress.record(ProgressEvent::SweepInterrupted);
        }
        sink.flush()?;
        Ok(summary)
    }

    /// Probes one range and either discards, bisects, fails, or paginates
    /// it.
    async fn process_range<W: Write>(
        &self,
        range: TimeRange,
        queue: &mut VecDeque<TimeRange>,
        sink: &mut CsvSink<W>,
        summary: &mut SweepSummary,
    ) -> Result<RangeOutcome, ExtractError> {
        self.progress.record(ProgressEvent::RangeStarted { range });
        let first = match self.gateway.search_page(range, None).await {
            Ok(page) => page,
            Err(ExtractError::Interrupted) => return Ok(RangeOutcome::Interrupted),
            Err(error) if is_range_failure(&error) => {
                self.record_failure(summary, range, error.to_string());
                return Ok(RangeOutcome::Finished);
            }
            Err(error) => return Err(error),
        };
        if first.total_count == 0 {
            self.progress.record(ProgressEvent::RangeDiscarded { range });
            return Ok(RangeOutcome::Finished);
        }
        if first.total_count > RESULT_CAP {
            if let Some((left, right)) = range.bisect() {
                self.progress.record(ProgressEvent::RangeBisected {
                    range,
                    total: first.total_count,
                });
                queue.push_front(right);
                queue.push_front(left);
            } else {
                self.record_failure(
                    summary,
                    range,
                    format!(
                        "{} results in a {}-second range exceed the {RESULT_CAP}-result cap",
                        first.total_count,
                        range.width_seconds()
                    ),
                );
            }
            return Ok(RangeOutcome::Finished);
        }
        self.paginate(range, first, sink, summary).await
    }

    /// Pages through an in-cap range, appending and flushing per page.
    async fn paginate<W: Write>(
        &self,
        range: TimeRange,
        first: SearchPage,
        sink: &mut CsvSink<W>,
        summary: &mut SweepSummary,
    ) -> Result<RangeOutcome, ExtractError> {
        let mut page = first;
        let mut pages = 0_u32;
        let mut records_in_range = 0_u64;
        loop {
            pages += 1;
            let written = sink.append_page(&page.records)?;
            sink.flush()?;
            records_in_range += written;
            summary.records_written += written;
            self.progress.record(ProgressEvent::PageWritten {
                range,
                page: pages,
                records: written,
            });
            if !page.page_info.has_next_page {
                break;
            }
            let Some(cursor) = page.page_info.end_cursor.take() else {
                self.record_failure(
                    summary,
                    range,
                    "page reported a following page without a cursor".to_owned(),
                );
                return Ok(RangeOutcome::Finished);
            };
            if self.cancel.is_cancelled() {
                return Ok(RangeOutcome::Interrupted);
            }
            page = match self.gateway.search_page(range, Some(cursor)).await {
                Ok(next) => next,
                Err(ExtractError::Interrupted) => return Ok(RangeOutcome::Interrupted),
                Err(error) if is_range_failure(&error) => {
                    self.record_failure(summary, range, error.to_string());
                    return Ok(RangeOutcome::Finished);
                }
                Err(error) => return Err(error),
            };
        }
        summary.ranges_completed += 1;
        self.progress.record(ProgressEvent::RangeCompleted {
            range,
            records: records_in_range,
            pages,
        });
        Ok(RangeOutcome::Finished)
    }

    fn record_failure(&self, summary: &mut SweepSummary, range: TimeRange, reason: String) {
        self.progress.record(ProgressEvent::RangeFailed {
            range,
            reason: reason.clone(),
        });
        summary.failed.push(FailedRange { range, reason });
    }
}

/// Whether an error is isolated to the range that produced it.
///
/// Exhausted retries and per-query schema mismatches exclude the range and
/// let the run continue; everything else (auth, query, sink I/O) aborts.
const fn is_range_failure(error: &ExtractError) -> bool {
    matches!(
        error,
        ExtractError::RetriesExhausted { .. } | ExtractError::Schema { .. }
    )
}
