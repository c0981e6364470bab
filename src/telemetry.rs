//! Sweep progress events and sinks.
//!
//! Progress output is advisory: it lets an operator watch a long extraction
//! without affecting the CSV artifact. The sink trait keeps the sweep logic
//! decoupled from where the lines go, which also makes progress observable
//! in tests.

use std::io;

use crate::sweep::TimeRange;

/// A progress event emitted while the sweep runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A range was popped from the work queue and is being probed.
    RangeStarted {
        /// The range being processed.
        range: TimeRange,
    },
    /// A range exceeded the result cap and was split into two halves.
    RangeBisected {
        /// The range that was split.
        range: TimeRange,
        /// Total results the range reported.
        total: u64,
    },
    /// A page of records was appended to the sink and flushed.
    PageWritten {
        /// The range being paginated.
        range: TimeRange,
        /// 1-based page number within the range.
        page: u32,
        /// Records written from this page.
        records: u64,
    },
    /// A range was fully paginated.
    RangeCompleted {
        /// The finished range.
        range: TimeRange,
        /// Records written for the range.
        records: u64,
        /// Pages fetched for the range.
        pages: u32,
    },
    /// A range matched no records and produced no work.
    RangeDiscarded {
        /// The empty range.
        range: TimeRange,
    },
    /// A range could not be completed and was excluded from further work.
    RangeFailed {
        /// The failed range.
        range: TimeRange,
        /// Why the range failed.
        reason: String,
    },
    /// Cancellation was observed and the sweep stopped issuing queries.
    SweepInterrupted,
}

/// A sink that can record progress events.
pub trait ProgressSink: Send + Sync {
    /// Records a progress event.
    fn record(&self, event: ProgressEvent);
}

/// Progress sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn record(&self, _event: ProgressEvent) {}
}

/// Records progress events to stderr as human-readable lines.
#[derive(Debug, Default)]
pub struct StderrProgressSink;

impl ProgressSink for StderrProgressSink {
    fn record(&self, event: ProgressEvent) {
        let _ignored = writeln_stderr(&describe(&event));
    }
}

fn describe(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::RangeStarted { range } => format!("range {range}: scanning"),
        ProgressEvent::RangeBisected { range, total } => {
            format!("range {range}: {total} results exceed the cap; splitting")
        }
        ProgressEvent::PageWritten {
            range,
            page,
            records,
        } => format!("range {range}: page {page}, {records} rows written"),
        ProgressEvent::RangeCompleted {
            range,
            records,
            pages,
        } => format!("range {range}: done ({records} rows over {pages} pages)"),
        ProgressEvent::RangeDiscarded { range } => format!("range {range}: no results"),
        ProgressEvent::RangeFailed { range, reason } => {
            format!("range {range}: FAILED ({reason})")
        }
        ProgressEvent::SweepInterrupted => "interrupted; finishing up".to_owned(),
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use crate::sweep::TimeRange;

    use super::{ProgressEvent, ProgressSink, describe};

    fn sample_range() -> TimeRange {
        let start = DateTime::from_timestamp(1_577_836_800, 0).expect("start should be valid");
        let end = DateTime::from_timestamp(1_577_923_200, 0).expect("end should be valid");
        TimeRange::new(start, end).expect("range should be valid")
    }

    #[derive(Debug, Default)]
    struct RecordingSink {
        events: std::sync::Mutex<Vec<ProgressEvent>>,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<ProgressEvent> {
            self.events
                .lock()
                .expect("events mutex should be available")
                .drain(..)
                .collect()
        }
    }

    impl ProgressSink for RecordingSink {
        fn record(&self, event: ProgressEvent) {
            self.events
                .lock()
                .expect("events mutex should be available")
                .push(event);
        }
    }

    #[test]
    fn recording_sink_captures_events() {
        let sink = RecordingSink::default();
        sink.record(ProgressEvent::RangeDiscarded {
            range: sample_range(),
        });

        assert_eq!(
            sink.take(),
            vec![ProgressEvent::RangeDiscarded {
                range: sample_range(),
            }]
        );
    }

    #[test]
    fn failed_ranges_are_described_with_their_reason() {
        let line = describe(&ProgressEvent::RangeFailed {
            range: sample_range(),
            reason: "giving up after 5 attempts".to_owned(),
        });
        assert!(line.contains("FAILED"));
        assert!(line.contains("giving up after 5 attempts"));
    }
}
