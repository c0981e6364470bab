//! End-of-run accounting for the sweep.

use std::io::Write;

use crate::github::ExtractError;

use super::range::TimeRange;

/// A range that could not be completed, with the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRange {
    /// Bounds of the failed range, so an operator can re-run just this
    /// window.
    pub range: TimeRange,
    /// Why the range failed.
    pub reason: String,
}

/// Totals and failures accumulated over one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Rows appended to the sink.
    pub records_written: u64,
    /// Ranges paginated to exhaustion.
    pub ranges_completed: u32,
    /// Ranges excluded after their failures were recorded.
    pub failed: Vec<FailedRange>,
    /// Whether cancellation stopped the sweep before the queue drained.
    pub interrupted: bool,
}

impl SweepSummary {
    /// Whether the sweep covered the whole window without failures.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.interrupted
    }

    /// Writes the human-readable end-of-run report.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Io`] when writing fails.
    pub fn write_report<W: Write>(&self, writer: &mut W) -> Result<(), ExtractError> {
        writeln!(
            writer,
            "Wrote {} pull requests across {} completed ranges.",
            self.records_written, self.ranges_completed
        )
        .map_err(|error| io_error(&error))?;
        if self.interrupted {
            writeln!(
                writer,
                "Interrupted before completion; the output holds every page fetched so far."
            )
            .map_err(|error| io_error(&error))?;
        }
        if !self.failed.is_empty() {
            writeln!(writer, "{} range(s) failed:", self.failed.len())
                .map_err(|error| io_error(&error))?;
            for failure in &self.failed {
                writeln!(writer, "  {}: {}", failure.range, failure.reason)
                    .map_err(|error| io_error(&error))?;
            }
        }
        Ok(())
    }
}

fn io_error(error: &std::io::Error) -> ExtractError {
    ExtractError::Io {
        message: error.to_string(),
    }
}
