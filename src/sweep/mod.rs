//! Range-partitioned sweep over the configured extraction window.
//!
//! The sweep owns the work-queue algorithm that keeps every query under
//! the search API's result cap: probe a range, bisect it while its total
//! exceeds the cap, paginate it once it fits, and isolate failures so one
//! bad range never aborts the run.

mod cancel;
mod driver;
mod range;
mod summary;


pub use cancel::CancelFlag;
pub use driver::{RESULT_CAP, RangeSweep};
pub use range::TimeRange;
pub use summary::{FailedRange, SweepSummary};
