//! CSV output sink for extracted pull request rows.
//!
//! Rows are appended and flushed page by page so that a killed process
//! still leaves a valid, parseable artifact behind: the header plus every
//! complete row written so far.

mod csv_sink;

pub use csv_sink::{COLUMNS, CsvSink};
