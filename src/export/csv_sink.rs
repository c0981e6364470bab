//! CSV writing for pull request records.

use std::fs::File;
use std::io::Write;

use camino::Utf8Path;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::github::{ExtractError, PullRequestRecord};

/// Output column names, in order. The header row matches the original
/// artifact exactly, including the dotted column names.
pub const COLUMNS: [&str; 9] = [
    "number",
    "title",
    "created_at",
    "merged_at",
    "user.type",
    "base.ref",
    "comments",
    "additions",
    "deletions",
];

/// Append-only CSV sink.
///
/// The header is written at construction, so the artifact is parseable
/// before the first record arrives. Text fields are quoted per standard
/// CSV rules by the underlying writer.
pub struct CsvSink<W: Write> {
    inner: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Creates the output file and writes the header row.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Io`] when the file cannot be created or
    /// [`ExtractError::Csv`] when the header cannot be written.
    pub fn create(path: &Utf8Path) -> Result<Self, ExtractError> {
        let file = File::create(path).map_err(|error| ExtractError::Io {
            message: format!("failed to create output file '{path}': {error}"),
        })?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wraps a writer and emits the header row.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Csv`] when the header cannot be written.
    pub fn from_writer(writer: W) -> Result<Self, ExtractError> {
        let mut inner = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        inner.write_record(COLUMNS).map_err(|error| csv_error(&error))?;
        Ok(Self { inner })
    }

    /// Appends one page of records, returning how many rows were written.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Csv`] when serialising a row fails.
    pub fn append_page(&mut self, records: &[PullRequestRecord]) -> Result<u64, ExtractError> {
        let mut written = 0_u64;
        for record in records {
            self.inner
                .serialize(Row::from(record))
                .map_err(|error| csv_error(&error))?;
            written += 1;
        }
        Ok(written)
    }

    /// Flushes buffered rows to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Io`] when the flush fails.
    pub fn flush(&mut self) -> Result<(), ExtractError> {
        self.inner.flush().map_err(|error| ExtractError::Io {
            message: error.to_string(),
        })
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Io`] when the final flush fails.
    pub fn into_inner(self) -> Result<W, ExtractError> {
        self.inner.into_inner().map_err(|error| ExtractError::Io {
            message: error.to_string(),
        })
    }
}

/// One CSV row, borrowing from the record it renders.
#[derive(Serialize)]
struct Row<'a> {
    number: u64,
    title: &'a str,
    created_at: String,
    merged_at: String,
    #[serde(rename = "user.type")]
    user_type: &'a str,
    #[serde(rename = "base.ref")]
    base_ref: &'a str,
    comments: u64,
    additions: u64,
    deletions: u64,
}

impl<'a> From<&'a PullRequestRecord> for Row<'a> {
    fn from(record: &'a PullRequestRecord) -> Self {
        Self {
            number: record.number,
            title: record.title.as_str(),
            created_at: format_timestamp(record.created_at),
            merged_at: record.merged_at.map(format_timestamp).unwrap_or_default(),
            user_type: record.author_type.as_str(),
            base_ref: record.base_ref.as_str(),
            comments: record.comments,
            additions: record.additions,
            deletions: record.deletions,
        }
    }
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn csv_error(error: &csv::Error) -> ExtractError {
    ExtractError::Csv {
        message: error.to_string(),
    }
}
