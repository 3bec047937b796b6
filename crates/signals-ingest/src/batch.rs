//! CSV batch parsing.
//!
//! Required columns are validated against the header before any row is
//! processed; a bad date in an individual row only warns and leaves the
//! timestamp unset (callers default it to now).

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::dates::parse_flexible_date;

pub const COLUMN_TITLE: &str = "title";
pub const COLUMN_CONTENT: &str = "content";
pub const COLUMN_DATE: &str = "date";

#[derive(Debug, Error)]
pub enum BatchError {
  #[error("missing required column: {0}")]
  MissingColumn(&'static str),

  #[error("csv parse error: {0}")]
  Csv(#[from] csv::Error),
}

/// One parsed CSV row. `started_at` is `None` when no date column exists or
/// the value was unparseable.
#[derive(Debug, Clone)]
pub struct CsvRow {
  pub title:      String,
  pub content:    String,
  pub started_at: Option<DateTime<Utc>>,
}

/// Parse a whole CSV document into rows, validating the header eagerly.
pub fn parse_batch(csv_text: &str) -> Result<Vec<CsvRow>, BatchError> {
  let mut reader = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .from_reader(csv_text.as_bytes());

  let headers = reader.headers()?.clone();
  let column = |name: &str| {
    headers
      .iter()
      .position(|h| h.eq_ignore_ascii_case(name))
  };

  let title_idx =
    column(COLUMN_TITLE).ok_or(BatchError::MissingColumn(COLUMN_TITLE))?;
  let content_idx =
    column(COLUMN_CONTENT).ok_or(BatchError::MissingColumn(COLUMN_CONTENT))?;
  let date_idx = column(COLUMN_DATE);

  let mut rows = Vec::new();
  for record in reader.records() {
    let record = record?;

    let raw_date = date_idx.and_then(|i| record.get(i)).unwrap_or("");
    let started_at = parse_flexible_date(raw_date);
    if started_at.is_none() && !raw_date.trim().is_empty() {
      warn!(value = raw_date, "unparseable date in CSV row; defaulting to now");
    }

    rows.push(CsvRow {
      title:      record.get(title_idx).unwrap_or("").to_string(),
      content:    record.get(content_idx).unwrap_or("").to_string(),
      started_at,
    });
  }

  Ok(rows)
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::{BatchError, parse_batch};

  #[test]
  fn parses_rows_with_dates() {
    let rows = parse_batch(
      "title,content,date\n\
       Sync,We discussed the feature.,2024-01-15\n\
       Retro,Timeline slipped.,01/15/2024\n",
    )
    .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].title, "Sync");
    assert_eq!(
      rows[0].started_at,
      Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
    );
    assert_eq!(rows[1].started_at, rows[0].started_at);
  }

  #[test]
  fn missing_required_column_fails_before_rows() {
    let err = parse_batch("title,when\nSync,2024-01-15\n").unwrap_err();
    assert!(matches!(err, BatchError::MissingColumn("content")));
  }

  #[test]
  fn headers_match_case_insensitively() {
    let rows = parse_batch("Title,Content\nSync,hello\n").unwrap();
    assert_eq!(rows[0].content, "hello");
  }

  #[test]
  fn bad_date_leaves_timestamp_unset() {
    let rows =
      parse_batch("title,content,date\nSync,hello,<b>2024</b>\n").unwrap();
    assert!(rows[0].started_at.is_none());
  }

  #[test]
  fn date_column_is_optional() {
    let rows = parse_batch("title,content\nSync,hello\n").unwrap();
    assert!(rows[0].started_at.is_none());
  }
}
