//! Error type for `signals-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown status string: {0:?}")]
  UnknownStatus(String),

  #[error("topic not found: {0}")]
  TopicNotFound(String),

  /// Attempted to decide a candidate that was not found.
  #[error("candidate not found: {0}")]
  CandidateNotFound(Uuid),

  /// Decided candidates may only move back to pending.
  #[error("candidate {id}: transition {from} -> {to} is not allowed")]
  InvalidTransition { id: Uuid, from: String, to: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
