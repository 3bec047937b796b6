//! Error type for ingestion entry points.
//!
//! Pipeline failures are deliberately absent: they are recovered via the
//! heuristic fallback and surface only as a warning on the outcome.

use thiserror::Error;

use crate::batch::BatchError;

#[derive(Debug, Error)]
pub enum IngestError<E: std::error::Error> {
  #[error(transparent)]
  Batch(#[from] BatchError),

  #[error("store error: {0}")]
  Store(#[source] E),
}
