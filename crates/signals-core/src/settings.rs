//! The single-row settings table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service-wide knobs, stored as one row and read on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
  /// Cosine threshold above which the (external) pipeline suggests merging
  /// a candidate into an existing topic.
  pub merge_threshold: f64,
  /// Score decay half-life in days, snapshotted into scoring runs.
  pub half_life_days:  f64,
  /// Mentions scoring below this are dropped at ingest time.
  pub min_relevance:   f64,
  /// When set, committing a decision batch also requests a chunk/tag re-run.
  pub auto_chunk_tag:  bool,
  pub updated_at:      Option<DateTime<Utc>>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      merge_threshold: 0.5,
      half_life_days:  21.0,
      min_relevance:   0.35,
      auto_chunk_tag:  false,
      updated_at:      None,
    }
  }
}
