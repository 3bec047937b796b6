//! Scoring runs and per-topic score snapshots.
//!
//! This service only *enqueues* runs and reads score rows back; the score
//! computation itself is an external collaborator that advances `status`,
//! fills `finished_at`/`error`, and upserts `TopicScore` rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a scoring run. Inserted as `Queued`; never advanced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
  Queued,
  Running,
  Finished,
  Failed,
}

/// One scoring configuration snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRun {
  pub run_id:         Uuid,
  /// Free text: `"manual"` from the trigger endpoint; external writers use
  /// their own markers.
  pub run_type:       String,
  pub half_life_days: Option<f64>,
  pub min_relevance:  Option<f64>,
  pub rollup_alpha:   Option<f64>,
  pub notes:          Option<String>,
  pub status:         RunStatus,
  pub finished_at:    Option<DateTime<Utc>>,
  pub error:          Option<String>,
  pub run_at:         DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewScoringRun {
  pub run_type:       String,
  pub half_life_days: Option<f64>,
  pub min_relevance:  Option<f64>,
  pub rollup_alpha:   Option<f64>,
  pub notes:          Option<String>,
}

/// Per-topic output of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicScore {
  pub run_id:          Uuid,
  pub topic_id:        String,
  pub direct_score:    f64,
  /// Aggregated contribution from child topics.
  pub rollup_score:    f64,
  pub total_score:     f64,
  pub num_mentions:    i64,
  pub last_mention_at: Option<DateTime<Utc>>,
  /// Free-form per-component breakdown written by newer scorers.
  pub breakdown:       Option<serde_json::Value>,
}
