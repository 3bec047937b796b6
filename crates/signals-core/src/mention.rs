//! Mentions — evidence that a topic was discussed in a specific chunk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Evidence linking a chunk to a topic.
///
/// `mentioned_at` is when the topic came up in the meeting, distinct from
/// `created_at` (when the row was inserted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
  pub mention_id:   Uuid,
  pub session_id:   Uuid,
  pub chunk_id:     Uuid,
  pub topic_id:     String,
  pub evidence:     String,
  /// The literal wording that triggered the match, if the tagger reported
  /// one.
  pub surface_term: Option<String>,
  pub relevance:    Option<f64>,
  pub importance:   Option<f64>,
  pub specificity:  Option<f64>,
  pub mentioned_at: DateTime<Utc>,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMention {
  pub chunk_id:     Uuid,
  pub topic_id:     String,
  pub evidence:     String,
  pub surface_term: Option<String>,
  pub relevance:    Option<f64>,
  pub importance:   Option<f64>,
  pub specificity:  Option<f64>,
  pub mentioned_at: DateTime<Utc>,
}

/// Parameters for [`crate::store::SignalStore::list_mentions`].
#[derive(Debug, Clone, Default)]
pub struct MentionFilter {
  pub session_id: Option<Uuid>,
  pub topic_id:   Option<String>,
}
