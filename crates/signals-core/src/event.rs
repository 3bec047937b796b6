//! Append-only audit log rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened. Encoded as snake_case strings in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
  SessionIngested,
  CandidateDecided,
  TaxonomyApplied,
  ChunkTagRequested,
  ScoringRunStarted,
  SettingsUpdated,
}

impl EventType {
  pub fn as_str(self) -> &'static str {
    match self {
      EventType::SessionIngested => "session_ingested",
      EventType::CandidateDecided => "candidate_decided",
      EventType::TaxonomyApplied => "taxonomy_applied",
      EventType::ChunkTagRequested => "chunk_tag_requested",
      EventType::ScoringRunStarted => "scoring_run_started",
      EventType::SettingsUpdated => "settings_updated",
    }
  }
}

/// One audit row. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub event_id:     Uuid,
  pub event_type:   EventType,
  pub actor:        String,
  pub payload:      serde_json::Value,
  pub session_id:   Option<Uuid>,
  pub topic_id:     Option<String>,
  pub candidate_id: Option<Uuid>,
  pub run_id:       Option<Uuid>,
  pub created_at:   DateTime<Utc>,
}

/// Input for [`crate::store::SignalStore::log_event`]. Use struct-update
/// syntax to attach foreign keys and a payload:
///
/// ```rust,ignore
/// NewEvent {
///   payload: json!({ "batch_size": 3 }),
///   ..NewEvent::new(EventType::TaxonomyApplied, "admin")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub event_type:   EventType,
  pub actor:        String,
  pub payload:      serde_json::Value,
  pub session_id:   Option<Uuid>,
  pub topic_id:     Option<String>,
  pub candidate_id: Option<Uuid>,
  pub run_id:       Option<Uuid>,
}

impl NewEvent {
  pub fn new(event_type: EventType, actor: impl Into<String>) -> Self {
    Self {
      event_type,
      actor: actor.into(),
      payload: serde_json::Value::Object(Default::default()),
      session_id: None,
      topic_id: None,
      candidate_id: None,
      run_id: None,
    }
  }
}
