//! Session, speaker, utterance, and chunk rows.
//!
//! A session is the envelope for one ingested meeting. Speakers and
//! utterances exist only when a structured transcript was supplied; chunks
//! are always present and are the evidence anchor mentions point at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A meeting/ingest event. Created on ingestion, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub session_id:   Uuid,
  pub title:        String,
  /// Free-form marker such as `customer_call` or `refinement`.
  pub meeting_type: String,
  pub started_at:   Option<DateTime<Utc>>,
  pub ended_at:     Option<DateTime<Utc>>,
  pub created_at:   DateTime<Utc>,
}

/// Input for [`crate::store::SignalStore::create_session`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSession {
  pub title:        String,
  pub meeting_type: Option<String>,
  pub started_at:   Option<DateTime<Utc>>,
  pub ended_at:     Option<DateTime<Utc>>,
}

/// A meeting participant. Speakers are global, not per-session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Speaker {
  pub speaker_id:   Uuid,
  pub display_name: String,
  pub email:        Option<String>,
  pub is_internal:  bool,
  pub org:          Option<String>,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSpeaker {
  pub display_name: String,
  pub email:        Option<String>,
  pub is_internal:  bool,
  pub org:          Option<String>,
}

/// One raw transcript turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
  pub utterance_id: Uuid,
  pub session_id:   Uuid,
  pub speaker_id:   Uuid,
  pub start_sec:    f64,
  pub end_sec:      Option<f64>,
  pub text:         String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUtterance {
  pub speaker_id: Uuid,
  pub start_sec:  f64,
  pub end_sec:    Option<f64>,
  pub text:       String,
}

/// A unit of transcript text used as the evidence anchor for mentions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
  pub chunk_id:     Uuid,
  pub session_id:   Uuid,
  pub speaker_id:   Option<Uuid>,
  pub start_sec:    Option<f64>,
  pub end_sec:      Option<f64>,
  pub text:         String,
  /// SHA-256 hex digest of `text`.
  pub content_hash: String,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChunk {
  pub speaker_id:   Option<Uuid>,
  pub start_sec:    Option<f64>,
  pub end_sec:      Option<f64>,
  pub text:         String,
  pub content_hash: String,
}
