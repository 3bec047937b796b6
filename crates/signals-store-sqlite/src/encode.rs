//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Status enums are stored as
//! lowercase strings. Event payloads and score breakdowns are stored as
//! compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use signals_core::{
  candidate::{CandidateStatus, TopicCandidate},
  event::{Event, EventType},
  mention::Mention,
  scoring::{RunStatus, ScoringRun, TopicScore},
  session::Session,
  settings::Settings,
  topic::{Topic, TopicAlias, TopicRelation, TopicStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_uuid_opt(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_dt_opt(dt: Option<DateTime<Utc>>) -> Option<String> {
  dt.map(encode_dt)
}

pub fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Status enums ────────────────────────────────────────────────────────────

pub fn decode_topic_status(s: &str) -> Result<TopicStatus> {
  match s {
    "active" => Ok(TopicStatus::Active),
    "archived" => Ok(TopicStatus::Archived),
    other => Err(Error::UnknownStatus(other.into())),
  }
}

pub fn encode_candidate_status(s: CandidateStatus) -> &'static str {
  s.as_str()
}

pub fn decode_candidate_status(s: &str) -> Result<CandidateStatus> {
  match s {
    "pending" => Ok(CandidateStatus::Pending),
    "approved" => Ok(CandidateStatus::Approved),
    "rejected" => Ok(CandidateStatus::Rejected),
    "merged" => Ok(CandidateStatus::Merged),
    other => Err(Error::UnknownStatus(other.into())),
  }
}

pub fn decode_run_status(s: &str) -> Result<RunStatus> {
  match s {
    "queued" => Ok(RunStatus::Queued),
    "running" => Ok(RunStatus::Running),
    "finished" => Ok(RunStatus::Finished),
    "failed" => Ok(RunStatus::Failed),
    other => Err(Error::UnknownStatus(other.into())),
  }
}

pub fn decode_event_type(s: &str) -> Result<EventType> {
  match s {
    "session_ingested" => Ok(EventType::SessionIngested),
    "candidate_decided" => Ok(EventType::CandidateDecided),
    "taxonomy_applied" => Ok(EventType::TaxonomyApplied),
    "chunk_tag_requested" => Ok(EventType::ChunkTagRequested),
    "scoring_run_started" => Ok(EventType::ScoringRunStarted),
    "settings_updated" => Ok(EventType::SettingsUpdated),
    other => Err(Error::UnknownStatus(other.into())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `sessions` row.
pub struct RawSession {
  pub session_id:   String,
  pub title:        String,
  pub meeting_type: String,
  pub started_at:   Option<String>,
  pub ended_at:     Option<String>,
  pub created_at:   String,
}

impl RawSession {
  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      session_id:   decode_uuid(&self.session_id)?,
      title:        self.title,
      meeting_type: self.meeting_type,
      started_at:   decode_dt_opt(self.started_at.as_deref())?,
      ended_at:     decode_dt_opt(self.ended_at.as_deref())?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `topics` row.
pub struct RawTopic {
  pub id:          String,
  pub label:       String,
  pub description: Option<String>,
  pub status:      String,
  pub created_by:  String,
  pub created_at:  String,
}

impl RawTopic {
  pub fn into_topic(self) -> Result<Topic> {
    Ok(Topic {
      id:          self.id,
      label:       self.label,
      description: self.description,
      status:      decode_topic_status(&self.status)?,
      created_by:  self.created_by,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawAlias {
  pub alias_id:   String,
  pub topic_id:   String,
  pub alias:      String,
  pub created_at: String,
}

impl RawAlias {
  pub fn into_alias(self) -> Result<TopicAlias> {
    Ok(TopicAlias {
      alias_id:   decode_uuid(&self.alias_id)?,
      topic_id:   self.topic_id,
      alias:      self.alias,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawRelation {
  pub parent_id:     String,
  pub child_id:      String,
  pub relation_type: String,
  pub rollup_weight: Option<f64>,
  pub created_at:    String,
}

impl RawRelation {
  pub fn into_relation(self) -> Result<TopicRelation> {
    Ok(TopicRelation {
      parent_id:     self.parent_id,
      child_id:      self.child_id,
      relation_type: self.relation_type,
      rollup_weight: self.rollup_weight,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `topic_candidates` row.
pub struct RawCandidate {
  pub candidate_id:       String,
  pub session_id:         Option<String>,
  pub topic_id_suggested: String,
  pub label:              String,
  pub evidence:           String,
  pub why_new:            String,
  pub status:             String,
  pub merged_into_topic:  Option<String>,
  pub approver:           Option<String>,
  pub decided_at:         Option<String>,
  pub created_at:         String,
}

impl RawCandidate {
  pub fn into_candidate(self) -> Result<TopicCandidate> {
    Ok(TopicCandidate {
      candidate_id:       decode_uuid(&self.candidate_id)?,
      session_id:         decode_uuid_opt(self.session_id.as_deref())?,
      topic_id_suggested: self.topic_id_suggested,
      label:              self.label,
      evidence:           self.evidence,
      why_new:            self.why_new,
      status:             decode_candidate_status(&self.status)?,
      merged_into_topic:  self.merged_into_topic,
      approver:           self.approver,
      decided_at:         decode_dt_opt(self.decided_at.as_deref())?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `mentions` row.
pub struct RawMention {
  pub mention_id:   String,
  pub session_id:   String,
  pub chunk_id:     String,
  pub topic_id:     String,
  pub evidence:     String,
  pub surface_term: Option<String>,
  pub relevance:    Option<f64>,
  pub importance:   Option<f64>,
  pub specificity:  Option<f64>,
  pub mentioned_at: String,
  pub created_at:   String,
}

impl RawMention {
  pub fn into_mention(self) -> Result<Mention> {
    Ok(Mention {
      mention_id:   decode_uuid(&self.mention_id)?,
      session_id:   decode_uuid(&self.session_id)?,
      chunk_id:     decode_uuid(&self.chunk_id)?,
      topic_id:     self.topic_id,
      evidence:     self.evidence,
      surface_term: self.surface_term,
      relevance:    self.relevance,
      importance:   self.importance,
      specificity:  self.specificity,
      mentioned_at: decode_dt(&self.mentioned_at)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `scoring_runs` row.
pub struct RawScoringRun {
  pub run_id:         String,
  pub run_type:       String,
  pub half_life_days: Option<f64>,
  pub min_relevance:  Option<f64>,
  pub rollup_alpha:   Option<f64>,
  pub notes:          Option<String>,
  pub status:         String,
  pub finished_at:    Option<String>,
  pub error:          Option<String>,
  pub run_at:         String,
}

impl RawScoringRun {
  pub fn into_run(self) -> Result<ScoringRun> {
    Ok(ScoringRun {
      run_id:         decode_uuid(&self.run_id)?,
      run_type:       self.run_type,
      half_life_days: self.half_life_days,
      min_relevance:  self.min_relevance,
      rollup_alpha:   self.rollup_alpha,
      notes:          self.notes,
      status:         decode_run_status(&self.status)?,
      finished_at:    decode_dt_opt(self.finished_at.as_deref())?,
      error:          self.error,
      run_at:         decode_dt(&self.run_at)?,
    })
  }
}

pub struct RawTopicScore {
  pub run_id:          String,
  pub topic_id:        String,
  pub direct_score:    f64,
  pub rollup_score:    f64,
  pub total_score:     f64,
  pub num_mentions:    i64,
  pub last_mention_at: Option<String>,
  pub breakdown_json:  Option<String>,
}

impl RawTopicScore {
  pub fn into_score(self) -> Result<TopicScore> {
    let breakdown = self
      .breakdown_json
      .as_deref()
      .map(serde_json::from_str)
      .transpose()?;

    Ok(TopicScore {
      run_id: decode_uuid(&self.run_id)?,
      topic_id: self.topic_id,
      direct_score: self.direct_score,
      rollup_score: self.rollup_score,
      total_score: self.total_score,
      num_mentions: self.num_mentions,
      last_mention_at: decode_dt_opt(self.last_mention_at.as_deref())?,
      breakdown,
    })
  }
}

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub event_id:     String,
  pub event_type:   String,
  pub actor:        String,
  pub payload_json: String,
  pub session_id:   Option<String>,
  pub topic_id:     Option<String>,
  pub candidate_id: Option<String>,
  pub run_id:       Option<String>,
  pub created_at:   String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:     decode_uuid(&self.event_id)?,
      event_type:   decode_event_type(&self.event_type)?,
      actor:        self.actor,
      payload:      serde_json::from_str(&self.payload_json)?,
      session_id:   decode_uuid_opt(self.session_id.as_deref())?,
      topic_id:     self.topic_id,
      candidate_id: decode_uuid_opt(self.candidate_id.as_deref())?,
      run_id:       decode_uuid_opt(self.run_id.as_deref())?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from the single `settings` row.
pub struct RawSettings {
  pub merge_threshold: f64,
  pub half_life_days:  f64,
  pub min_relevance:   f64,
  pub auto_chunk_tag:  bool,
  pub updated_at:      Option<String>,
}

impl RawSettings {
  pub fn into_settings(self) -> Result<Settings> {
    Ok(Settings {
      merge_threshold: self.merge_threshold,
      half_life_days:  self.half_life_days,
      min_relevance:   self.min_relevance,
      auto_chunk_tag:  self.auto_chunk_tag,
      updated_at:      decode_dt_opt(self.updated_at.as_deref())?,
    })
  }
}
