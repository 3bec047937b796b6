//! The `SignalStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `signals-store-sqlite`).
//! Higher layers (`signals-api`, `signals-ingest`, the approval workflow)
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  candidate::{CandidateStatus, NewCandidate, TopicCandidate},
  event::{Event, NewEvent},
  mention::{Mention, MentionFilter, NewMention},
  scoring::{NewScoringRun, ScoringRun, TopicScore},
  session::{Chunk, NewChunk, NewSession, NewSpeaker, NewUtterance, Session, Speaker},
  settings::Settings,
  topic::{Topic, TopicAlias, TopicRelation, UpsertTopic},
};

/// Abstraction over a Signals storage backend.
///
/// Each method is one synchronous request-response round against the store;
/// there is no cross-call transaction surface. Batch operations commit as
/// they go, so a failure partway leaves earlier writes in place.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SignalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sessions & transcript rows ────────────────────────────────────────

  /// Create and persist a new session. `created_at` is set by the store.
  fn create_session(
    &self,
    input: NewSession,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  fn get_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  fn add_speaker(
    &self,
    input: NewSpeaker,
  ) -> impl Future<Output = Result<Speaker, Self::Error>> + Send + '_;

  fn add_utterances(
    &self,
    session_id: Uuid,
    rows: Vec<NewUtterance>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Insert chunk rows and return them with their assigned ids, in input
  /// order.
  fn add_chunks(
    &self,
    session_id: Uuid,
    rows: Vec<NewChunk>,
  ) -> impl Future<Output = Result<Vec<Chunk>, Self::Error>> + Send + '_;

  // ── Taxonomy ──────────────────────────────────────────────────────────

  /// Create a topic or update the label/description of an existing one.
  /// Fails if the label collides (case-insensitively) with another topic.
  fn upsert_topic(
    &self,
    input: UpsertTopic,
  ) -> impl Future<Output = Result<Topic, Self::Error>> + Send + '_;

  /// All `active` topics.
  fn list_topics(
    &self,
  ) -> impl Future<Output = Result<Vec<Topic>, Self::Error>> + Send + '_;

  /// Point `alias` at `topic_id`. Idempotent: re-adding an alias that
  /// already exists (ignoring case) returns the existing row.
  fn add_alias<'a>(
    &'a self,
    topic_id: &'a str,
    alias: &'a str,
  ) -> impl Future<Output = Result<TopicAlias, Self::Error>> + Send + 'a;

  fn list_aliases(
    &self,
  ) -> impl Future<Output = Result<Vec<TopicAlias>, Self::Error>> + Send + '_;

  /// Upsert a parent→child edge. Both topics must already exist (enforced
  /// by foreign key, not here). Nothing prevents cycles.
  fn add_relation<'a>(
    &'a self,
    parent_id: &'a str,
    child_id: &'a str,
    rollup_weight: Option<f64>,
  ) -> impl Future<Output = Result<TopicRelation, Self::Error>> + Send + 'a;

  fn list_relations(
    &self,
  ) -> impl Future<Output = Result<Vec<TopicRelation>, Self::Error>> + Send + '_;

  // ── Candidates ────────────────────────────────────────────────────────

  fn add_candidates(
    &self,
    session_id: Option<Uuid>,
    rows: Vec<NewCandidate>,
  ) -> impl Future<Output = Result<Vec<TopicCandidate>, Self::Error>> + Send + '_;

  fn get_candidate(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<TopicCandidate>, Self::Error>> + Send + '_;

  /// List candidates, optionally restricted to one status.
  fn list_candidates(
    &self,
    status: Option<CandidateStatus>,
  ) -> impl Future<Output = Result<Vec<TopicCandidate>, Self::Error>> + Send + '_;

  /// Record a decision on a candidate: status, approver, decision timestamp,
  /// and (for merges) the target topic.
  ///
  /// Transitions are one-way: if the candidate is already decided, only a
  /// move back to `Pending` is accepted; anything else is an error.
  /// Reopening clears approver, decision timestamp, and merge target.
  fn decide_candidate<'a>(
    &'a self,
    id: Uuid,
    status: CandidateStatus,
    approver: &'a str,
    merged_into: Option<String>,
  ) -> impl Future<Output = Result<TopicCandidate, Self::Error>> + Send + 'a;

  // ── Mentions ──────────────────────────────────────────────────────────

  fn add_mentions(
    &self,
    session_id: Uuid,
    rows: Vec<NewMention>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn list_mentions<'a>(
    &'a self,
    filter: &'a MentionFilter,
  ) -> impl Future<Output = Result<Vec<Mention>, Self::Error>> + Send + 'a;

  // ── Scoring ───────────────────────────────────────────────────────────

  /// Insert a new run row with status `queued`. No computation happens here.
  fn start_scoring_run(
    &self,
    input: NewScoringRun,
  ) -> impl Future<Output = Result<ScoringRun, Self::Error>> + Send + '_;

  /// The most recently created run, if any.
  fn latest_scoring_run(
    &self,
  ) -> impl Future<Output = Result<Option<ScoringRun>, Self::Error>> + Send + '_;

  /// Score rows for a run, sorted descending by total score.
  fn scores_for_run(
    &self,
    run_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TopicScore>, Self::Error>> + Send + '_;

  // ── Settings ──────────────────────────────────────────────────────────

  /// The settings row, or defaults if none has been written yet.
  fn get_settings(
    &self,
  ) -> impl Future<Output = Result<Settings, Self::Error>> + Send + '_;

  fn put_settings(
    &self,
    settings: Settings,
  ) -> impl Future<Output = Result<Settings, Self::Error>> + Send + '_;

  // ── Audit log ─────────────────────────────────────────────────────────

  /// Append one audit event. Events are never updated or deleted.
  fn log_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Most recent events first.
  fn list_events(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;
}
