//! [`SqliteStore`] — the SQLite implementation of [`SignalStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use signals_core::{
  candidate::{CandidateStatus, NewCandidate, TopicCandidate},
  event::{Event, NewEvent},
  mention::{Mention, MentionFilter, NewMention},
  scoring::{NewScoringRun, RunStatus, ScoringRun, TopicScore},
  session::{Chunk, NewChunk, NewSession, NewSpeaker, NewUtterance, Session, Speaker},
  settings::Settings,
  store::SignalStore,
  topic::{Topic, TopicAlias, TopicRelation, UpsertTopic},
};

use crate::{
  Error, Result,
  encode::{
    RawAlias, RawCandidate, RawEvent, RawMention, RawRelation, RawScoringRun,
    RawSession, RawSettings, RawTopic, RawTopicScore, encode_candidate_status,
    encode_dt, encode_dt_opt, encode_uuid,
  },
  schema::{MIGRATION_V2, SCHEMA_V1},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Signals store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All access
/// is serialised through the connection's dedicated thread, which is the
/// only concurrency control this service needs.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let version: i64 =
          conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        if version < 1 {
          conn.execute_batch(SCHEMA_V1)?;
        }
        if version < 2 {
          conn.execute_batch(MIGRATION_V2)?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_candidate(&self, id: Uuid) -> Result<Option<TopicCandidate>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCandidate> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT candidate_id, session_id, topic_id_suggested, label,
                      evidence, why_new, status, merged_into_topic, approver,
                      decided_at, created_at
               FROM topic_candidates WHERE candidate_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawCandidate {
                  candidate_id:       row.get(0)?,
                  session_id:         row.get(1)?,
                  topic_id_suggested: row.get(2)?,
                  label:              row.get(3)?,
                  evidence:           row.get(4)?,
                  why_new:            row.get(5)?,
                  status:             row.get(6)?,
                  merged_into_topic:  row.get(7)?,
                  approver:           row.get(8)?,
                  decided_at:         row.get(9)?,
                  created_at:         row.get(10)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCandidate::into_candidate).transpose()
  }

  async fn fetch_topic(&self, id: String) -> Result<Option<Topic>> {
    let raw: Option<RawTopic> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, label, description, status, created_by, created_at
               FROM topics WHERE id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawTopic {
                  id:          row.get(0)?,
                  label:       row.get(1)?,
                  description: row.get(2)?,
                  status:      row.get(3)?,
                  created_by:  row.get(4)?,
                  created_at:  row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTopic::into_topic).transpose()
  }
}

// ─── SignalStore impl ────────────────────────────────────────────────────────

impl SignalStore for SqliteStore {
  type Error = Error;

  // ── Sessions & transcript rows ────────────────────────────────────────────

  async fn create_session(&self, input: NewSession) -> Result<Session> {
    let session = Session {
      session_id:   Uuid::new_v4(),
      title:        input.title,
      meeting_type: input.meeting_type.unwrap_or_else(|| "unknown".to_string()),
      started_at:   input.started_at,
      ended_at:     input.ended_at,
      created_at:   Utc::now(),
    };

    let id_str       = encode_uuid(session.session_id);
    let title        = session.title.clone();
    let meeting_type = session.meeting_type.clone();
    let started_str  = encode_dt_opt(session.started_at);
    let ended_str    = encode_dt_opt(session.ended_at);
    let created_str  = encode_dt(session.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (session_id, title, meeting_type, started_at, ended_at, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, title, meeting_type, started_str, ended_str, created_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT session_id, title, meeting_type, started_at, ended_at, created_at
               FROM sessions WHERE session_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawSession {
                  session_id:   row.get(0)?,
                  title:        row.get(1)?,
                  meeting_type: row.get(2)?,
                  started_at:   row.get(3)?,
                  ended_at:     row.get(4)?,
                  created_at:   row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn add_speaker(&self, input: NewSpeaker) -> Result<Speaker> {
    let speaker = Speaker {
      speaker_id:   Uuid::new_v4(),
      display_name: input.display_name,
      email:        input.email,
      is_internal:  input.is_internal,
      org:          input.org,
      created_at:   Utc::now(),
    };

    let id_str      = encode_uuid(speaker.speaker_id);
    let name        = speaker.display_name.clone();
    let email       = speaker.email.clone();
    let is_internal = speaker.is_internal;
    let org         = speaker.org.clone();
    let created_str = encode_dt(speaker.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO speakers (speaker_id, display_name, email, is_internal, org, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, email, is_internal, org, created_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(speaker)
  }

  async fn add_utterances(
    &self,
    session_id: Uuid,
    rows: Vec<NewUtterance>,
  ) -> Result<usize> {
    let session_str = encode_uuid(session_id);
    let encoded: Vec<(String, String, f64, Option<f64>, String)> = rows
      .into_iter()
      .map(|u| {
        (
          encode_uuid(Uuid::new_v4()),
          encode_uuid(u.speaker_id),
          u.start_sec,
          u.end_sec,
          u.text,
        )
      })
      .collect();
    let count = encoded.len();

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "INSERT INTO utterances (utterance_id, session_id, speaker_id, start_sec, end_sec, text)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (id, speaker, start, end, text) in encoded {
          stmt.execute(rusqlite::params![id, session_str, speaker, start, end, text])?;
        }
        Ok(())
      })
      .await?;

    Ok(count)
  }

  async fn add_chunks(
    &self,
    session_id: Uuid,
    rows: Vec<NewChunk>,
  ) -> Result<Vec<Chunk>> {
    let now = Utc::now();
    let chunks: Vec<Chunk> = rows
      .into_iter()
      .map(|c| Chunk {
        chunk_id:     Uuid::new_v4(),
        session_id,
        speaker_id:   c.speaker_id,
        start_sec:    c.start_sec,
        end_sec:      c.end_sec,
        text:         c.text,
        content_hash: c.content_hash,
        created_at:   now,
      })
      .collect();

    let session_str = encode_uuid(session_id);
    let encoded: Vec<(String, Option<String>, Option<f64>, Option<f64>, String, String, String)> =
      chunks
        .iter()
        .map(|c| {
          (
            encode_uuid(c.chunk_id),
            c.speaker_id.map(encode_uuid),
            c.start_sec,
            c.end_sec,
            c.text.clone(),
            c.content_hash.clone(),
            encode_dt(c.created_at),
          )
        })
        .collect();

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "INSERT INTO chunks (chunk_id, session_id, speaker_id, start_sec, end_sec, text, content_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for (id, speaker, start, end, text, hash, created) in encoded {
          stmt.execute(rusqlite::params![
            id,
            session_str,
            speaker,
            start,
            end,
            text,
            hash,
            created
          ])?;
        }
        Ok(())
      })
      .await?;

    Ok(chunks)
  }

  // ── Taxonomy ──────────────────────────────────────────────────────────────

  async fn upsert_topic(&self, input: UpsertTopic) -> Result<Topic> {
    let id          = input.id.clone();
    let label       = input.label.clone();
    let description = input.description.clone();
    let created_by  = input.created_by.clone();
    let created_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO topics (id, label, description, status, created_by, created_at)
           VALUES (?1, ?2, ?3, 'active', ?4, ?5)
           ON CONFLICT(id) DO UPDATE SET
             label       = excluded.label,
             description = COALESCE(excluded.description, topics.description)",
          rusqlite::params![id, label, description, created_by, created_str],
        )?;
        Ok(())
      })
      .await?;

    self
      .fetch_topic(input.id.clone())
      .await?
      .ok_or(Error::TopicNotFound(input.id))
  }

  async fn list_topics(&self) -> Result<Vec<Topic>> {
    let raws: Vec<RawTopic> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, label, description, status, created_by, created_at
           FROM topics WHERE status = 'active' ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawTopic {
              id:          row.get(0)?,
              label:       row.get(1)?,
              description: row.get(2)?,
              status:      row.get(3)?,
              created_by:  row.get(4)?,
              created_at:  row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTopic::into_topic).collect()
  }

  async fn add_alias(&self, topic_id: &str, alias: &str) -> Result<TopicAlias> {
    let topic_str   = topic_id.to_string();
    let alias_str   = alias.to_string();
    let id_str      = encode_uuid(Uuid::new_v4());
    let created_str = encode_dt(Utc::now());

    let raw: RawAlias = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO topic_aliases (alias_id, topic_id, alias, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(topic_id, alias) DO NOTHING",
          rusqlite::params![id_str, topic_str, alias_str, created_str],
        )?;

        // The alias column is NOCASE, so this also finds a pre-existing row
        // that differs only in case.
        let row = conn.query_row(
          "SELECT alias_id, topic_id, alias, created_at
           FROM topic_aliases WHERE topic_id = ?1 AND alias = ?2",
          rusqlite::params![topic_str, alias_str],
          |row| {
            Ok(RawAlias {
              alias_id:   row.get(0)?,
              topic_id:   row.get(1)?,
              alias:      row.get(2)?,
              created_at: row.get(3)?,
            })
          },
        )?;
        Ok(row)
      })
      .await?;

    raw.into_alias()
  }

  async fn list_aliases(&self) -> Result<Vec<TopicAlias>> {
    let raws: Vec<RawAlias> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT alias_id, topic_id, alias, created_at
           FROM topic_aliases ORDER BY topic_id, alias",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawAlias {
              alias_id:   row.get(0)?,
              topic_id:   row.get(1)?,
              alias:      row.get(2)?,
              created_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAlias::into_alias).collect()
  }

  async fn add_relation(
    &self,
    parent_id: &str,
    child_id: &str,
    rollup_weight: Option<f64>,
  ) -> Result<TopicRelation> {
    let parent_str  = parent_id.to_string();
    let child_str   = child_id.to_string();
    let created_str = encode_dt(Utc::now());

    let raw: RawRelation = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO topic_relations (parent_id, child_id, relation_type, rollup_weight, created_at)
           VALUES (?1, ?2, 'parent_child', ?3, ?4)
           ON CONFLICT(parent_id, child_id, relation_type)
           DO UPDATE SET rollup_weight = excluded.rollup_weight",
          rusqlite::params![parent_str, child_str, rollup_weight, created_str],
        )?;

        let row = conn.query_row(
          "SELECT parent_id, child_id, relation_type, rollup_weight, created_at
           FROM topic_relations
           WHERE parent_id = ?1 AND child_id = ?2 AND relation_type = 'parent_child'",
          rusqlite::params![parent_str, child_str],
          |row| {
            Ok(RawRelation {
              parent_id:     row.get(0)?,
              child_id:      row.get(1)?,
              relation_type: row.get(2)?,
              rollup_weight: row.get(3)?,
              created_at:    row.get(4)?,
            })
          },
        )?;
        Ok(row)
      })
      .await?;

    raw.into_relation()
  }

  async fn list_relations(&self) -> Result<Vec<TopicRelation>> {
    let raws: Vec<RawRelation> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT parent_id, child_id, relation_type, rollup_weight, created_at
           FROM topic_relations ORDER BY parent_id, child_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRelation {
              parent_id:     row.get(0)?,
              child_id:      row.get(1)?,
              relation_type: row.get(2)?,
              rollup_weight: row.get(3)?,
              created_at:    row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRelation::into_relation).collect()
  }

  // ── Candidates ────────────────────────────────────────────────────────────

  async fn add_candidates(
    &self,
    session_id: Option<Uuid>,
    rows: Vec<NewCandidate>,
  ) -> Result<Vec<TopicCandidate>> {
    let now = Utc::now();
    let candidates: Vec<TopicCandidate> = rows
      .into_iter()
      .map(|c| TopicCandidate {
        candidate_id:       Uuid::new_v4(),
        session_id,
        topic_id_suggested: c.topic_id_suggested,
        label:              c.label,
        evidence:           c.evidence,
        why_new:            c.why_new,
        status:             CandidateStatus::Pending,
        merged_into_topic:  None,
        approver:           None,
        decided_at:         None,
        created_at:         now,
      })
      .collect();

    let session_str = session_id.map(encode_uuid);
    let encoded: Vec<(String, String, String, String, String, String)> = candidates
      .iter()
      .map(|c| {
        (
          encode_uuid(c.candidate_id),
          c.topic_id_suggested.clone(),
          c.label.clone(),
          c.evidence.clone(),
          c.why_new.clone(),
          encode_dt(c.created_at),
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "INSERT INTO topic_candidates
             (candidate_id, session_id, topic_id_suggested, label, evidence, why_new, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7)",
        )?;
        for (id, suggested, label, evidence, why_new, created) in encoded {
          stmt.execute(rusqlite::params![
            id,
            session_str,
            suggested,
            label,
            evidence,
            why_new,
            created
          ])?;
        }
        Ok(())
      })
      .await?;

    Ok(candidates)
  }

  async fn get_candidate(&self, id: Uuid) -> Result<Option<TopicCandidate>> {
    self.fetch_candidate(id).await
  }

  async fn list_candidates(
    &self,
    status: Option<CandidateStatus>,
  ) -> Result<Vec<TopicCandidate>> {
    let status_str = status.map(encode_candidate_status).map(str::to_owned);

    let raws: Vec<RawCandidate> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT candidate_id, session_id, topic_id_suggested, label,
                  evidence, why_new, status, merged_into_topic, approver,
                  decided_at, created_at
           FROM topic_candidates
           WHERE (?1 IS NULL OR status = ?1)
           ORDER BY created_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![status_str], |row| {
            Ok(RawCandidate {
              candidate_id:       row.get(0)?,
              session_id:         row.get(1)?,
              topic_id_suggested: row.get(2)?,
              label:              row.get(3)?,
              evidence:           row.get(4)?,
              why_new:            row.get(5)?,
              status:             row.get(6)?,
              merged_into_topic:  row.get(7)?,
              approver:           row.get(8)?,
              decided_at:         row.get(9)?,
              created_at:         row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCandidate::into_candidate).collect()
  }

  async fn decide_candidate(
    &self,
    id: Uuid,
    status: CandidateStatus,
    approver: &str,
    merged_into: Option<String>,
  ) -> Result<TopicCandidate> {
    let mut candidate = self
      .fetch_candidate(id)
      .await?
      .ok_or(Error::CandidateNotFound(id))?;

    // One-way transitions: a decided candidate can only be reopened.
    if candidate.status != CandidateStatus::Pending
      && status != CandidateStatus::Pending
    {
      return Err(Error::InvalidTransition {
        id,
        from: candidate.status.as_str().to_string(),
        to:   status.as_str().to_string(),
      });
    }

    if status == CandidateStatus::Pending {
      candidate.status = CandidateStatus::Pending;
      candidate.approver = None;
      candidate.decided_at = None;
      candidate.merged_into_topic = None;
    } else {
      candidate.status = status;
      candidate.approver = Some(approver.to_string());
      candidate.decided_at = Some(Utc::now());
      candidate.merged_into_topic = merged_into;
    }

    let id_str      = encode_uuid(id);
    let status_str  = encode_candidate_status(candidate.status).to_owned();
    let approver_db = candidate.approver.clone();
    let decided_str = encode_dt_opt(candidate.decided_at);
    let merged_db   = candidate.merged_into_topic.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE topic_candidates
           SET status = ?2, approver = ?3, decided_at = ?4, merged_into_topic = ?5
           WHERE candidate_id = ?1",
          rusqlite::params![id_str, status_str, approver_db, decided_str, merged_db],
        )?;
        Ok(())
      })
      .await?;

    Ok(candidate)
  }

  // ── Mentions ──────────────────────────────────────────────────────────────

  async fn add_mentions(
    &self,
    session_id: Uuid,
    rows: Vec<NewMention>,
  ) -> Result<usize> {
    let session_str = encode_uuid(session_id);
    let created_str = encode_dt(Utc::now());
    let count = rows.len();

    type EncodedMention = (
      String,
      String,
      String,
      String,
      Option<String>,
      Option<f64>,
      Option<f64>,
      Option<f64>,
      String,
    );
    let encoded: Vec<EncodedMention> = rows
      .into_iter()
      .map(|m| {
        (
          encode_uuid(Uuid::new_v4()),
          encode_uuid(m.chunk_id),
          m.topic_id,
          m.evidence,
          m.surface_term,
          m.relevance,
          m.importance,
          m.specificity,
          encode_dt(m.mentioned_at),
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        // relevance mirrors relevance_r; the plain column was layered on by
        // migration and both are written on insert.
        let mut stmt = conn.prepare(
          "INSERT INTO mentions
             (mention_id, session_id, chunk_id, topic_id, evidence, surface_term,
              relevance_r, relevance, importance_i, specificity_s, mentioned_at, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for (id, chunk, topic, evidence, surface, relevance, importance, specificity, mentioned) in
          encoded
        {
          stmt.execute(rusqlite::params![
            id,
            session_str,
            chunk,
            topic,
            evidence,
            surface,
            relevance,
            importance,
            specificity,
            mentioned,
            created_str
          ])?;
        }
        Ok(())
      })
      .await?;

    Ok(count)
  }

  async fn list_mentions(&self, filter: &MentionFilter) -> Result<Vec<Mention>> {
    let session_str = filter.session_id.map(encode_uuid);
    let topic_str   = filter.topic_id.clone();

    let raws: Vec<RawMention> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT mention_id, session_id, chunk_id, topic_id, evidence,
                  surface_term, relevance_r, importance_i, specificity_s,
                  mentioned_at, created_at
           FROM mentions
           WHERE (?1 IS NULL OR session_id = ?1)
             AND (?2 IS NULL OR topic_id = ?2)
           ORDER BY mentioned_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![session_str, topic_str], |row| {
            Ok(RawMention {
              mention_id:   row.get(0)?,
              session_id:   row.get(1)?,
              chunk_id:     row.get(2)?,
              topic_id:     row.get(3)?,
              evidence:     row.get(4)?,
              surface_term: row.get(5)?,
              relevance:    row.get(6)?,
              importance:   row.get(7)?,
              specificity:  row.get(8)?,
              mentioned_at: row.get(9)?,
              created_at:   row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMention::into_mention).collect()
  }

  // ── Scoring ───────────────────────────────────────────────────────────────

  async fn start_scoring_run(&self, input: NewScoringRun) -> Result<ScoringRun> {
    let run = ScoringRun {
      run_id:         Uuid::new_v4(),
      run_type:       input.run_type,
      half_life_days: input.half_life_days,
      min_relevance:  input.min_relevance,
      rollup_alpha:   input.rollup_alpha,
      notes:          input.notes,
      status:         RunStatus::Queued,
      finished_at:    None,
      error:          None,
      run_at:         Utc::now(),
    };

    let id_str     = encode_uuid(run.run_id);
    let run_type   = run.run_type.clone();
    let half_life  = run.half_life_days;
    let min_rel    = run.min_relevance;
    let alpha      = run.rollup_alpha;
    let notes      = run.notes.clone();
    let run_at_str = encode_dt(run.run_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO scoring_runs
             (run_id, run_type, half_life_days, min_relevance, rollup_alpha, notes, status, run_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'queued', ?7)",
          rusqlite::params![id_str, run_type, half_life, min_rel, alpha, notes, run_at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(run)
  }

  async fn latest_scoring_run(&self) -> Result<Option<ScoringRun>> {
    let raw: Option<RawScoringRun> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT run_id, run_type, half_life_days, min_relevance, rollup_alpha,
                      notes, status, finished_at, error, run_at
               FROM scoring_runs ORDER BY run_at DESC, rowid DESC LIMIT 1",
              [],
              |row| {
                Ok(RawScoringRun {
                  run_id:         row.get(0)?,
                  run_type:       row.get(1)?,
                  half_life_days: row.get(2)?,
                  min_relevance:  row.get(3)?,
                  rollup_alpha:   row.get(4)?,
                  notes:          row.get(5)?,
                  status:         row.get(6)?,
                  finished_at:    row.get(7)?,
                  error:          row.get(8)?,
                  run_at:         row.get(9)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawScoringRun::into_run).transpose()
  }

  async fn scores_for_run(&self, run_id: Uuid) -> Result<Vec<TopicScore>> {
    let run_str = encode_uuid(run_id);

    let raws: Vec<RawTopicScore> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT run_id, topic_id, direct_score, rollup_score, total_score,
                  num_mentions, last_mention_at, breakdown_json
           FROM topic_scores WHERE run_id = ?1
           ORDER BY total_score DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![run_str], |row| {
            Ok(RawTopicScore {
              run_id:          row.get(0)?,
              topic_id:        row.get(1)?,
              direct_score:    row.get(2)?,
              rollup_score:    row.get(3)?,
              total_score:     row.get(4)?,
              num_mentions:    row.get(5)?,
              last_mention_at: row.get(6)?,
              breakdown_json:  row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTopicScore::into_score).collect()
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn get_settings(&self) -> Result<Settings> {
    let raw: Option<RawSettings> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT merge_threshold, half_life_days, min_relevance, auto_chunk_tag, updated_at
               FROM settings WHERE id = 1",
              [],
              |row| {
                Ok(RawSettings {
                  merge_threshold: row.get(0)?,
                  half_life_days:  row.get(1)?,
                  min_relevance:   row.get(2)?,
                  auto_chunk_tag:  row.get(3)?,
                  updated_at:      row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      Some(raw) => raw.into_settings(),
      None => Ok(Settings::default()),
    }
  }

  async fn put_settings(&self, settings: Settings) -> Result<Settings> {
    let stored = Settings { updated_at: Some(Utc::now()), ..settings };

    let merge_threshold = stored.merge_threshold;
    let half_life_days  = stored.half_life_days;
    let min_relevance   = stored.min_relevance;
    let auto_chunk_tag  = stored.auto_chunk_tag;
    let updated_str     = encode_dt_opt(stored.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO settings (id, merge_threshold, half_life_days, min_relevance, auto_chunk_tag, updated_at)
           VALUES (1, ?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(id) DO UPDATE SET
             merge_threshold = excluded.merge_threshold,
             half_life_days  = excluded.half_life_days,
             min_relevance   = excluded.min_relevance,
             auto_chunk_tag  = excluded.auto_chunk_tag,
             updated_at      = excluded.updated_at",
          rusqlite::params![
            merge_threshold,
            half_life_days,
            min_relevance,
            auto_chunk_tag,
            updated_str
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(stored)
  }

  // ── Audit log ─────────────────────────────────────────────────────────────

  async fn log_event(&self, input: NewEvent) -> Result<Event> {
    let event = Event {
      event_id:     Uuid::new_v4(),
      event_type:   input.event_type,
      actor:        input.actor,
      payload:      input.payload,
      session_id:   input.session_id,
      topic_id:     input.topic_id,
      candidate_id: input.candidate_id,
      run_id:       input.run_id,
      created_at:   Utc::now(),
    };

    let id_str        = encode_uuid(event.event_id);
    let type_str      = event.event_type.as_str().to_owned();
    let actor         = event.actor.clone();
    let payload_str   = serde_json::to_string(&event.payload)?;
    let session_str   = event.session_id.map(encode_uuid);
    let topic_str     = event.topic_id.clone();
    let candidate_str = event.candidate_id.map(encode_uuid);
    let run_str       = event.run_id.map(encode_uuid);
    let created_str   = encode_dt(event.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events
             (event_id, event_type, actor, payload_json, session_id, topic_id, candidate_id, run_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            type_str,
            actor,
            payload_str,
            session_str,
            topic_str,
            candidate_str,
            run_str,
            created_str
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn list_events(&self, limit: usize) -> Result<Vec<Event>> {
    let limit_val = limit as i64;

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, event_type, actor, payload_json, session_id,
                  topic_id, candidate_id, run_id, created_at
           FROM events ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], |row| {
            Ok(RawEvent {
              event_id:     row.get(0)?,
              event_type:   row.get(1)?,
              actor:        row.get(2)?,
              payload_json: row.get(3)?,
              session_id:   row.get(4)?,
              topic_id:     row.get(5)?,
              candidate_id: row.get(6)?,
              run_id:       row.get(7)?,
              created_at:   row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }
}
