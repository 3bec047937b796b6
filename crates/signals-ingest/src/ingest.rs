//! The ingestion entry points: one session, or a CSV batch of them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest as _, Sha256};
use tracing::warn;
use uuid::Uuid;

use signals_core::{
  candidate::NewCandidate,
  event::{EventType, NewEvent},
  mention::NewMention,
  session::{NewChunk, NewSession, NewSpeaker, NewUtterance},
  slug::slugify,
  store::SignalStore,
};

use crate::{
  IngestError,
  batch::parse_batch,
  fallback::{SENTENCE_WINDOW, keyword_candidates, split_sentences, window_chunks},
  pipeline::{MeetingFile, PipelineRunner, TaxonomyEntry},
};

/// One structured transcript turn supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
  pub speaker:   String,
  pub text:      String,
  #[serde(default)]
  pub start_sec: Option<f64>,
  #[serde(default)]
  pub end_sec:   Option<f64>,
}

/// Input for [`ingest_session`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
  pub title:        String,
  pub meeting_type: Option<String>,
  pub started_at:   Option<DateTime<Utc>>,
  pub ended_at:     Option<DateTime<Utc>>,
  /// Flat transcript text. When absent, the turns' text is joined instead.
  pub text:         Option<String>,
  #[serde(default)]
  pub turns:        Vec<Turn>,
}

/// What one ingestion produced. `warning` is set whenever the heuristic
/// fallback stood in for the pipeline — the request still succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOutcome {
  pub session_id:    Uuid,
  pub chunks:        usize,
  pub candidates:    usize,
  pub mentions:      usize,
  pub used_fallback: bool,
  pub warning:       Option<String>,
}

/// SHA-256 hex digest of chunk text.
pub fn content_hash(text: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(text.as_bytes());
  format!("{:x}", hasher.finalize())
}

/// Ingest one transcript: create the session, try the pipeline, fall back to
/// heuristics, insert everything produced, and log one audit event.
pub async fn ingest_session<S: SignalStore>(
  store: &S,
  runner: Option<&PipelineRunner>,
  req: IngestRequest,
) -> Result<IngestOutcome, IngestError<S::Error>> {
  let transcript = match req.text.as_deref() {
    Some(text) if !text.trim().is_empty() => text.to_string(),
    _ => {
      req
        .turns
        .iter()
        .map(|t| t.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
    }
  };

  let session = store
    .create_session(NewSession {
      title:        req.title.clone(),
      meeting_type: req.meeting_type.clone(),
      started_at:   req.started_at,
      ended_at:     req.ended_at,
    })
    .await
    .map_err(IngestError::Store)?;

  if !req.turns.is_empty() {
    let mut speaker_ids: HashMap<&str, Uuid> = HashMap::new();
    for turn in &req.turns {
      if !speaker_ids.contains_key(turn.speaker.as_str()) {
        let speaker = store
          .add_speaker(NewSpeaker {
            display_name: turn.speaker.clone(),
            ..Default::default()
          })
          .await
          .map_err(IngestError::Store)?;
        speaker_ids.insert(turn.speaker.as_str(), speaker.speaker_id);
      }
    }

    let rows: Vec<NewUtterance> = req
      .turns
      .iter()
      .map(|t| NewUtterance {
        speaker_id: speaker_ids[t.speaker.as_str()],
        start_sec:  t.start_sec.unwrap_or(0.0),
        end_sec:    t.end_sec,
        text:       t.text.clone(),
      })
      .collect();
    store
      .add_utterances(session.session_id, rows)
      .await
      .map_err(IngestError::Store)?;
  }

  // Pipeline first; any failure downgrades to the heuristic path.
  let mut warning = None;
  let artifacts = match runner {
    Some(runner) => {
      let topics = store.list_topics().await.map_err(IngestError::Store)?;
      let taxonomy: Vec<TaxonomyEntry> = topics
        .iter()
        .map(|t| TaxonomyEntry { id: t.id.clone(), score: 0.0 })
        .collect();
      let meeting = MeetingFile {
        title:        req.title.clone(),
        meeting_type: req
          .meeting_type
          .clone()
          .unwrap_or_else(|| "unknown".to_string()),
        started_at:   req.started_at,
        transcript:   transcript.clone(),
      };

      match runner.run(&meeting, &taxonomy).await {
        Ok(artifacts) => Some(artifacts),
        Err(e) => {
          warn!(error = %e, "pipeline run failed; using heuristic fallback");
          warning = Some(format!("pipeline failed ({e}); heuristic fallback used"));
          None
        }
      }
    }
    None => {
      warning =
        Some("pipeline not configured; heuristic fallback used".to_string());
      None
    }
  };

  let used_fallback = artifacts.is_none();
  let (chunk_count, candidate_count, mention_count) = match artifacts {
    Some(artifacts) => {
      let new_chunks: Vec<NewChunk> = artifacts
        .chunks
        .iter()
        .map(|c| NewChunk {
          speaker_id:   None,
          start_sec:    None,
          end_sec:      None,
          text:         c.text.clone(),
          content_hash: content_hash(&c.text),
        })
        .collect();
      let inserted = store
        .add_chunks(session.session_id, new_chunks)
        .await
        .map_err(IngestError::Store)?;

      // Pipeline chunk ids are its own; map them onto the inserted rows.
      let chunk_map: HashMap<&str, Uuid> = artifacts
        .chunks
        .iter()
        .zip(&inserted)
        .map(|(artifact, row)| (artifact.chunk_id.as_str(), row.chunk_id))
        .collect();

      let candidate_rows: Vec<NewCandidate> = artifacts
        .candidates
        .iter()
        .map(|c| NewCandidate {
          topic_id_suggested: slugify(c.topic_id.as_deref().unwrap_or(&c.label)),
          label:              c.label.clone(),
          evidence:           c.evidence.clone(),
          why_new:            c.why_new.clone(),
        })
        .collect();
      let candidate_count = candidate_rows.len();
      store
        .add_candidates(Some(session.session_id), candidate_rows)
        .await
        .map_err(IngestError::Store)?;

      let settings = store.get_settings().await.map_err(IngestError::Store)?;
      let mentioned_at = session.started_at.unwrap_or(session.created_at);
      let mut mention_rows = Vec::new();
      for m in &artifacts.mentions {
        // Mentions pointing at chunk ids the pipeline never produced are
        // dropped, as are those under the relevance floor (missing scores
        // count as 1.0).
        let Some(&chunk_id) = chunk_map.get(m.chunk_id.as_str()) else {
          continue;
        };
        if m.relevance.unwrap_or(1.0) < settings.min_relevance {
          continue;
        }
        mention_rows.push(NewMention {
          chunk_id,
          topic_id: slugify(m.topic_id.as_deref().unwrap_or(&m.topic_label)),
          evidence: m.evidence.clone(),
          surface_term: None,
          relevance: m.relevance,
          importance: None,
          specificity: None,
          mentioned_at,
        });
      }
      let mention_count = store
        .add_mentions(session.session_id, mention_rows)
        .await
        .map_err(IngestError::Store)?;

      (inserted.len(), candidate_count, mention_count)
    }
    None => {
      let sentences = split_sentences(&transcript);
      let new_chunks: Vec<NewChunk> = window_chunks(&sentences, SENTENCE_WINDOW)
        .into_iter()
        .map(|text| NewChunk {
          speaker_id:   None,
          start_sec:    None,
          end_sec:      None,
          content_hash: content_hash(&text),
          text,
        })
        .collect();
      let inserted = store
        .add_chunks(session.session_id, new_chunks)
        .await
        .map_err(IngestError::Store)?;

      let candidates = keyword_candidates(&transcript);
      let candidate_count = candidates.len();
      store
        .add_candidates(Some(session.session_id), candidates)
        .await
        .map_err(IngestError::Store)?;

      (inserted.len(), candidate_count, 0)
    }
  };

  store
    .log_event(NewEvent {
      payload: json!({
        "title": req.title,
        "chunks": chunk_count,
        "candidates": candidate_count,
        "mentions": mention_count,
        "fallback": used_fallback,
      }),
      session_id: Some(session.session_id),
      ..NewEvent::new(EventType::SessionIngested, "ingest")
    })
    .await
    .map_err(IngestError::Store)?;

  Ok(IngestOutcome {
    session_id: session.session_id,
    chunks: chunk_count,
    candidates: candidate_count,
    mentions: mention_count,
    used_fallback,
    warning,
  })
}

/// Ingest a CSV batch: headers are validated before any row is processed,
/// then each row runs through [`ingest_session`] as its own session. Rows
/// without a parseable date default to the current time.
pub async fn ingest_csv<S: SignalStore>(
  store: &S,
  runner: Option<&PipelineRunner>,
  csv_text: &str,
) -> Result<Vec<IngestOutcome>, IngestError<S::Error>> {
  let rows = parse_batch(csv_text)?;

  let mut outcomes = Vec::with_capacity(rows.len());
  for row in rows {
    let outcome = ingest_session(store, runner, IngestRequest {
      title:      row.title,
      text:       Some(row.content),
      started_at: Some(row.started_at.unwrap_or_else(Utc::now)),
      ..Default::default()
    })
    .await?;
    outcomes.push(outcome);
  }

  Ok(outcomes)
}

#[cfg(test)]
mod tests {
  use signals_core::{
    candidate::CandidateStatus, event::EventType, mention::MentionFilter,
    settings::Settings, store::SignalStore,
  };
  use signals_store_sqlite::SqliteStore;

  use super::{IngestRequest, Turn, content_hash, ingest_csv, ingest_session};

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory().await.expect("in-memory store")
  }

  #[test]
  fn content_hash_is_sha256_hex() {
    // sha256("abc")
    assert_eq!(
      content_hash("abc"),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }

  #[tokio::test]
  async fn fallback_ingest_creates_session_chunks_and_candidates() {
    let s = store().await;

    let outcome = ingest_session(&s, None, IngestRequest {
      title: "Planning sync".into(),
      text:  Some(
        "We shipped the feature. The timeline for Q3 is tight. One. Two. Three."
          .into(),
      ),
      ..Default::default()
    })
    .await
    .unwrap();

    assert!(outcome.used_fallback);
    assert!(outcome.warning.is_some());
    // 5 sentences -> 2 windows of 3.
    assert_eq!(outcome.chunks, 2);
    assert_eq!(outcome.mentions, 0);

    let session = s.get_session(outcome.session_id).await.unwrap().unwrap();
    assert_eq!(session.title, "Planning sync");

    let pending = s
      .list_candidates(Some(CandidateStatus::Pending))
      .await
      .unwrap();
    let labels: Vec<&str> = pending.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Product Development", "Planning & Timeline"]);
    assert!(pending.iter().all(|c| c.session_id == Some(outcome.session_id)));
  }

  #[tokio::test]
  async fn fallback_ingest_writes_one_audit_event() {
    let s = store().await;

    let outcome = ingest_session(&s, None, IngestRequest {
      title: "t".into(),
      text:  Some("Nothing notable here.".into()),
      ..Default::default()
    })
    .await
    .unwrap();

    let events = s.list_events(10).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::SessionIngested);
    assert_eq!(events[0].session_id, Some(outcome.session_id));
    assert_eq!(events[0].payload["fallback"], serde_json::json!(true));
  }

  #[tokio::test]
  async fn structured_turns_create_speakers_and_utterances() {
    let s = store().await;

    let outcome = ingest_session(&s, None, IngestRequest {
      title: "standup".into(),
      turns: vec![
        Turn {
          speaker:   "Alice".into(),
          text:      "The feature is done.".into(),
          start_sec: Some(0.0),
          end_sec:   Some(3.0),
        },
        Turn {
          speaker:   "Bob".into(),
          text:      "Timeline looks fine.".into(),
          start_sec: Some(3.0),
          end_sec:   None,
        },
        Turn {
          speaker:   "Alice".into(),
          text:      "Great.".into(),
          start_sec: Some(6.0),
          end_sec:   None,
        },
      ],
      ..Default::default()
    })
    .await
    .unwrap();

    // Transcript was joined from the turns and chunked.
    assert_eq!(outcome.chunks, 1);
    assert!(outcome.candidates > 0);
  }

  #[tokio::test]
  async fn csv_batch_creates_one_session_per_row() {
    let s = store().await;

    let outcomes = ingest_csv(
      &s,
      None,
      "title,content,date\n\
       Sync,The feature shipped.,2024-01-15\n\
       Retro,Users complained about exports.,01/16/2024\n",
    )
    .await
    .unwrap();

    assert_eq!(outcomes.len(), 2);

    let first = s.get_session(outcomes[0].session_id).await.unwrap().unwrap();
    assert_eq!(
      first.started_at.map(|d| d.to_rfc3339()),
      Some("2024-01-15T00:00:00+00:00".to_string())
    );
  }

  #[tokio::test]
  async fn csv_missing_column_fails_eagerly() {
    let s = store().await;

    let err = ingest_csv(&s, None, "title,when\nSync,2024-01-15\n")
      .await
      .unwrap_err();
    assert!(matches!(err, super::IngestError::Batch(_)));

    // Eager validation: nothing was ingested.
    assert!(s.list_events(10).await.unwrap().is_empty());
  }

  #[cfg(unix)]
  mod with_pipeline {
    use std::time::Duration;

    use super::*;
    use crate::pipeline::PipelineRunner;

    fn write_script(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
      use std::os::unix::fs::PermissionsExt as _;

      let path = dir.join("pipeline.sh");
      std::fs::write(&path, body).unwrap();
      std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .unwrap();
      path
    }

    #[tokio::test]
    async fn pipeline_artifacts_become_rows_with_relevance_floor() {
      let s = store().await;
      s.upsert_topic(signals_core::topic::UpsertTopic {
        id:          "onboarding".into(),
        label:       "Onboarding".into(),
        description: None,
        created_by:  "test".into(),
      })
      .await
      .unwrap();
      s.put_settings(Settings { min_relevance: 0.5, ..Settings::default() })
        .await
        .unwrap();

      let dir = tempfile::tempdir().unwrap();
      let script = write_script(
        dir.path(),
        "#!/bin/sh\n\
         while [ $# -gt 0 ]; do\n\
           case \"$1\" in --out-dir) OUT=\"$2\"; shift 2;; *) shift;; esac\n\
         done\n\
         printf '%s' '[{\"chunk_id\":\"c1\",\"text\":\"we talked onboarding\"}]' > \"$OUT/chunks.json\"\n\
         printf '%s' '{\"new_topics\":[{\"label\":\"SSO Issues\",\"evidence\":\"...\",\"why_new\":\"gap\"}]}' > \"$OUT/new_topics.json\"\n\
         printf '%s' '{\"mentions\":[{\"chunk_id\":\"c1\",\"topic_id\":\"onboarding\",\"topic_label\":\"onboarding\",\"evidence\":\"...\",\"relevance\":0.9},{\"chunk_id\":\"c1\",\"topic_id\":\"onboarding\",\"topic_label\":\"onboarding\",\"evidence\":\"...\",\"relevance\":0.2},{\"chunk_id\":\"ghost\",\"topic_id\":\"onboarding\",\"topic_label\":\"onboarding\",\"evidence\":\"...\",\"relevance\":0.9}]}' > \"$OUT/mentions.json\"\n",
      );
      let runner = PipelineRunner::new(script, Duration::from_secs(10));

      let outcome = ingest_session(&s, Some(&runner), IngestRequest {
        title: "call".into(),
        text:  Some("we talked onboarding".into()),
        ..Default::default()
      })
      .await
      .unwrap();

      assert!(!outcome.used_fallback);
      assert!(outcome.warning.is_none());
      assert_eq!(outcome.chunks, 1);
      assert_eq!(outcome.candidates, 1);
      // One mention under the floor, one pointing at an unknown chunk id.
      assert_eq!(outcome.mentions, 1);

      let mentions = s.list_mentions(&MentionFilter::default()).await.unwrap();
      assert_eq!(mentions.len(), 1);
      assert_eq!(mentions[0].relevance, Some(0.9));
    }

    #[tokio::test]
    async fn crashed_pipeline_falls_back_with_warning() {
      let s = store().await;

      let dir = tempfile::tempdir().unwrap();
      let script = write_script(dir.path(), "#!/bin/sh\nexit 1\n");
      let runner = PipelineRunner::new(script, Duration::from_secs(10));

      let outcome = ingest_session(&s, Some(&runner), IngestRequest {
        title: "call".into(),
        text:  Some("We shipped the feature.".into()),
        ..Default::default()
      })
      .await
      .unwrap();

      assert!(outcome.used_fallback);
      assert!(outcome.warning.as_deref().unwrap().contains("fallback"));
      assert_eq!(outcome.candidates, 1);
    }
  }
}
