//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use signals_core::{
  approval::{Decision, DecisionAction, apply_decisions},
  candidate::{CandidateStatus, NewCandidate},
  event::EventType,
  mention::{MentionFilter, NewMention},
  scoring::{NewScoringRun, RunStatus},
  session::{NewChunk, NewSession, NewSpeaker, NewUtterance},
  settings::Settings,
  store::SignalStore,
  topic::UpsertTopic,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn topic(id: &str, label: &str) -> UpsertTopic {
  UpsertTopic {
    id:          id.to_string(),
    label:       label.to_string(),
    description: None,
    created_by:  "test".into(),
  }
}

fn candidate(label: &str, slug: &str) -> NewCandidate {
  NewCandidate {
    topic_id_suggested: slug.to_string(),
    label:              label.to_string(),
    evidence:           "…".into(),
    why_new:            "not covered".into(),
  }
}

// ─── Sessions & chunks ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_session() {
  let s = store().await;

  let session = s
    .create_session(NewSession {
      title: "Weekly sync".into(),
      meeting_type: Some("internal".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  let fetched = s.get_session(session.session_id).await.unwrap().unwrap();
  assert_eq!(fetched.title, "Weekly sync");
  assert_eq!(fetched.meeting_type, "internal");
}

#[tokio::test]
async fn get_session_missing_returns_none() {
  let s = store().await;
  assert!(s.get_session(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn chunks_keep_input_order_and_get_ids() {
  let s = store().await;
  let session = s
    .create_session(NewSession { title: "t".into(), ..Default::default() })
    .await
    .unwrap();

  let chunks = s
    .add_chunks(
      session.session_id,
      vec![
        NewChunk {
          speaker_id:   None,
          start_sec:    None,
          end_sec:      None,
          text:         "first".into(),
          content_hash: "h1".into(),
        },
        NewChunk {
          speaker_id:   None,
          start_sec:    None,
          end_sec:      None,
          text:         "second".into(),
          content_hash: "h2".into(),
        },
      ],
    )
    .await
    .unwrap();

  assert_eq!(chunks.len(), 2);
  assert_eq!(chunks[0].text, "first");
  assert_eq!(chunks[1].text, "second");
  assert_ne!(chunks[0].chunk_id, chunks[1].chunk_id);
}

#[tokio::test]
async fn speakers_and_utterances_roundtrip() {
  let s = store().await;
  let session = s
    .create_session(NewSession { title: "t".into(), ..Default::default() })
    .await
    .unwrap();

  let speaker = s
    .add_speaker(NewSpeaker {
      display_name: "Alice".into(),
      is_internal:  true,
      ..Default::default()
    })
    .await
    .unwrap();

  let n = s
    .add_utterances(
      session.session_id,
      vec![NewUtterance {
        speaker_id: speaker.speaker_id,
        start_sec:  0.0,
        end_sec:    Some(4.2),
        text:       "hello".into(),
      }],
    )
    .await
    .unwrap();
  assert_eq!(n, 1);
}

// ─── Topics & aliases ────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_topic_creates_then_updates() {
  let s = store().await;

  s.upsert_topic(topic("onboarding", "Onboarding")).await.unwrap();
  let updated = s
    .upsert_topic(UpsertTopic {
      description: Some("first-run experience".into()),
      ..topic("onboarding", "Onboarding")
    })
    .await
    .unwrap();

  assert_eq!(updated.description.as_deref(), Some("first-run experience"));
  assert_eq!(s.list_topics().await.unwrap().len(), 1);
}

#[tokio::test]
async fn topic_labels_unique_ignoring_case() {
  let s = store().await;

  s.upsert_topic(topic("product", "Product Development")).await.unwrap();
  let err = s
    .upsert_topic(topic("product-2", "PRODUCT DEVELOPMENT"))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));
}

#[tokio::test]
async fn alias_add_is_idempotent_ignoring_case() {
  let s = store().await;
  s.upsert_topic(topic("onboarding", "Onboarding")).await.unwrap();

  let first = s.add_alias("onboarding", "first-run").await.unwrap();
  let second = s.add_alias("onboarding", "First-Run").await.unwrap();

  assert_eq!(first.alias_id, second.alias_id);
  assert_eq!(s.list_aliases().await.unwrap().len(), 1);
}

#[tokio::test]
async fn relation_upsert_and_multi_parent() {
  let s = store().await;
  s.upsert_topic(topic("a", "A")).await.unwrap();
  s.upsert_topic(topic("b", "B")).await.unwrap();
  s.upsert_topic(topic("c", "C")).await.unwrap();

  s.add_relation("a", "c", None).await.unwrap();
  s.add_relation("b", "c", Some(0.4)).await.unwrap();
  // Upsert replaces the weight, not the row.
  s.add_relation("a", "c", Some(0.9)).await.unwrap();

  let relations = s.list_relations().await.unwrap();
  assert_eq!(relations.len(), 2);
  let ac = relations.iter().find(|r| r.parent_id == "a").unwrap();
  assert_eq!(ac.rollup_weight, Some(0.9));
}

#[tokio::test]
async fn relation_requires_existing_topics() {
  let s = store().await;
  s.upsert_topic(topic("a", "A")).await.unwrap();

  let err = s.add_relation("a", "missing", None).await.unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));
}

// ─── Candidate decisions ─────────────────────────────────────────────────────

#[tokio::test]
async fn decide_candidate_sets_decision_fields() {
  let s = store().await;
  let added = s
    .add_candidates(None, vec![candidate("SSO Issues", "sso-issues")])
    .await
    .unwrap();

  let decided = s
    .decide_candidate(
      added[0].candidate_id,
      CandidateStatus::Approved,
      "admin",
      None,
    )
    .await
    .unwrap();

  assert_eq!(decided.status, CandidateStatus::Approved);
  assert_eq!(decided.approver.as_deref(), Some("admin"));
  assert!(decided.decided_at.is_some());
}

#[tokio::test]
async fn decided_to_decided_is_rejected() {
  let s = store().await;
  let added = s
    .add_candidates(None, vec![candidate("SSO Issues", "sso-issues")])
    .await
    .unwrap();
  let id = added[0].candidate_id;

  s.decide_candidate(id, CandidateStatus::Rejected, "admin", None)
    .await
    .unwrap();

  let err = s
    .decide_candidate(id, CandidateStatus::Approved, "admin", None)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::InvalidTransition { .. }));
}

#[tokio::test]
async fn reopening_clears_decision_fields() {
  let s = store().await;
  let added = s
    .add_candidates(None, vec![candidate("SSO Issues", "sso-issues")])
    .await
    .unwrap();
  let id = added[0].candidate_id;

  s.decide_candidate(id, CandidateStatus::Merged, "admin", Some("onboarding".into()))
    .await
    .unwrap();
  let reopened = s
    .decide_candidate(id, CandidateStatus::Pending, "admin", None)
    .await
    .unwrap();

  assert_eq!(reopened.status, CandidateStatus::Pending);
  assert!(reopened.approver.is_none());
  assert!(reopened.decided_at.is_none());
  assert!(reopened.merged_into_topic.is_none());

  // And it can be decided again.
  s.decide_candidate(id, CandidateStatus::Approved, "admin", None)
    .await
    .unwrap();
}

#[tokio::test]
async fn list_candidates_filters_by_status() {
  let s = store().await;
  let added = s
    .add_candidates(
      None,
      vec![candidate("A", "a"), candidate("B", "b"), candidate("C", "c")],
    )
    .await
    .unwrap();
  s.decide_candidate(added[0].candidate_id, CandidateStatus::Rejected, "x", None)
    .await
    .unwrap();

  let pending = s
    .list_candidates(Some(CandidateStatus::Pending))
    .await
    .unwrap();
  assert_eq!(pending.len(), 2);

  let all = s.list_candidates(None).await.unwrap();
  assert_eq!(all.len(), 3);
}

// ─── Approval workflow ───────────────────────────────────────────────────────

#[tokio::test]
async fn alias_decision_writes_alias_row() {
  let s = store().await;
  s.upsert_topic(topic("onboarding", "Onboarding")).await.unwrap();
  let added = s
    .add_candidates(None, vec![candidate("Onboarding SSO", "onboarding-sso")])
    .await
    .unwrap();

  apply_decisions(&s, "admin", &[Decision {
    candidate_id:    added[0].candidate_id,
    status:          CandidateStatus::Approved,
    action:          DecisionAction::Alias,
    target_topic_id: Some("onboarding".into()),
  }])
  .await
  .unwrap();

  let aliases = s.list_aliases().await.unwrap();
  assert_eq!(aliases.len(), 1);
  assert_eq!(aliases[0].topic_id, "onboarding");
  assert_eq!(aliases[0].alias, "Onboarding SSO");

  let decided = s.get_candidate(added[0].candidate_id).await.unwrap().unwrap();
  assert_eq!(decided.merged_into_topic.as_deref(), Some("onboarding"));
}

#[tokio::test]
async fn subtopic_decision_creates_child_and_edge() {
  let s = store().await;
  s.upsert_topic(topic("platform", "Platform")).await.unwrap();
  let added = s
    .add_candidates(None, vec![candidate("SSO Issues", "sso-issues")])
    .await
    .unwrap();

  apply_decisions(&s, "admin", &[Decision {
    candidate_id:    added[0].candidate_id,
    status:          CandidateStatus::Approved,
    action:          DecisionAction::Subtopic,
    target_topic_id: Some("platform".into()),
  }])
  .await
  .unwrap();

  let topics = s.list_topics().await.unwrap();
  assert!(topics.iter().any(|t| t.id == "sso-issues"));

  let relations = s.list_relations().await.unwrap();
  assert_eq!(relations.len(), 1);
  assert_eq!(relations[0].parent_id, "platform");
  assert_eq!(relations[0].child_id, "sso-issues");
}

#[tokio::test]
async fn plain_approval_creates_canonical_topic() {
  let s = store().await;
  let added = s
    .add_candidates(None, vec![candidate("SSO Issues", "sso-issues")])
    .await
    .unwrap();

  apply_decisions(&s, "admin", &[Decision {
    candidate_id:    added[0].candidate_id,
    status:          CandidateStatus::Approved,
    action:          DecisionAction::None,
    target_topic_id: None,
  }])
  .await
  .unwrap();

  let topics = s.list_topics().await.unwrap();
  assert_eq!(topics.len(), 1);
  assert_eq!(topics[0].id, "sso-issues");
  assert_eq!(topics[0].label, "SSO Issues");
  assert_eq!(topics[0].created_by, "admin");
}

#[tokio::test]
async fn batch_of_n_writes_n_plus_one_events() {
  let s = store().await;
  let added = s
    .add_candidates(
      None,
      vec![candidate("A", "a"), candidate("B", "b"), candidate("C", "c")],
    )
    .await
    .unwrap();

  let decisions: Vec<Decision> = added
    .iter()
    .map(|c| Decision {
      candidate_id:    c.candidate_id,
      status:          CandidateStatus::Rejected,
      action:          DecisionAction::None,
      target_topic_id: None,
    })
    .collect();

  apply_decisions(&s, "admin", &decisions).await.unwrap();

  let events = s.list_events(50).await.unwrap();
  assert_eq!(events.len(), 4);
  assert_eq!(
    events
      .iter()
      .filter(|e| e.event_type == EventType::CandidateDecided)
      .count(),
    3
  );
  let summary = events
    .iter()
    .find(|e| e.event_type == EventType::TaxonomyApplied)
    .unwrap();
  assert_eq!(summary.payload["batch_size"], serde_json::json!(3));
}

#[tokio::test]
async fn empty_batch_writes_no_events() {
  let s = store().await;
  apply_decisions(&s, "admin", &[]).await.unwrap();
  assert!(s.list_events(50).await.unwrap().is_empty());
}

#[tokio::test]
async fn auto_chunk_tag_adds_request_event() {
  let s = store().await;
  s.put_settings(Settings { auto_chunk_tag: true, ..Settings::default() })
    .await
    .unwrap();
  let added = s
    .add_candidates(None, vec![candidate("A", "a")])
    .await
    .unwrap();

  let outcome = apply_decisions(&s, "admin", &[Decision {
    candidate_id:    added[0].candidate_id,
    status:          CandidateStatus::Approved,
    action:          DecisionAction::None,
    target_topic_id: None,
  }])
  .await
  .unwrap();

  assert!(outcome.chunk_tag_requested);
  let events = s.list_events(50).await.unwrap();
  assert!(
    events
      .iter()
      .any(|e| e.event_type == EventType::ChunkTagRequested)
  );
}

// ─── Mentions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn mentions_filter_by_session_and_topic() {
  let s = store().await;
  let session = s
    .create_session(NewSession { title: "t".into(), ..Default::default() })
    .await
    .unwrap();
  s.upsert_topic(topic("onboarding", "Onboarding")).await.unwrap();
  s.upsert_topic(topic("pricing", "Pricing")).await.unwrap();

  let chunks = s
    .add_chunks(session.session_id, vec![NewChunk {
      speaker_id:   None,
      start_sec:    None,
      end_sec:      None,
      text:         "…".into(),
      content_hash: "h".into(),
    }])
    .await
    .unwrap();

  let mention = |topic_id: &str| NewMention {
    chunk_id:     chunks[0].chunk_id,
    topic_id:     topic_id.to_string(),
    evidence:     "…".into(),
    surface_term: None,
    relevance:    Some(0.8),
    importance:   None,
    specificity:  None,
    mentioned_at: Utc::now(),
  };

  s.add_mentions(session.session_id, vec![mention("onboarding"), mention("pricing")])
    .await
    .unwrap();

  let all = s.list_mentions(&MentionFilter::default()).await.unwrap();
  assert_eq!(all.len(), 2);

  let onboarding = s
    .list_mentions(&MentionFilter {
      topic_id: Some("onboarding".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(onboarding.len(), 1);
  assert_eq!(onboarding[0].relevance, Some(0.8));

  let other_session = s
    .list_mentions(&MentionFilter {
      session_id: Some(Uuid::new_v4()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(other_session.is_empty());
}

// ─── Scoring ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn latest_run_is_most_recent() {
  let s = store().await;

  let first = s
    .start_scoring_run(NewScoringRun {
      run_type:       "manual".into(),
      half_life_days: Some(21.0),
      min_relevance:  Some(0.35),
      rollup_alpha:   Some(0.4),
      notes:          None,
    })
    .await
    .unwrap();
  assert_eq!(first.status, RunStatus::Queued);

  let second = s
    .start_scoring_run(NewScoringRun {
      run_type:       "manual".into(),
      half_life_days: None,
      min_relevance:  None,
      rollup_alpha:   None,
      notes:          Some("second".into()),
    })
    .await
    .unwrap();

  let latest = s.latest_scoring_run().await.unwrap().unwrap();
  assert_eq!(latest.run_id, second.run_id);
}

#[tokio::test]
async fn scores_for_unknown_run_are_empty() {
  let s = store().await;
  assert!(s.scores_for_run(Uuid::new_v4()).await.unwrap().is_empty());
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn settings_default_until_written() {
  let s = store().await;

  let defaults = s.get_settings().await.unwrap();
  assert_eq!(defaults, Settings::default());

  let written = s
    .put_settings(Settings {
      merge_threshold: 0.85,
      auto_chunk_tag: true,
      ..Settings::default()
    })
    .await
    .unwrap();
  assert!(written.updated_at.is_some());

  let read_back = s.get_settings().await.unwrap();
  assert_eq!(read_back.merge_threshold, 0.85);
  assert!(read_back.auto_chunk_tag);
}
