//! The candidate approval workflow.
//!
//! Takes a batch of human decisions and applies them against any
//! [`SignalStore`]: candidate status updates, the resulting topic/alias/
//! relation writes, and one audit event per decision plus a batch summary.
//!
//! Decisions are processed sequentially with no isolation across the batch:
//! the first store failure aborts the request and everything already
//! committed stays committed. There is no per-decision retry.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  candidate::CandidateStatus,
  event::{EventType, NewEvent},
  store::SignalStore,
  topic::UpsertTopic,
};

/// How an approved candidate is folded into the taxonomy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
  /// Create a new canonical topic from the candidate's suggested id/label.
  #[default]
  None,
  /// Record the candidate's label as an alias of the target topic.
  Alias,
  /// Make the candidate's suggested topic a child of the target topic.
  Subtopic,
}

impl DecisionAction {
  pub fn as_str(self) -> &'static str {
    match self {
      DecisionAction::None => "none",
      DecisionAction::Alias => "alias",
      DecisionAction::Subtopic => "subtopic",
    }
  }
}

/// One human decision on one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
  pub candidate_id:    Uuid,
  pub status:          CandidateStatus,
  #[serde(default)]
  pub action:          DecisionAction,
  pub target_topic_id: Option<String>,
}

/// Summary returned to the caller after a committed batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
  pub decided:             usize,
  /// Whether a chunk/tag re-run was requested via the audit log.
  pub chunk_tag_requested: bool,
}

#[derive(Debug, Error)]
pub enum ApprovalError<E: std::error::Error> {
  #[error("candidate not found: {0}")]
  CandidateNotFound(Uuid),

  #[error(transparent)]
  Store(E),
}

/// Apply a batch of decisions. See the module docs for the error policy.
///
/// For every non-empty batch one extra `taxonomy_applied` event is written,
/// and — if the settings row's auto-chunk-tag flag is set — a further
/// `chunk_tag_requested` event standing in for the external re-run.
pub async fn apply_decisions<S: SignalStore>(
  store: &S,
  approver: &str,
  decisions: &[Decision],
) -> Result<BatchOutcome, ApprovalError<S::Error>> {
  for decision in decisions {
    let candidate = store
      .get_candidate(decision.candidate_id)
      .await
      .map_err(ApprovalError::Store)?
      .ok_or(ApprovalError::CandidateNotFound(decision.candidate_id))?;

    let merged_into = match decision.action {
      DecisionAction::Alias | DecisionAction::Subtopic => {
        decision.target_topic_id.clone()
      }
      DecisionAction::None => None,
    };

    store
      .decide_candidate(decision.candidate_id, decision.status, approver, merged_into)
      .await
      .map_err(ApprovalError::Store)?;

    if decision.status == CandidateStatus::Approved {
      match (decision.action, decision.target_topic_id.as_deref()) {
        (DecisionAction::Alias, Some(target)) => {
          store
            .add_alias(target, &candidate.label)
            .await
            .map_err(ApprovalError::Store)?;
        }
        (DecisionAction::Subtopic, Some(target)) => {
          // The edge's child must exist for its foreign key to hold, so the
          // suggested topic is created first.
          store
            .upsert_topic(UpsertTopic {
              id:          candidate.topic_id_suggested.clone(),
              label:       candidate.label.clone(),
              description: None,
              created_by:  approver.to_string(),
            })
            .await
            .map_err(ApprovalError::Store)?;
          store
            .add_relation(target, &candidate.topic_id_suggested, None)
            .await
            .map_err(ApprovalError::Store)?;
        }
        _ => {
          store
            .upsert_topic(UpsertTopic {
              id:          candidate.topic_id_suggested.clone(),
              label:       candidate.label.clone(),
              description: None,
              created_by:  approver.to_string(),
            })
            .await
            .map_err(ApprovalError::Store)?;
        }
      }
    }

    store
      .log_event(NewEvent {
        payload: json!({
          "status": decision.status.as_str(),
          "action": decision.action.as_str(),
          "target_topic_id": decision.target_topic_id,
          "label": candidate.label,
        }),
        candidate_id: Some(decision.candidate_id),
        topic_id: decision.target_topic_id.clone(),
        session_id: candidate.session_id,
        ..NewEvent::new(EventType::CandidateDecided, approver)
      })
      .await
      .map_err(ApprovalError::Store)?;
  }

  let mut chunk_tag_requested = false;
  if !decisions.is_empty() {
    store
      .log_event(NewEvent {
        payload: json!({ "batch_size": decisions.len() }),
        ..NewEvent::new(EventType::TaxonomyApplied, approver)
      })
      .await
      .map_err(ApprovalError::Store)?;

    let settings = store.get_settings().await.map_err(ApprovalError::Store)?;
    if settings.auto_chunk_tag {
      store
        .log_event(NewEvent {
          payload: json!({ "reason": "taxonomy_applied" }),
          ..NewEvent::new(EventType::ChunkTagRequested, approver)
        })
        .await
        .map_err(ApprovalError::Store)?;
      chunk_tag_requested = true;
    }
  }

  Ok(BatchOutcome { decided: decisions.len(), chunk_tag_requested })
}
