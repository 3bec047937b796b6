//! Topic candidates — proposed taxonomy nodes awaiting a human decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decision state of a candidate.
///
/// Transitions are one-way: once decided, a candidate can only move back to
/// `Pending` (reopen); decided→decided is rejected by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
  Pending,
  Approved,
  Rejected,
  Merged,
}

impl CandidateStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      CandidateStatus::Pending => "pending",
      CandidateStatus::Approved => "approved",
      CandidateStatus::Rejected => "rejected",
      CandidateStatus::Merged => "merged",
    }
  }
}

/// A proposed topic with its evidence, awaiting approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicCandidate {
  pub candidate_id:       Uuid,
  /// The session whose transcript produced this candidate, if any.
  pub session_id:         Option<Uuid>,
  /// Slug the candidate would get as a canonical topic.
  pub topic_id_suggested: String,
  pub label:              String,
  pub evidence:           String,
  pub why_new:            String,
  pub status:             CandidateStatus,
  /// Set when the candidate was folded into an existing topic.
  pub merged_into_topic:  Option<String>,
  pub approver:           Option<String>,
  pub decided_at:         Option<DateTime<Utc>>,
  pub created_at:         DateTime<Utc>,
}

/// Input for [`crate::store::SignalStore::add_candidates`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCandidate {
  pub topic_id_suggested: String,
  pub label:              String,
  pub evidence:           String,
  pub why_new:            String,
}
