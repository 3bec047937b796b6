//! Topic taxonomy rows: canonical topics, aliases, and parent/child edges.
//!
//! Topic ids are lowercase slugs (see [`crate::slug::slugify`]) rather than
//! UUIDs, so taxonomy files and pipeline output can refer to them stably.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a taxonomy node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicStatus {
  Active,
  Archived,
}

/// A canonical taxonomy node. The label is unique ignoring case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
  pub id:          String,
  pub label:       String,
  pub description: Option<String>,
  pub status:      TopicStatus,
  pub created_by:  String,
  pub created_at:  DateTime<Utc>,
}

/// Input for [`crate::store::SignalStore::upsert_topic`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertTopic {
  pub id:          String,
  pub label:       String,
  pub description: Option<String>,
  pub created_by:  String,
}

/// An alternate label mapped many-to-one to a topic. Alias text is unique
/// ignoring case within a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicAlias {
  pub alias_id:   Uuid,
  pub topic_id:   String,
  pub alias:      String,
  pub created_at: DateTime<Utc>,
}

/// A directed parent→child edge. Composite key (parent, child, type): a
/// topic may have multiple parents, and nothing prevents cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRelation {
  pub parent_id:     String,
  pub child_id:      String,
  pub relation_type: String,
  pub rollup_weight: Option<f64>,
  pub created_at:    DateTime<Utc>,
}

/// The only relation type this service writes.
pub const RELATION_PARENT_CHILD: &str = "parent_child";
