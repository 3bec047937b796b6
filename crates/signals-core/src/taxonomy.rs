//! Read-only taxonomy graph assembly.
//!
//! Joins topics, aliases, and relations in memory into per-topic nodes for
//! display. Idempotent: output ordering is fully determined by the input
//! rows (topics by id, lists sorted), so repeated calls over unchanged
//! tables produce identical graphs.

use serde::{Deserialize, Serialize};

use crate::topic::{Topic, TopicAlias, TopicRelation};

/// One topic with its aliases and its place in the parent/child graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicNode {
  pub topic:    Topic,
  pub aliases:  Vec<String>,
  /// Topic ids this node is a parent of.
  pub children: Vec<String>,
  /// Topic ids this node is a child of. More than one entry is legal — the
  /// relation table permits multi-parent edges, and even cycles.
  pub parents:  Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyGraph {
  pub nodes: Vec<TopicNode>,
}

/// Assemble the display graph from full table reads. Purely relational — no
/// recursion, so cyclic edges cannot loop it.
pub fn assemble(
  mut topics: Vec<Topic>,
  aliases: &[TopicAlias],
  relations: &[TopicRelation],
) -> TaxonomyGraph {
  topics.sort_by(|a, b| a.id.cmp(&b.id));

  let nodes = topics
    .into_iter()
    .map(|topic| {
      let mut node_aliases: Vec<String> = aliases
        .iter()
        .filter(|a| a.topic_id == topic.id)
        .map(|a| a.alias.clone())
        .collect();
      node_aliases.sort();

      let mut children: Vec<String> = relations
        .iter()
        .filter(|r| r.parent_id == topic.id)
        .map(|r| r.child_id.clone())
        .collect();
      children.sort();

      let mut parents: Vec<String> = relations
        .iter()
        .filter(|r| r.child_id == topic.id)
        .map(|r| r.parent_id.clone())
        .collect();
      parents.sort();

      TopicNode { topic, aliases: node_aliases, children, parents }
    })
    .collect();

  TaxonomyGraph { nodes }
}
