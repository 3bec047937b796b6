//! Heuristic chunking and candidate detection.
//!
//! Used when the external pipeline is unavailable: sentences are split on
//! terminal punctuation and grouped into fixed windows, and candidates are
//! synthesized from a fixed keyword table. Best-effort only.

use signals_core::{candidate::NewCandidate, slug::slugify};

/// Sentences per fallback chunk.
pub const SENTENCE_WINDOW: usize = 3;

/// Label plus the lowercase keywords that trigger it. One candidate is
/// produced per matched group; a single generic candidate if none match.
const KEYWORD_GROUPS: &[(&str, &[&str])] = &[
  ("Product Development", &["product", "feature"]),
  ("User Feedback", &["user", "feedback"]),
  ("Planning & Timeline", &["timeline", "plan"]),
];

const GENERIC_LABEL: &str = "General Discussion";

/// Split on sentence-ending punctuation, dropping empty fragments.
pub fn split_sentences(text: &str) -> Vec<String> {
  text
    .split(['.', '!', '?'])
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect()
}

/// Group sentences into fixed-size windows, rejoined with `. `.
pub fn window_chunks(sentences: &[String], window: usize) -> Vec<String> {
  sentences
    .chunks(window.max(1))
    .map(|group| group.join(". "))
    .collect()
}

/// Scan lowercased text for the keyword table and synthesize one candidate
/// per matched group. Evidence is the first sentence containing the matched
/// keyword.
pub fn keyword_candidates(text: &str) -> Vec<NewCandidate> {
  let lowered = text.to_lowercase();
  let sentences = split_sentences(text);

  let mut candidates = Vec::new();
  for (label, keywords) in KEYWORD_GROUPS {
    let Some(hit) = keywords.iter().find(|kw| lowered.contains(**kw)) else {
      continue;
    };
    let evidence = sentences
      .iter()
      .find(|s| s.to_lowercase().contains(*hit))
      .cloned()
      .unwrap_or_else(|| truncate(text, 200));

    candidates.push(NewCandidate {
      topic_id_suggested: slugify(label),
      label:              label.to_string(),
      evidence,
      why_new:            format!("keyword match on {hit:?}"),
    });
  }

  if candidates.is_empty() {
    candidates.push(NewCandidate {
      topic_id_suggested: slugify(GENERIC_LABEL),
      label:              GENERIC_LABEL.to_string(),
      evidence:           truncate(text, 200),
      why_new:            "no keyword group matched".to_string(),
    });
  }

  candidates
}

fn truncate(text: &str, max: usize) -> String {
  let trimmed = text.trim();
  match trimmed.char_indices().nth(max) {
    Some((idx, _)) => trimmed[..idx].to_string(),
    None => trimmed.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::{keyword_candidates, split_sentences, window_chunks};

  #[test]
  fn sentences_split_on_terminal_punctuation() {
    let got = split_sentences("One. Two! Three? Four");
    assert_eq!(got, vec!["One", "Two", "Three", "Four"]);
  }

  #[test]
  fn empty_fragments_are_dropped() {
    assert_eq!(split_sentences("Hmm... okay."), vec!["Hmm", "okay"]);
    assert!(split_sentences("   ").is_empty());
  }

  #[test]
  fn windows_are_fixed_size() {
    let sentences: Vec<String> =
      (1..=7).map(|i| format!("sentence {i}")).collect();
    let chunks = window_chunks(&sentences, 3);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0], "sentence 1. sentence 2. sentence 3");
    assert_eq!(chunks[2], "sentence 7");
  }

  #[test]
  fn matched_groups_only() {
    let text =
      "We shipped the new feature last week. The timeline for Q3 is tight.";
    let candidates = keyword_candidates(text);

    let labels: Vec<&str> =
      candidates.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Product Development", "Planning & Timeline"]);
  }

  #[test]
  fn evidence_is_the_matching_sentence() {
    let text = "Unrelated opener. Users keep asking about exports.";
    let candidates = keyword_candidates(text);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].label, "User Feedback");
    assert_eq!(candidates[0].evidence, "Users keep asking about exports");
  }

  #[test]
  fn generic_candidate_when_nothing_matches() {
    let candidates = keyword_candidates("The weather was nice today.");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].label, "General Discussion");
    assert_eq!(candidates[0].topic_id_suggested, "general-discussion");
  }
}
