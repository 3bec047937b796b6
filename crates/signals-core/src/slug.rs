//! Topic-id slugification.

/// Lowercase a label and collapse every non-alphanumeric run into a single
/// hyphen. Empty input slugs to `"topic"` so ids are never blank.
pub fn slugify(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut pending_dash = false;

  for c in s.trim().chars() {
    if c.is_ascii_alphanumeric() {
      if pending_dash && !out.is_empty() {
        out.push('-');
      }
      pending_dash = false;
      out.push(c.to_ascii_lowercase());
    } else {
      pending_dash = true;
    }
  }

  if out.is_empty() { "topic".to_string() } else { out }
}

#[cfg(test)]
mod tests {
  use super::slugify;

  #[test]
  fn collapses_punctuation_runs() {
    assert_eq!(slugify("Planning & Timeline"), "planning-timeline");
    assert_eq!(slugify("  SSO  Issues!  "), "sso-issues");
  }

  #[test]
  fn lowercases() {
    assert_eq!(slugify("Product Development"), "product-development");
  }

  #[test]
  fn empty_and_symbol_only_fall_back() {
    assert_eq!(slugify(""), "topic");
    assert_eq!(slugify("!!!"), "topic");
  }

  #[test]
  fn already_slugged_is_unchanged() {
    assert_eq!(slugify("user-feedback"), "user-feedback");
  }
}
