//! Flexible date parsing for CSV batch ingestion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Anything longer than this is not a date, whatever it contains.
pub const MAX_DATE_LEN: usize = 50;

/// Try the accepted date formats in priority order: full ISO 8601, bare ISO
/// date-time, date-only (midnight UTC), US `M/D/Y`, then UK `D/M/Y`.
///
/// Returns `None` for anything unparseable — including values containing
/// `<` or longer than [`MAX_DATE_LEN`], which are never even attempted.
/// Callers fall back to the current time and log a warning.
pub fn parse_flexible_date(raw: &str) -> Option<DateTime<Utc>> {
  let value = raw.trim();
  if value.is_empty() || value.len() > MAX_DATE_LEN || value.contains('<') {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
    return Some(dt.with_timezone(&Utc));
  }

  if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
    return Some(naive.and_utc());
  }

  for format in ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"] {
    if let Ok(date) = NaiveDate::parse_from_str(value, format) {
      return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
  }

  None
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::parse_flexible_date;

  #[test]
  fn iso_instant() {
    assert_eq!(
      parse_flexible_date("2024-01-15T10:30:00Z"),
      Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
    );
  }

  #[test]
  fn date_only_is_midnight_utc() {
    assert_eq!(
      parse_flexible_date("2024-01-15"),
      Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
    );
  }

  #[test]
  fn us_format_wins_over_uk() {
    // Unambiguous: 15 cannot be a month.
    assert_eq!(
      parse_flexible_date("01/15/2024"),
      Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
    );
    // Ambiguous: US is tried first, so this is February 3rd.
    assert_eq!(
      parse_flexible_date("02/03/2024"),
      Some(Utc.with_ymd_and_hms(2024, 2, 3, 0, 0, 0).unwrap())
    );
  }

  #[test]
  fn uk_format_as_last_resort() {
    assert_eq!(
      parse_flexible_date("25/12/2024"),
      Some(Utc.with_ymd_and_hms(2024, 12, 25, 0, 0, 0).unwrap())
    );
  }

  #[test]
  fn markup_and_oversized_values_never_parse() {
    assert_eq!(parse_flexible_date("<script>2024-01-15</script>"), None);
    let long = format!("2024-01-15{}", " ".repeat(60));
    assert_eq!(parse_flexible_date(&long.replace(' ', "x")), None);
  }

  #[test]
  fn garbage_never_parses() {
    assert_eq!(parse_flexible_date("not a date"), None);
    assert_eq!(parse_flexible_date(""), None);
    assert_eq!(parse_flexible_date("13/13/2024"), None);
  }
}
