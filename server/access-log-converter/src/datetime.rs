//! Datetime parsing with ordered format fallback, and local-time rendering.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

use crate::error::ConvertError;

/// Top-level key holding the event datetime.
pub const DATETIME_FIELD: &str = "datetime";
/// Top-level key receiving the derived local date.
pub const DATE_FIELD: &str = "date";

/// Output pattern for the datetime field (local wall-clock time).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Output pattern for the date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_FRACTIONAL: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Accepted input formats, tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
  /// `2006-01-02T15:04:05Z07:00`, fractional seconds allowed.
  Rfc3339,
  /// `2006-01-02T15:04:05.999999`, no zone (read as UTC).
  Micros,
  /// `2006-01-02T15:04:05.999999999`, no zone (read as UTC). Digits past
  /// nanoseconds are truncated.
  Nanos,
}

pub const INPUT_FORMATS: [InputFormat; 3] =
  [InputFormat::Rfc3339, InputFormat::Micros, InputFormat::Nanos];

impl InputFormat {
  pub fn name(self) -> &'static str {
    match self {
      Self::Rfc3339 => "rfc3339",
      Self::Micros => "naive-micros",
      Self::Nanos => "naive-nanos",
    }
  }

  pub fn parse(self, value: &str) -> Result<DateTime<Utc>, String> {
    match self {
      Self::Rfc3339 => DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string()),
      Self::Micros => parse_naive(value, Some(6)),
      Self::Nanos => parse_naive(value, None),
    }
  }
}

/// Zone-less `YYYY-MM-DDTHH:MM:SS[.fff]`, optionally capped at `max_digits` fractional digits.
fn parse_naive(value: &str, max_digits: Option<usize>) -> Result<DateTime<Utc>, String> {
  let naive = NaiveDateTime::parse_from_str(value, NAIVE_FRACTIONAL).map_err(|e| e.to_string())?;
  let digits = value.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0);
  if let Some(max_digits) = max_digits.filter(|&max| digits > max) {
    return Err(format!(
      "fractional seconds have {} digits, at most {} allowed",
      digits, max_digits
    ));
  }
  Ok(naive.and_utc())
}

/// Parse `value` against [`INPUT_FORMATS`]; the first match wins.
///
/// On total failure the error lists every attempted format with its reason, one per line.
pub fn parse(value: &str) -> Result<DateTime<Utc>, ConvertError> {
  let mut failures: Vec<(InputFormat, String)> = Vec::with_capacity(INPUT_FORMATS.len());
  for format in INPUT_FORMATS {
    match format.parse(value) {
      Ok(dt) => return Ok(dt),
      Err(reason) => failures.push((format, reason)),
    }
  }

  let reasons = failures
    .iter()
    .map(|(format, reason)| format!("{}: {}", format.name(), reason))
    .collect::<Vec<_>>()
    .join("\n");
  Err(ConvertError::datetime_parse(value, reasons))
}

/// Local rendering of one instant: (datetime, date).
pub fn render_local(instant: &DateTime<Utc>) -> (String, String) {
  let local = instant.with_timezone(&Local);
  (
    local.format(DATETIME_FORMAT).to_string(),
    local.format(DATE_FORMAT).to_string(),
  )
}
