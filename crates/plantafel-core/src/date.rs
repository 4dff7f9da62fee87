//! Date values as they appear in stored records and request input.
//!
//! Upstream storage is inconsistent: the same logical field may hold a full
//! instant or a bare calendar date. [`DateValue`] captures both shapes so every
//! comparison downstream happens on normalized UTC instants.

use chrono::{
  DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

/// A date field in either of its stored representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DateValue {
  /// A specific moment in time.
  Instant(DateTime<Utc>),
  /// A calendar date without time component (`YYYY-MM-DD`).
  DateOnly(NaiveDate),
}

impl DateValue {
  /// Parse an RFC 3339 instant (seconds optional), an offset-less
  /// `YYYY-MM-DDTHH:MM[:SS[.f]]` (read as UTC), or a `YYYY-MM-DD` calendar
  /// date.
  pub fn parse(text: &str) -> Option<Self> {
    let text = text.trim();
    if text.is_empty() {
      return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
      return Some(Self::DateOnly(date));
    }
    let zoned = DateTime::parse_from_rfc3339(text)
      .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M%:z"));
    if let Ok(dt) = zoned {
      return Some(Self::Instant(dt.with_timezone(&Utc)));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%MZ"]
      .iter()
      .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
      .map(|naive| Self::Instant(Utc.from_utc_datetime(&naive)))
  }

  /// The calendar date this value falls on (UTC).
  pub fn date(&self) -> NaiveDate {
    match self {
      Self::Instant(dt) => dt.date_naive(),
      Self::DateOnly(d) => *d,
    }
  }

  /// Normalize for use as an interval start; dates begin at midnight UTC.
  pub fn start_instant(&self) -> DateTime<Utc> {
    match self {
      Self::Instant(dt) => *dt,
      Self::DateOnly(d) => day_start(*d),
    }
  }

  /// Normalize for use as an interval end; dates cover the whole day.
  pub fn end_instant(&self) -> DateTime<Utc> {
    match self {
      Self::Instant(dt) => *dt,
      Self::DateOnly(d) => day_end(*d),
    }
  }

  /// The last millisecond of this value's calendar day.
  pub fn end_of_day(&self) -> DateTime<Utc> { day_end(self.date()) }
}

/// Midnight UTC at the start of `date`.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
  Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// 23:59:59.999 UTC on `date`.
pub fn day_end(date: NaiveDate) -> DateTime<Utc> {
  day_start(date) + Duration::days(1) - Duration::milliseconds(1)
}

/// Canonical text encoding for instants written by this crate.
pub fn format_instant(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
