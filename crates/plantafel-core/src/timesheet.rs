//! Time-entry planner: the time-tracking entries a confirmed assignment
//! produces. The synchronizer replaces an assignment's linked entries with
//! exactly this set.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assignment::{Assignment, PhasePlan, SubWindow};

/// Planned work starts at this hour of the day.
pub const DAY_START_HOUR: u32 = 8;

pub const APPROVED_STATUS: &str = "approved";

/// Upper bound for the hours one day of a window may carry.
pub const MAX_HOURS_PER_DAY: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
  Setup,
  Teardown,
}

impl Activity {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Setup => "setup",
      Self::Teardown => "teardown",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "setup" => Some(Self::Setup),
      "teardown" => Some(Self::Teardown),
      _ => None,
    }
  }

  fn label(self) -> &'static str {
    match self {
      Self::Setup => "Setup",
      Self::Teardown => "Teardown",
    }
  }
}

/// A time-tracking entry linked to the assignment it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
  pub employee_id:   Option<Uuid>,
  pub employee_name: Option<String>,
  pub project_id:    Uuid,
  pub project_name:  String,
  pub date:          NaiveDate,
  /// Clock time, `HH:MM`.
  pub from:          String,
  pub to:            String,
  pub hours:         f64,
  pub activity:      Activity,
  pub status:        String,
  pub description:   String,
  pub assignment_id: Uuid,
  pub auto_created:  bool,
  pub created_at:    DateTime<Utc>,
}

/// Outcome of one synchronization.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct SyncCounts {
  pub created: usize,
  pub deleted: usize,
}

fn round_tenth(hours: f64) -> f64 { (hours * 10.0).round() / 10.0 }

/// `HH:MM` at `hours` after the day start, saturating at `24:00`.
fn clock(hours: f64) -> String {
  let room = f64::from(24 - DAY_START_HOUR);
  let minutes = (hours.clamp(0.0, room) * 60.0).round() as u32;
  let total = DAY_START_HOUR * 60 + minutes;
  format!("{:02}:{:02}", total / 60, total % 60)
}

/// Calendar days a window touches (UTC), at least one.
fn window_days(window: &SubWindow) -> Vec<NaiveDate> {
  let first = window.start.date_naive();
  let last = window.end.date_naive().max(first);
  first.iter_days().take_while(|d| *d <= last).collect()
}

/// Hours booked on each day of `window`, if it carries any.
pub fn hours_per_day(window: &SubWindow) -> Option<f64> {
  let total = window.hours.filter(|h| *h > 0.0)?;
  Some(total / window_days(window).len() as f64)
}

fn window_entries(
  a: &Assignment,
  window: &SubWindow,
  activity: Activity,
  now: DateTime<Utc>,
) -> Vec<TimeEntry> {
  let Some(per_day) = hours_per_day(window) else {
    return Vec::new();
  };
  let hours = round_tenth(per_day);
  let description = format!(
    "Planning board: {} - {}",
    activity.label(),
    a.role.as_deref().filter(|r| !r.is_empty()).unwrap_or("Assignment")
  );

  window_days(window)
    .into_iter()
    .map(|date| TimeEntry {
      employee_id: a.employee_id,
      employee_name: a.employee_name.clone(),
      project_id: a.project_id,
      project_name: a.project_name.clone(),
      date,
      from: clock(0.0),
      to: clock(hours),
      hours,
      activity,
      status: APPROVED_STATUS.to_owned(),
      description: description.clone(),
      assignment_id: a.id,
      auto_created: true,
      created_at: now,
    })
    .collect()
}

/// Entries for `a` as of `now`. Unconfirmed assignments, undivided ones and
/// day markers plan nothing.
pub fn plan_time_entries(a: &Assignment, now: DateTime<Utc>) -> Vec<TimeEntry> {
  if !a.confirmed {
    return Vec::new();
  }
  let PhasePlan::Windows { setup, teardown } = &a.phases else {
    return Vec::new();
  };

  let mut entries = Vec::new();
  if let Some(w) = setup {
    entries.extend(window_entries(a, w, Activity::Setup, now));
  }
  if let Some(w) = teardown {
    entries.extend(window_entries(a, w, Activity::Teardown, now));
  }
  entries
}
