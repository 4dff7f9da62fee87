//! Assignments: employee-to-project bookings over a time window.
//!
//! Stored assignments arrive as loosely typed [`AssignmentRow`]s: dates may be
//! instants or bare calendar dates, and setup/teardown planning exists in two
//! generations of fields. [`AssignmentRow::parse`] resolves all of that once
//! into an [`Assignment`] with an explicit [`PhasePlan`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  date::{DateValue, day_end, day_start, format_instant},
};

// ─── Phases ──────────────────────────────────────────────────────────────────

/// Which part of an assignment an event represents.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  #[default]
  Default,
  Setup,
  Teardown,
}

impl Phase {
  /// Suffix appended to event ids and titles; empty for undivided events.
  pub fn suffix(self) -> Option<&'static str> {
    match self {
      Self::Default => None,
      Self::Setup => Some("setup"),
      Self::Teardown => Some("teardown"),
    }
  }
}

// ─── Phase plan ──────────────────────────────────────────────────────────────

/// A legacy setup or teardown window with its own planned hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubWindow {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
  pub hours: Option<f64>,
}

/// How an assignment is divided into board events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhasePlan {
  /// One event spanning the whole assignment.
  #[default]
  Undivided,
  /// Whole-day setup/teardown markers; take precedence over windows.
  DayMarkers {
    setup:    Option<NaiveDate>,
    teardown: Option<NaiveDate>,
  },
  /// Legacy timed setup/teardown windows.
  Windows {
    setup:    Option<SubWindow>,
    teardown: Option<SubWindow>,
  },
}

// ─── Assignment ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
  pub id:            Uuid,
  /// `None` means the booking is not yet staffed.
  pub employee_id:   Option<Uuid>,
  pub employee_name: Option<String>,
  pub project_id:    Uuid,
  pub project_name:  String,
  pub start:         DateTime<Utc>,
  pub end:           DateTime<Utc>,
  pub role:          Option<String>,
  pub planned_hours: Option<f64>,
  pub notes:         Option<String>,
  pub confirmed:     bool,
  pub phases:        PhasePlan,
  pub created_at:    Option<DateTime<Utc>>,
  pub updated_at:    Option<DateTime<Utc>>,
}

impl Assignment {
  /// The `(phase, start, end)` spans this assignment occupies on the board.
  pub fn spans(&self) -> Vec<(Phase, DateTime<Utc>, DateTime<Utc>)> {
    match &self.phases {
      PhasePlan::Undivided => vec![(Phase::Default, self.start, self.end)],
      PhasePlan::DayMarkers { setup, teardown } => [
        (Phase::Setup, *setup),
        (Phase::Teardown, *teardown),
      ]
      .into_iter()
      .filter_map(|(phase, day)| day.map(|d| (phase, day_start(d), day_end(d))))
      .collect(),
      PhasePlan::Windows { setup, teardown } => [
        (Phase::Setup, setup),
        (Phase::Teardown, teardown),
      ]
      .into_iter()
      .filter_map(|(phase, w)| w.as_ref().map(|w| (phase, w.start, w.end)))
      .collect(),
    }
  }
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// An assignment exactly as stored: every date is text in whichever shape
/// the writer of the day chose, ids are text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignmentRow {
  pub id:             String,
  pub employee_id:    Option<String>,
  pub employee_name:  Option<String>,
  pub project_id:     Option<String>,
  pub project_name:   Option<String>,
  pub start:          Option<String>,
  pub end:            Option<String>,
  pub role:           Option<String>,
  pub planned_hours:  Option<f64>,
  pub notes:          Option<String>,
  pub confirmed:      bool,
  pub setup_date:     Option<String>,
  pub teardown_date:  Option<String>,
  pub setup_start:    Option<String>,
  pub setup_end:      Option<String>,
  pub setup_hours:    Option<f64>,
  pub teardown_start: Option<String>,
  pub teardown_end:   Option<String>,
  pub teardown_hours: Option<f64>,
  pub created_at:     Option<String>,
  pub updated_at:     Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(field: &'static str, text: &str) -> Result<DateValue> {
  DateValue::parse(text).ok_or_else(|| Error::InvalidDate {
    field,
    value: text.to_owned(),
  })
}

fn parse_uuid(field: &'static str, text: &str) -> Result<Uuid> {
  Uuid::parse_str(text).map_err(|_| Error::InvalidId {
    field,
    value: text.to_owned(),
  })
}

/// Parse a legacy window. A window without an end runs to the end of its
/// start's calendar day.
pub(crate) fn parse_window(
  fields: (&'static str, &'static str),
  start: Option<&str>,
  end: Option<&str>,
  hours: Option<f64>,
) -> Result<Option<SubWindow>> {
  let Some(start) = start else { return Ok(None) };
  let start = parse_date(fields.0, start)?;
  let end = match end {
    Some(e) => parse_date(fields.1, e)?.end_instant(),
    None => start.end_of_day(),
  };
  let start = start.start_instant();
  if start > end {
    return Err(Error::StartAfterEnd);
  }
  Ok(Some(SubWindow { start, end, hours }))
}

impl AssignmentRow {
  pub fn parse(self) -> Result<Assignment> {
    let id = parse_uuid("id", self.id.trim())?;
    let employee_id = present(&self.employee_id)
      .map(|s| parse_uuid("employeeId", s))
      .transpose()?;
    let project_id = present(&self.project_id)
      .ok_or(Error::MissingField("projectId"))
      .and_then(|s| parse_uuid("projectId", s))?;

    let start = present(&self.start)
      .ok_or(Error::MissingField("start"))
      .and_then(|s| parse_date("start", s))?
      .start_instant();
    let end = present(&self.end)
      .ok_or(Error::MissingField("end"))
      .and_then(|s| parse_date("end", s))?
      .end_instant();
    if start > end {
      return Err(Error::StartAfterEnd);
    }

    let setup_date = present(&self.setup_date);
    let teardown_date = present(&self.teardown_date);
    let phases = if setup_date.is_some() || teardown_date.is_some() {
      PhasePlan::DayMarkers {
        setup:    setup_date
          .map(|s| parse_date("setupDate", s).map(|d| d.date()))
          .transpose()?,
        teardown: teardown_date
          .map(|s| parse_date("teardownDate", s).map(|d| d.date()))
          .transpose()?,
      }
    } else {
      let setup = parse_window(
        ("setupStart", "setupEnd"),
        present(&self.setup_start),
        present(&self.setup_end),
        self.setup_hours,
      )?;
      let teardown = parse_window(
        ("teardownStart", "teardownEnd"),
        present(&self.teardown_start),
        present(&self.teardown_end),
        self.teardown_hours,
      )?;
      if setup.is_none() && teardown.is_none() {
        PhasePlan::Undivided
      } else {
        PhasePlan::Windows { setup, teardown }
      }
    };

    let created_at = present(&self.created_at)
      .map(|s| parse_date("createdAt", s).map(|d| d.start_instant()))
      .transpose()?;
    let updated_at = present(&self.updated_at)
      .map(|s| parse_date("updatedAt", s).map(|d| d.start_instant()))
      .transpose()?;

    Ok(Assignment {
      id,
      employee_id,
      employee_name: self.employee_name.filter(|n| !n.trim().is_empty()),
      project_id,
      project_name: self.project_name.unwrap_or_default(),
      start,
      end,
      role: self.role,
      planned_hours: self.planned_hours,
      notes: self.notes,
      confirmed: self.confirmed,
      phases,
      created_at,
      updated_at,
    })
  }
}

impl From<&Assignment> for AssignmentRow {
  fn from(a: &Assignment) -> Self {
    let (setup_date, teardown_date, setup, teardown) = match &a.phases {
      PhasePlan::Undivided => (None, None, None, None),
      PhasePlan::DayMarkers { setup, teardown } => {
        (*setup, *teardown, None, None)
      }
      PhasePlan::Windows { setup, teardown } => {
        (None, None, setup.as_ref(), teardown.as_ref())
      }
    };
    let date_text = |d: NaiveDate| d.format("%Y-%m-%d").to_string();

    AssignmentRow {
      id:             a.id.hyphenated().to_string(),
      employee_id:    a.employee_id.map(|id| id.hyphenated().to_string()),
      employee_name:  a.employee_name.clone(),
      project_id:     Some(a.project_id.hyphenated().to_string()),
      project_name:   Some(a.project_name.clone()),
      start:          Some(format_instant(a.start)),
      end:            Some(format_instant(a.end)),
      role:           a.role.clone(),
      planned_hours:  a.planned_hours,
      notes:          a.notes.clone(),
      confirmed:      a.confirmed,
      setup_date:     setup_date.map(date_text),
      teardown_date:  teardown_date.map(date_text),
      setup_start:    setup.map(|w| format_instant(w.start)),
      setup_end:      setup.map(|w| format_instant(w.end)),
      setup_hours:    setup.and_then(|w| w.hours),
      teardown_start: teardown.map(|w| format_instant(w.start)),
      teardown_end:   teardown.map(|w| format_instant(w.end)),
      teardown_hours: teardown.and_then(|w| w.hours),
      created_at:     a.created_at.map(format_instant),
      updated_at:     a.updated_at.map(format_instant),
    }
  }
}
