//! Absences: employee time off. Only approved absences reach the board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, date::DateValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceKind {
  Vacation,
  Sick,
  SpecialLeave,
  Unpaid,
  #[default]
  Other,
}

impl AbsenceKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Vacation => "vacation",
      Self::Sick => "sick",
      Self::SpecialLeave => "special_leave",
      Self::Unpaid => "unpaid",
      Self::Other => "other",
    }
  }

  /// Unknown kinds fall back to [`AbsenceKind::Other`].
  pub fn parse(s: &str) -> Self {
    match s {
      "vacation" => Self::Vacation,
      "sick" => Self::Sick,
      "special_leave" => Self::SpecialLeave,
      "unpaid" => Self::Unpaid,
      _ => Self::Other,
    }
  }

  /// Human-readable label used in event titles.
  pub fn label(self) -> &'static str {
    match self {
      Self::Vacation => "Vacation",
      Self::Sick => "Sick",
      Self::SpecialLeave => "Special leave",
      Self::Unpaid => "Unpaid leave",
      Self::Other => "Absent",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatus {
  Requested,
  Approved,
  Rejected,
}

impl AbsenceStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Requested => "requested",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
    }
  }
}

/// A normalized absence. `end` is the last millisecond of the final day off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
  pub id:            Uuid,
  pub employee_id:   Uuid,
  pub employee_name: Option<String>,
  pub start:         DateTime<Utc>,
  pub end:           DateTime<Utc>,
  pub kind:          AbsenceKind,
  pub reason:        Option<String>,
}

/// An absence as stored; `start`/`end` may be dates or instants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AbsenceRow {
  pub id:            String,
  pub employee_id:   Option<String>,
  pub employee_name: Option<String>,
  pub start:         Option<String>,
  pub end:           Option<String>,
  pub kind:          Option<String>,
  pub status:        Option<String>,
  pub reason:        Option<String>,
}

impl AbsenceRow {
  pub fn parse(self) -> Result<Absence> {
    let id = Uuid::parse_str(self.id.trim()).map_err(|_| Error::InvalidId {
      field: "id",
      value: self.id.clone(),
    })?;
    let employee_text = self
      .employee_id
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .ok_or(Error::MissingField("employeeId"))?;
    let employee_id =
      Uuid::parse_str(employee_text).map_err(|_| Error::InvalidId {
        field: "employeeId",
        value: employee_text.to_owned(),
      })?;

    let date = |field: &'static str, value: &Option<String>| -> Result<DateValue> {
      let text = value.as_deref().ok_or(Error::MissingField(field))?;
      DateValue::parse(text).ok_or_else(|| Error::InvalidDate {
        field,
        value: text.to_owned(),
      })
    };
    let start = date("start", &self.start)?.start_instant();
    // Absences always cover their final calendar day in full.
    let end = date("end", &self.end)?.end_of_day();
    if start > end {
      return Err(Error::StartAfterEnd);
    }

    Ok(Absence {
      id,
      employee_id,
      employee_name: self.employee_name,
      start,
      end,
      kind: self.kind.as_deref().map(AbsenceKind::parse).unwrap_or_default(),
      reason: self.reason,
    })
  }
}
