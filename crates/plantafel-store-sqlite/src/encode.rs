//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps written by this store are RFC 3339 with millisecond precision.
//! UUIDs are stored as hyphenated lowercase strings. Assignment and absence
//! rows are read back as their loosely typed core row shapes and parsed by
//! the engine, not here.

use chrono::{DateTime, NaiveDate, Utc};
use plantafel_core::{
  absence::AbsenceRow,
  assignment::AssignmentRow,
  date::format_instant,
  directory::{Employee, Project, ProjectStatus, SiteAddress},
  timesheet::{Activity, TimeEntry},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { format_instant(dt) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_status(s: &str) -> Result<ProjectStatus> {
  ProjectStatus::parse(s).ok_or_else(|| Error::UnknownValue {
    field: "project status",
    value: s.to_owned(),
  })
}

pub fn decode_activity(s: &str) -> Result<Activity> {
  Activity::parse(s).ok_or_else(|| Error::UnknownValue {
    field: "activity",
    value: s.to_owned(),
  })
}

// ─── Catalog rows ────────────────────────────────────────────────────────────

pub const EMPLOYEE_COLUMNS: &str =
  "employee_id, first_name, last_name, active";

pub struct RawEmployee {
  pub employee_id: String,
  pub first_name:  String,
  pub last_name:   String,
  pub active:      bool,
}

impl RawEmployee {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      employee_id: row.get(0)?,
      first_name:  row.get(1)?,
      last_name:   row.get(2)?,
      active:      row.get(3)?,
    })
  }

  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      id:         decode_uuid(&self.employee_id)?,
      first_name: self.first_name,
      last_name:  self.last_name,
      active:     self.active,
    })
  }
}

pub const PROJECT_COLUMNS: &str =
  "project_id, number, name, customer_name, status, street, postal_code, city";

pub struct RawProject {
  pub project_id:    String,
  pub number:        Option<String>,
  pub name:          String,
  pub customer_name: Option<String>,
  pub status:        String,
  pub street:        Option<String>,
  pub postal_code:   Option<String>,
  pub city:          Option<String>,
}

impl RawProject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      project_id:    row.get(0)?,
      number:        row.get(1)?,
      name:          row.get(2)?,
      customer_name: row.get(3)?,
      status:        row.get(4)?,
      street:        row.get(5)?,
      postal_code:   row.get(6)?,
      city:          row.get(7)?,
    })
  }

  pub fn into_project(self) -> Result<Project> {
    let address = SiteAddress {
      street:      self.street,
      postal_code: self.postal_code,
      city:        self.city,
    };
    Ok(Project {
      id:            decode_uuid(&self.project_id)?,
      number:        self.number,
      name:          self.name,
      customer_name: self.customer_name,
      status:        decode_status(&self.status)?,
      address:       (!address.is_empty()).then_some(address),
    })
  }
}

// ─── Planning rows ───────────────────────────────────────────────────────────

pub const ASSIGNMENT_COLUMNS: &str = "assignment_id, employee_id, employee_name, \
   project_id, project_name, start_at, end_at, role, planned_hours, notes, \
   confirmed, setup_date, teardown_date, setup_start, setup_end, setup_hours, \
   teardown_start, teardown_end, teardown_hours, created_at, updated_at";

pub fn assignment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssignmentRow> {
  Ok(AssignmentRow {
    id:             row.get(0)?,
    employee_id:    row.get(1)?,
    employee_name:  row.get(2)?,
    project_id:     row.get(3)?,
    project_name:   row.get(4)?,
    start:          row.get(5)?,
    end:            row.get(6)?,
    role:           row.get(7)?,
    planned_hours:  row.get(8)?,
    notes:          row.get(9)?,
    confirmed:      row.get(10)?,
    setup_date:     row.get(11)?,
    teardown_date:  row.get(12)?,
    setup_start:    row.get(13)?,
    setup_end:      row.get(14)?,
    setup_hours:    row.get(15)?,
    teardown_start: row.get(16)?,
    teardown_end:   row.get(17)?,
    teardown_hours: row.get(18)?,
    created_at:     row.get(19)?,
    updated_at:     row.get(20)?,
  })
}

pub const ABSENCE_COLUMNS: &str = "absence_id, employee_id, employee_name, \
   start_at, end_at, kind, status, reason";

pub fn absence_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AbsenceRow> {
  Ok(AbsenceRow {
    id:            row.get(0)?,
    employee_id:   row.get(1)?,
    employee_name: row.get(2)?,
    start:         row.get(3)?,
    end:           row.get(4)?,
    kind:          row.get(5)?,
    status:        row.get(6)?,
    reason:        row.get(7)?,
  })
}

// ─── Time entries ────────────────────────────────────────────────────────────

pub const TIME_ENTRY_COLUMNS: &str = "assignment_id, employee_id, \
   employee_name, project_id, project_name, work_date, from_time, to_time, \
   hours, activity, status, description, auto_created, created_at";

pub struct RawTimeEntry {
  pub assignment_id: String,
  pub employee_id:   Option<String>,
  pub employee_name: Option<String>,
  pub project_id:    String,
  pub project_name:  String,
  pub work_date:     String,
  pub from_time:     String,
  pub to_time:       String,
  pub hours:         f64,
  pub activity:      String,
  pub status:        String,
  pub description:   String,
  pub auto_created:  bool,
  pub created_at:    String,
}

impl RawTimeEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assignment_id: row.get(0)?,
      employee_id:   row.get(1)?,
      employee_name: row.get(2)?,
      project_id:    row.get(3)?,
      project_name:  row.get(4)?,
      work_date:     row.get(5)?,
      from_time:     row.get(6)?,
      to_time:       row.get(7)?,
      hours:         row.get(8)?,
      activity:      row.get(9)?,
      status:        row.get(10)?,
      description:   row.get(11)?,
      auto_created:  row.get(12)?,
      created_at:    row.get(13)?,
    })
  }

  pub fn into_time_entry(self) -> Result<TimeEntry> {
    Ok(TimeEntry {
      employee_id:   self.employee_id.as_deref().map(decode_uuid).transpose()?,
      employee_name: self.employee_name,
      project_id:    decode_uuid(&self.project_id)?,
      project_name:  self.project_name,
      date:          decode_date(&self.work_date)?,
      from:          self.from_time,
      to:            self.to_time,
      hours:         self.hours,
      activity:      decode_activity(&self.activity)?,
      status:        self.status,
      description:   self.description,
      assignment_id: decode_uuid(&self.assignment_id)?,
      auto_created:  self.auto_created,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
