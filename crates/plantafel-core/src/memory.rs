//! In-memory store used by the engine's unit tests.

use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::{
  absence::AbsenceRow,
  assignment::{Assignment, AssignmentRow},
  directory::{Employee, Project, ProjectStatus, SiteAddress},
  store::{PlanningStore, RecordQuery, TimeTrackingSync},
  timesheet::{SyncCounts, TimeEntry, plan_time_entries},
};

#[derive(Debug, thiserror::Error)]
#[error("memory store failure")]
pub struct MemoryError;

#[derive(Default)]
pub struct MemoryStore {
  pub employees:    Vec<Employee>,
  pub projects:     Vec<Project>,
  pub absences:     Vec<AbsenceRow>,
  /// Rows returned verbatim, e.g. malformed legacy records.
  pub raw_rows:     Vec<AssignmentRow>,
  assignments:      Mutex<Vec<Assignment>>,
  time_entries:     Mutex<Vec<TimeEntry>>,
}

impl MemoryStore {
  /// Two active employees, one inactive, and two plannable projects plus a
  /// completed one.
  pub fn seeded() -> Self {
    let employee = |n: u128, first: &str, last: &str, active: bool| Employee {
      id: Uuid::from_u128(n),
      first_name: first.into(),
      last_name: last.into(),
      active,
    };
    let project = |n: u128, name: &str, status: ProjectStatus| Project {
      id: Uuid::from_u128(n),
      number: Some(format!("P-{n}")),
      name: name.into(),
      customer_name: None,
      status,
      address: Some(SiteAddress {
        street:      None,
        postal_code: None,
        city:        Some("Berlin".into()),
      }),
    };
    Self {
      employees: vec![
        employee(1, "Anna", "Berg", true),
        employee(2, "Ben", "Crane", true),
        employee(3, "Carl", "Dorn", false),
      ],
      projects: vec![
        project(100, "Rathaus", ProjectStatus::Active),
        project(101, "Schule", ProjectStatus::InPlanning),
        project(102, "Halle", ProjectStatus::Completed),
      ],
      ..Default::default()
    }
  }

  pub fn with_assignment(self, a: Assignment) -> Self {
    self.lock_assignments().push(a);
    self
  }

  pub fn assignments(&self) -> Vec<Assignment> { self.lock_assignments().clone() }

  pub fn time_entries(&self) -> Vec<TimeEntry> {
    self
      .time_entries
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .clone()
  }

  fn lock_assignments(&self) -> std::sync::MutexGuard<'_, Vec<Assignment>> {
    self.assignments.lock().unwrap_or_else(|e| e.into_inner())
  }
}

fn in_window(query: &RecordQuery, start: Option<&str>, end: Option<&str>) -> bool {
  let (from, to) = (query.from.to_string(), query.to.to_string());
  let day = |s: Option<&str>| s.map(|s| s.chars().take(10).collect::<String>());
  match (day(start), day(end)) {
    (Some(start), Some(end)) => start <= to && end >= from,
    _ => true,
  }
}

fn listed(ids: &[Uuid], value: Option<&str>) -> bool {
  ids.is_empty()
    || value.is_some_and(|v| ids.iter().any(|id| id.to_string() == v))
}

impl PlanningStore for MemoryStore {
  type Error = MemoryError;

  async fn list_employees(&self) -> Result<Vec<Employee>, MemoryError> {
    Ok(self.employees.clone())
  }

  async fn list_projects(&self) -> Result<Vec<Project>, MemoryError> {
    Ok(self.projects.clone())
  }

  async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, MemoryError> {
    Ok(self.employees.iter().find(|e| e.id == id).cloned())
  }

  async fn get_project(&self, id: Uuid) -> Result<Option<Project>, MemoryError> {
    Ok(self.projects.iter().find(|p| p.id == id).cloned())
  }

  async fn assignment_rows(
    &self,
    query: &RecordQuery,
  ) -> Result<Vec<AssignmentRow>, MemoryError> {
    let stored: Vec<AssignmentRow> =
      self.lock_assignments().iter().map(AssignmentRow::from).collect();
    Ok(
      stored
        .into_iter()
        .chain(self.raw_rows.iter().cloned())
        .filter(|r| in_window(query, r.start.as_deref(), r.end.as_deref()))
        .filter(|r| listed(&query.employee_ids, r.employee_id.as_deref()))
        .filter(|r| listed(&query.project_ids, r.project_id.as_deref()))
        .collect(),
    )
  }

  async fn absence_rows(
    &self,
    query: &RecordQuery,
  ) -> Result<Vec<AbsenceRow>, MemoryError> {
    Ok(
      self
        .absences
        .iter()
        .filter(|r| r.status.as_deref() == Some("approved"))
        .filter(|r| in_window(query, r.start.as_deref(), r.end.as_deref()))
        .filter(|r| listed(&query.employee_ids, r.employee_id.as_deref()))
        .cloned()
        .collect(),
    )
  }

  async fn insert_assignment(
    &self,
    assignment: Assignment,
  ) -> Result<Assignment, MemoryError> {
    self.lock_assignments().push(assignment.clone());
    Ok(assignment)
  }
}

impl TimeTrackingSync for MemoryStore {
  type Error = MemoryError;

  async fn sync(&self, assignment: &Assignment) -> Result<SyncCounts, MemoryError> {
    let mut entries = self.time_entries.lock().unwrap_or_else(|e| e.into_inner());
    let before = entries.len();
    entries.retain(|e| e.assignment_id != assignment.id);
    let deleted = before - entries.len();
    let planned = plan_time_entries(assignment, Utc::now());
    let created = planned.len();
    entries.extend(planned);
    Ok(SyncCounts { created, deleted })
  }
}

/// A synchronizer that always fails.
pub struct FailingSync;

impl TimeTrackingSync for FailingSync {
  type Error = MemoryError;

  async fn sync(&self, _: &Assignment) -> Result<SyncCounts, MemoryError> {
    Err(MemoryError)
  }
}
