//! The `PlanningStore` and `TimeTrackingSync` traits and their query type.
//!
//! Storage backends (e.g. `plantafel-store-sqlite`) implement both. The board
//! loader, the assignment writer and the HTTP layer depend on these traits,
//! never on a concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  absence::AbsenceRow,
  assignment::{Assignment, AssignmentRow},
  directory::{Employee, Project},
  timesheet::SyncCounts,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Coarse record filter for [`PlanningStore::assignment_rows`] and
/// [`PlanningStore::absence_rows`].
///
/// Backends match on calendar dates only: a record qualifies when its start
/// date is on or before `to` and its end date on or after `from`. The exact
/// instant-level window clip happens after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
  pub from:         NaiveDate,
  pub to:           NaiveDate,
  /// Empty means every employee.
  pub employee_ids: Vec<Uuid>,
  /// Empty means every project. Ignored for absences.
  pub project_ids:  Vec<Uuid>,
}

impl RecordQuery {
  pub fn window(from: NaiveDate, to: NaiveDate) -> Self {
    Self {
      from,
      to,
      employee_ids: Vec::new(),
      project_ids: Vec::new(),
    }
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Read and insert access to the planning records.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PlanningStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every employee, active or not.
  fn list_employees(
    &self,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + '_;

  /// Every project, regardless of status.
  fn list_projects(
    &self,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  fn get_employee(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  fn get_project(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// Stored assignments matching `query`, unparsed.
  fn assignment_rows<'a>(
    &'a self,
    query: &'a RecordQuery,
  ) -> impl Future<Output = Result<Vec<AssignmentRow>, Self::Error>> + Send + 'a;

  /// Stored *approved* absences matching `query`, unparsed.
  fn absence_rows<'a>(
    &'a self,
    query: &'a RecordQuery,
  ) -> impl Future<Output = Result<Vec<AbsenceRow>, Self::Error>> + Send + 'a;

  /// Persist a new assignment. Returns an error if the id is already taken.
  fn insert_assignment(
    &self,
    assignment: Assignment,
  ) -> impl Future<Output = Result<Assignment, Self::Error>> + Send + '_;
}

/// The time-tracking side of an assignment.
pub trait TimeTrackingSync: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Replace the time entries linked to `assignment` with the ones it plans
  /// now (see [`plan_time_entries`](crate::timesheet::plan_time_entries)).
  /// Deleting and inserting happen atomically.
  fn sync<'a>(
    &'a self,
    assignment: &'a Assignment,
  ) -> impl Future<Output = Result<SyncCounts, Self::Error>> + Send + 'a;
}
