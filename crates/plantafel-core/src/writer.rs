//! Assignment writer: validate, resolve, persist, then hand confirmed
//! assignments to time tracking.
//!
//! Two concurrent creations for the same employee and window are not
//! serialized; both succeed and show up as a conflict on the next read.

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  assignment::{Assignment, PhasePlan, SubWindow, parse_window},
  date::DateValue,
  store::{PlanningStore, TimeTrackingSync},
  timesheet::{MAX_HOURS_PER_DAY, SyncCounts, hours_per_day},
};

/// Input for [`create_assignment`], as received from a client. Error
/// messages name fields by their request names (`projektId`, `von`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentDraft {
  pub employee_id:    Option<String>,
  pub project_id:     Option<String>,
  pub start:          Option<String>,
  pub end:            Option<String>,
  pub role:           Option<String>,
  pub planned_hours:  Option<f64>,
  pub notes:          Option<String>,
  pub confirmed:      Option<bool>,
  pub setup_start:    Option<String>,
  pub setup_end:      Option<String>,
  pub setup_hours:    Option<f64>,
  pub teardown_start: Option<String>,
  pub teardown_end:   Option<String>,
  pub teardown_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedAssignment {
  pub assignment: Assignment,
  pub sync:       SyncCounts,
}

fn text(value: Option<String>) -> Option<String> {
  value
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
}

fn hours(value: Option<f64>) -> Option<f64> {
  value.filter(|h| h.is_finite() && *h > 0.0)
}

fn check_daily_hours(
  field: &'static str,
  window: Option<&SubWindow>,
) -> Result<()> {
  match (window.and_then(hours_per_day), window.and_then(|w| w.hours)) {
    (Some(per_day), Some(value)) if per_day > MAX_HOURS_PER_DAY => {
      Err(Error::HoursOutOfRange { field, value })
    }
    _ => Ok(()),
  }
}

fn required_date(field: &'static str, value: Option<&str>) -> Result<DateValue> {
  let value = value.ok_or(Error::MissingField(field))?;
  DateValue::parse(value).ok_or_else(|| Error::InvalidDate {
    field,
    value: value.to_owned(),
  })
}

/// Validate `draft`, persist it and, when confirmed, synchronize its time
/// entries.
///
/// A synchronization failure does not roll the assignment back; it is
/// reported as [`Error::SyncFailed`] carrying the committed assignment.
pub async fn create_assignment<S, T>(
  store: &S,
  sync: &T,
  draft: AssignmentDraft,
) -> Result<CreatedAssignment>
where
  S: PlanningStore,
  T: TimeTrackingSync,
{
  let project_text =
    text(draft.project_id).ok_or(Error::MissingField("projektId"))?;
  let start = required_date("von", text(draft.start).as_deref())?;
  let end = required_date("bis", text(draft.end).as_deref())?;
  let (start, end) = (start.start_instant(), end.end_instant());
  if start > end {
    return Err(Error::StartAfterEnd);
  }

  let setup_start = text(draft.setup_start);
  let setup_end = text(draft.setup_end);
  let teardown_start = text(draft.teardown_start);
  let teardown_end = text(draft.teardown_end);
  let setup = parse_window(
    ("aufbauVon", "aufbauBis"),
    setup_start.as_deref(),
    setup_end.as_deref(),
    hours(draft.setup_hours),
  )?;
  let teardown = parse_window(
    ("abbauVon", "abbauBis"),
    teardown_start.as_deref(),
    teardown_end.as_deref(),
    hours(draft.teardown_hours),
  )?;
  check_daily_hours("stundenAufbau", setup.as_ref())?;
  check_daily_hours("stundenAbbau", teardown.as_ref())?;

  let employee = match text(draft.employee_id) {
    Some(id_text) => {
      let found = match Uuid::parse_str(&id_text) {
        Ok(id) => store.get_employee(id).await.map_err(Error::store)?,
        Err(_) => None,
      };
      Some(found.ok_or(Error::EmployeeNotFound(id_text))?)
    }
    None => None,
  };
  let project = match Uuid::parse_str(&project_text) {
    Ok(id) => store.get_project(id).await.map_err(Error::store)?,
    Err(_) => None,
  }
  .ok_or(Error::ProjectNotFound(project_text))?;

  let now = Utc::now();
  let phases = if setup.is_none() && teardown.is_none() {
    PhasePlan::Undivided
  } else {
    PhasePlan::Windows { setup, teardown }
  };
  let assignment = Assignment {
    id: Uuid::new_v4(),
    employee_id: employee.as_ref().map(|e| e.id),
    employee_name: employee.as_ref().map(|e| e.display_name()),
    project_id: project.id,
    project_name: project.name,
    start,
    end,
    role: text(draft.role),
    planned_hours: hours(draft.planned_hours),
    notes: text(draft.notes),
    confirmed: draft.confirmed.unwrap_or(false),
    phases,
    created_at: Some(now),
    updated_at: Some(now),
  };

  let assignment = store
    .insert_assignment(assignment)
    .await
    .map_err(Error::store)?;
  tracing::info!(
    assignment_id = %assignment.id,
    project_id = %assignment.project_id,
    confirmed = assignment.confirmed,
    "assignment created"
  );

  let sync_counts = if assignment.confirmed {
    match sync.sync(&assignment).await {
      Ok(counts) => counts,
      Err(e) => {
        tracing::error!(
          assignment_id = %assignment.id,
          error = %e,
          "time-tracking sync failed"
        );
        return Err(Error::SyncFailed {
          assignment: Box::new(assignment),
          source:     Box::new(e),
        });
      }
    }
  } else {
    SyncCounts::default()
  };

  Ok(CreatedAssignment {
    assignment,
    sync: sync_counts,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    assignment::Phase,
    date::format_instant,
    memory::{FailingSync, MemoryStore},
  };

  fn draft(store: &MemoryStore) -> AssignmentDraft {
    AssignmentDraft {
      employee_id: Some(store.employees[0].id.to_string()),
      project_id: Some(store.projects[0].id.to_string()),
      start: Some("2024-06-01T08:00:00Z".into()),
      end: Some("2024-06-01T16:00:00Z".into()),
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn creates_with_denormalized_names() {
    let store = MemoryStore::seeded();
    let created = create_assignment(&store, &store, AssignmentDraft {
      role: Some("Rigger".into()),
      ..draft(&store)
    })
    .await
    .unwrap();

    let a = &created.assignment;
    assert_eq!(a.employee_name.as_deref(), Some("Anna Berg"));
    assert_eq!(a.project_name, "Rathaus");
    assert!(!a.confirmed);
    assert!(a.created_at.is_some());
    assert_eq!(created.sync, SyncCounts::default());
    assert_eq!(store.assignments().len(), 1);
  }

  #[tokio::test]
  async fn validation_runs_in_order() {
    let store = MemoryStore::seeded();

    let err = create_assignment(&store, &store, AssignmentDraft::default())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::MissingField("projektId")));

    let err = create_assignment(&store, &store, AssignmentDraft {
      start: Some("tomorrow".into()),
      end: None,
      ..draft(&store)
    })
    .await
    .unwrap_err();
    assert!(matches!(err, Error::InvalidDate { field: "von", .. }));

    let err = create_assignment(&store, &store, AssignmentDraft {
      end: None,
      ..draft(&store)
    })
    .await
    .unwrap_err();
    assert!(matches!(err, Error::MissingField("bis")));

    let err = create_assignment(&store, &store, AssignmentDraft {
      start: Some("2024-06-02T08:00:00Z".into()),
      project_id: Some(Uuid::from_u128(999).to_string()),
      ..draft(&store)
    })
    .await
    .unwrap_err();
    assert!(matches!(err, Error::StartAfterEnd));

    let err = create_assignment(&store, &store, AssignmentDraft {
      setup_start: Some("2024-06-01T07:00:00Z".into()),
      setup_end: Some("later".into()),
      ..draft(&store)
    })
    .await
    .unwrap_err();
    assert!(matches!(err, Error::InvalidDate { field: "aufbauBis", .. }));

    assert!(store.assignments().is_empty());
  }

  #[tokio::test]
  async fn window_hours_are_capped_per_day() {
    let store = MemoryStore::seeded();

    let err = create_assignment(&store, &store, AssignmentDraft {
      confirmed: Some(true),
      setup_start: Some("2024-06-01".into()),
      setup_hours: Some(1e12),
      ..draft(&store)
    })
    .await
    .unwrap_err();
    assert!(matches!(
      err,
      Error::HoursOutOfRange { field: "stundenAufbau", .. }
    ));
    assert!(err.is_validation());

    let err = create_assignment(&store, &store, AssignmentDraft {
      teardown_start: Some("2024-06-01".into()),
      teardown_hours: Some(25.0),
      ..draft(&store)
    })
    .await
    .unwrap_err();
    assert!(matches!(
      err,
      Error::HoursOutOfRange { field: "stundenAbbau", .. }
    ));
    assert!(store.assignments().is_empty());

    // Thirty hours over two days fit.
    let created = create_assignment(&store, &store, AssignmentDraft {
      confirmed: Some(true),
      setup_start: Some("2024-06-01".into()),
      setup_end: Some("2024-06-02".into()),
      setup_hours: Some(30.0),
      ..draft(&store)
    })
    .await
    .unwrap();
    assert_eq!(created.sync, SyncCounts { created: 2, deleted: 0 });
  }

  #[tokio::test]
  async fn equal_start_and_end_is_accepted() {
    let store = MemoryStore::seeded();
    let created = create_assignment(&store, &store, AssignmentDraft {
      end: Some("2024-06-01T08:00:00Z".into()),
      ..draft(&store)
    })
    .await
    .unwrap();
    assert_eq!(created.assignment.start, created.assignment.end);
  }

  #[tokio::test]
  async fn unknown_references_are_not_found_and_persist_nothing() {
    let store = MemoryStore::seeded();

    let err = create_assignment(&store, &store, AssignmentDraft {
      project_id: Some(Uuid::from_u128(999).to_string()),
      ..draft(&store)
    })
    .await
    .unwrap_err();
    assert!(matches!(err, Error::ProjectNotFound(_)));

    let err = create_assignment(&store, &store, AssignmentDraft {
      employee_id: Some("not-an-id".into()),
      ..draft(&store)
    })
    .await
    .unwrap_err();
    assert!(matches!(err, Error::EmployeeNotFound(_)));
    assert!(err.is_not_found());

    assert!(store.assignments().is_empty());
  }

  #[tokio::test]
  async fn blank_employee_creates_unassigned_booking() {
    let store = MemoryStore::seeded();
    let created = create_assignment(&store, &store, AssignmentDraft {
      employee_id: Some("  ".into()),
      ..draft(&store)
    })
    .await
    .unwrap();
    assert_eq!(created.assignment.employee_id, None);
    assert_eq!(created.assignment.employee_name, None);
  }

  #[tokio::test]
  async fn confirmed_assignment_is_synchronized() {
    let store = MemoryStore::seeded();
    let created = create_assignment(&store, &store, AssignmentDraft {
      confirmed: Some(true),
      setup_start: Some("2024-06-01".into()),
      setup_end: Some("2024-06-02".into()),
      setup_hours: Some(16.0),
      ..draft(&store)
    })
    .await
    .unwrap();

    assert_eq!(created.sync, SyncCounts { created: 2, deleted: 0 });
    let spans = created.assignment.spans();
    assert_eq!(spans[0].0, Phase::Setup);
    assert_eq!(format_instant(spans[0].2), "2024-06-02T23:59:59.999Z");
    assert_eq!(store.time_entries().len(), 2);
  }

  #[tokio::test]
  async fn sync_failure_keeps_the_assignment() {
    let store = MemoryStore::seeded();
    let err = create_assignment(&store, &FailingSync, AssignmentDraft {
      confirmed: Some(true),
      ..draft(&store)
    })
    .await
    .unwrap_err();

    let Error::SyncFailed { assignment, .. } = err else {
      panic!("expected SyncFailed, got {err:?}");
    };
    assert_eq!(store.assignments(), vec![*assignment]);
  }
}
