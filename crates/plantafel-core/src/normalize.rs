//! Event normalizer: assignment and absence rows in, uniform [`Event`]s out.
//!
//! Rows that fail to parse are skipped with a warning; one bad record must
//! not blank the whole board.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
  absence::{Absence, AbsenceRow, AbsenceStatus},
  assignment::{Assignment, AssignmentRow},
  directory::SiteAddress,
  event::{Event, SourceType, UNASSIGNED_RESOURCE_ID, View},
};

/// Site addresses keyed by project id.
pub type AddressBook = HashMap<Uuid, SiteAddress>;

const NO_PROJECT: &str = "No project";

/// Normalize every parseable row into events for `view`.
pub fn normalize_events(
  assignments: Vec<AssignmentRow>,
  absences: Vec<AbsenceRow>,
  view: View,
  addresses: &AddressBook,
) -> Vec<Event> {
  let mut events = Vec::with_capacity(assignments.len() + absences.len());

  for row in assignments {
    let row_id = row.id.clone();
    match row.parse() {
      Ok(a) => {
        let address = addresses.get(&a.project_id);
        events.extend(assignment_events(&a, view, address));
      }
      Err(e) => {
        tracing::warn!(row_id, error = %e, "skipping malformed assignment row");
      }
    }
  }

  let approved = Some(AbsenceStatus::Approved.as_str());
  for row in absences {
    if row.status.as_deref() != approved {
      continue;
    }
    let row_id = row.id.clone();
    match row.parse() {
      Ok(a) => events.push(absence_event(&a)),
      Err(e) => {
        tracing::warn!(row_id, error = %e, "skipping malformed absence row");
      }
    }
  }

  events
}

fn base_title(a: &Assignment, view: View) -> String {
  let project = Some(a.project_name.as_str()).filter(|n| !n.is_empty());
  let employee = a
    .employee_id
    .and(a.employee_name.as_deref())
    .filter(|n| !n.is_empty());
  match view {
    View::Team => employee.or(project).unwrap_or(NO_PROJECT).to_owned(),
    View::Project => project.unwrap_or(NO_PROJECT).to_owned(),
  }
}

/// One event per span of the assignment (whole booking, or setup/teardown).
pub fn assignment_events(
  a: &Assignment,
  view: View,
  address: Option<&SiteAddress>,
) -> Vec<Event> {
  let title = base_title(a, view);
  let resource_id = match view {
    View::Team => a
      .employee_id
      .map(|id| id.to_string())
      .unwrap_or_else(|| UNASSIGNED_RESOURCE_ID.to_owned()),
    View::Project => a.project_id.to_string(),
  };
  let address = address.filter(|addr| !addr.is_empty()).cloned();

  a.spans()
    .into_iter()
    .map(|(phase, start, end)| {
      let (id, title) = match phase.suffix() {
        Some(suffix) => (
          format!("assignment-{}-{suffix}", a.id),
          format!("{title} ({suffix})"),
        ),
        None => (format!("assignment-{}", a.id), title.clone()),
      };
      Event {
        id,
        title,
        start,
        end,
        source_type: SourceType::Assignment,
        source_id: a.id,
        resource_id: resource_id.clone(),
        employee_id: a.employee_id,
        employee_name: a.employee_name.clone(),
        project_id: Some(a.project_id),
        project_name: Some(a.project_name.clone()),
        phase,
        confirmed: a.confirmed,
        role: a.role.clone(),
        notes: a.notes.clone(),
        absence_kind: None,
        address: address.clone(),
        employee_ids: Vec::new(),
        employee_names: Vec::new(),
        source_ids: Vec::new(),
        has_conflict: false,
        conflict_reason: None,
      }
    })
    .collect()
}

pub fn absence_event(a: &Absence) -> Event {
  let label = a.kind.label();
  let title = match a.employee_name.as_deref().filter(|n| !n.is_empty()) {
    Some(name) => format!("{name} ({label})"),
    None => label.to_owned(),
  };
  Event {
    id: format!("absence-{}", a.id),
    title,
    start: a.start,
    end: a.end,
    source_type: SourceType::Absence,
    source_id: a.id,
    resource_id: a.employee_id.to_string(),
    employee_id: Some(a.employee_id),
    employee_name: a.employee_name.clone(),
    project_id: None,
    project_name: None,
    phase: Default::default(),
    confirmed: false,
    role: None,
    notes: a.reason.clone(),
    absence_kind: Some(a.kind),
    address: None,
    employee_ids: Vec::new(),
    employee_names: Vec::new(),
    source_ids: Vec::new(),
    has_conflict: false,
    conflict_reason: None,
  }
}
