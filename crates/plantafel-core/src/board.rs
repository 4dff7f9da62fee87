//! Board loader: the read pipeline behind the planning board.
//!
//! ```text
//! store rows ─┬─> normalize ─> window clip ─> scope ─> detect ─> aggregate
//! catalogs  ──┘                                ^                 (project)
//!                                       resolve resources
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  aggregate::aggregate_project_view,
  conflict::{Conflict, Severity, detect_conflicts},
  date::DateValue,
  event::{Event, View},
  normalize::{AddressBook, normalize_events},
  resource::{Resource, resolve_resources},
  scope::scope_events,
  store::{PlanningStore, RecordQuery},
};

// ─── Query parsing ───────────────────────────────────────────────────────────

/// Parse a `from`/`to` pair. A date-only `to` covers that whole day.
pub fn parse_window(
  from: Option<&str>,
  to: Option<&str>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
  let parse = |field: &'static str, text: Option<&str>| -> Result<DateValue> {
    let text = text
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .ok_or(Error::MissingField(field))?;
    DateValue::parse(text).ok_or_else(|| Error::InvalidDate {
      field,
      value: text.to_owned(),
    })
  };
  let from = parse("from", from)?.start_instant();
  let to = parse("to", to)?.end_instant();
  if from > to {
    return Err(Error::StartAfterEnd);
  }
  Ok((from, to))
}

/// Parse a comma-separated id list; blank entries are ignored.
pub fn parse_ids(field: &'static str, text: Option<&str>) -> Result<Vec<Uuid>> {
  let Some(text) = text else { return Ok(Vec::new()) };
  text
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| {
      Uuid::parse_str(s).map_err(|_| Error::InvalidId {
        field,
        value: s.to_owned(),
      })
    })
    .collect()
}

// ─── Board ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct BoardQuery {
  pub from:          DateTime<Utc>,
  pub to:            DateTime<Utc>,
  pub view:          View,
  /// Row allow-list in team view; record filter in both views.
  pub employee_ids:  Vec<Uuid>,
  /// Row allow-list in project view; record filter in both views.
  pub project_ids:   Vec<Uuid>,
  pub show_absences: bool,
}

impl BoardQuery {
  pub fn new(from: DateTime<Utc>, to: DateTime<Utc>, view: View) -> Self {
    Self {
      from,
      to,
      view,
      employee_ids: Vec::new(),
      project_ids: Vec::new(),
      show_absences: true,
    }
  }

  fn records(&self) -> RecordQuery {
    RecordQuery {
      from:         self.from.date_naive(),
      to:           self.to.date_naive(),
      employee_ids: self.employee_ids.clone(),
      project_ids:  self.project_ids.clone(),
    }
  }

  fn allow_list(&self) -> &[Uuid] {
    match self.view {
      View::Team => &self.employee_ids,
      View::Project => &self.project_ids,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMeta {
  pub from:              DateTime<Utc>,
  pub to:                DateTime<Utc>,
  pub total_events:      usize,
  /// Distinct assignments behind the returned events.
  pub total_assignments: usize,
  pub total_absences:    usize,
  pub total_conflicts:   usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
  pub events:    Vec<Event>,
  pub resources: Vec<Resource>,
  pub conflicts: Vec<Conflict>,
  pub meta:      BoardMeta,
}

/// Load rows and catalogs concurrently, then run the board pipeline.
pub async fn load_board<S: PlanningStore>(
  store: &S,
  query: &BoardQuery,
) -> Result<Board> {
  let records = query.records();
  let absences = async {
    if query.show_absences {
      store.absence_rows(&records).await
    } else {
      Ok(Vec::new())
    }
  };
  let (assignment_rows, absence_rows, employees, projects) = tokio::try_join!(
    store.assignment_rows(&records),
    absences,
    store.list_employees(),
    store.list_projects(),
  )
  .map_err(Error::store)?;

  let addresses: AddressBook = projects
    .iter()
    .filter_map(|p| p.address.clone().map(|a| (p.id, a)))
    .collect();

  let mut events =
    normalize_events(assignment_rows, absence_rows, query.view, &addresses);
  events.retain(|e| e.intersects_window(query.from, query.to));

  let resources =
    resolve_resources(query.view, query.allow_list(), &employees, &projects);
  let events = scope_events(events, &resources, query.view);

  let report = detect_conflicts(events);
  let events = match query.view {
    View::Team => report.events,
    View::Project => aggregate_project_view(report.events),
  };

  let meta = BoardMeta {
    from:              query.from,
    to:                query.to,
    total_events:      events.len(),
    total_assignments: count_assignments(&events),
    total_absences:    events.iter().filter(|e| e.is_absence()).count(),
    total_conflicts:   report.conflicts.len(),
  };
  tracing::debug!(
    view = ?query.view,
    events = meta.total_events,
    resources = resources.len(),
    conflicts = meta.total_conflicts,
    "board loaded"
  );

  Ok(Board {
    events,
    resources,
    conflicts: report.conflicts,
    meta,
  })
}

fn count_assignments(events: &[Event]) -> usize {
  let mut ids = HashSet::new();
  for e in events.iter().filter(|e| e.is_assignment()) {
    ids.insert(e.source_id);
    ids.extend(e.source_ids.iter().copied());
  }
  ids.len()
}

// ─── Conflict overview ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictMeta {
  pub from:            DateTime<Utc>,
  pub to:              DateTime<Utc>,
  pub total_conflicts: usize,
  pub error_count:     usize,
  pub warning_count:   usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictSummary {
  pub conflicts: Vec<Conflict>,
  pub meta:      ConflictMeta,
}

/// Every conflict in the window, unscoped by board rows, errors first and
/// then by overlap start.
pub async fn load_conflicts<S: PlanningStore>(
  store: &S,
  from: DateTime<Utc>,
  to: DateTime<Utc>,
  employee: Option<Uuid>,
) -> Result<ConflictSummary> {
  let mut records = RecordQuery::window(from.date_naive(), to.date_naive());
  records.employee_ids.extend(employee);

  let (assignment_rows, absence_rows) = tokio::try_join!(
    store.assignment_rows(&records),
    store.absence_rows(&records),
  )
  .map_err(Error::store)?;

  let mut events = normalize_events(
    assignment_rows,
    absence_rows,
    View::Team,
    &AddressBook::new(),
  );
  events.retain(|e| e.intersects_window(from, to));

  let mut conflicts = detect_conflicts(events).conflicts;
  conflicts.sort_by(|a, b| {
    b.severity
      .cmp(&a.severity)
      .then(a.overlap_start.cmp(&b.overlap_start))
  });

  let error_count = conflicts
    .iter()
    .filter(|c| c.severity == Severity::Error)
    .count();
  let meta = ConflictMeta {
    from,
    to,
    total_conflicts: conflicts.len(),
    error_count,
    warning_count: conflicts.len() - error_count,
  };
  Ok(ConflictSummary { conflicts, meta })
}
