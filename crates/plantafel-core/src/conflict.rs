//! Conflict detector.
//!
//! [`detect_conflicts`] is pure: it takes the scoped events and returns a new,
//! annotated event list alongside the conflicts it found. Detection runs per
//! employee with a sweep line over events sorted by start, which yields the
//! same pairs as comparing every two events of that employee.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::{Event, SourceType};

// ─── Types ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
  DoubleBooking,
  WorkDuringAbsence,
}

impl ConflictKind {
  /// The annotation written onto conflicting events.
  pub fn reason(self) -> &'static str {
    match self {
      Self::DoubleBooking => "Double booking",
      Self::WorkDuringAbsence => "Work during absence",
    }
  }
}

/// Declared in ascending order so `Error` sorts after `Warning`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Warning,
  Error,
}

/// The slice of an event a conflict needs to describe itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictEventSummary {
  pub id:           String,
  pub title:        String,
  pub start:        DateTime<Utc>,
  pub end:          DateTime<Utc>,
  pub source_type:  SourceType,
  pub source_id:    Uuid,
  pub project_name: Option<String>,
  pub confirmed:    bool,
}

impl From<&Event> for ConflictEventSummary {
  fn from(e: &Event) -> Self {
    Self {
      id:           e.id.clone(),
      title:        e.title.clone(),
      start:        e.start,
      end:          e.end,
      source_type:  e.source_type,
      source_id:    e.source_id,
      project_name: e.project_name.clone(),
      confirmed:    e.confirmed,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
  /// `conflict-{a}+{b}` with the two event ids in lexicographic order.
  pub id:            String,
  pub employee_id:   Uuid,
  pub employee_name: Option<String>,
  #[serde(rename = "type")]
  pub kind:          ConflictKind,
  pub severity:      Severity,
  pub reason:        String,
  /// The two events, ordered like the ids in `id`.
  pub events:        [ConflictEventSummary; 2],
  pub overlap_start: DateTime<Utc>,
  pub overlap_end:   DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictReport {
  pub events:    Vec<Event>,
  pub conflicts: Vec<Conflict>,
}

// ─── Detection ───────────────────────────────────────────────────────────────

fn classify(a: &Event, b: &Event) -> (ConflictKind, Severity) {
  let kind = if a.is_absence() || b.is_absence() {
    ConflictKind::WorkDuringAbsence
  } else {
    ConflictKind::DoubleBooking
  };
  let severity = if a.is_confirmed_assignment() && b.is_confirmed_assignment()
  {
    Severity::Error
  } else {
    Severity::Warning
  };
  (kind, severity)
}

fn annotate(event: &mut Event, kind: ConflictKind) {
  event.has_conflict = true;
  let absence_reason = ConflictKind::WorkDuringAbsence.reason();
  if event.conflict_reason.as_deref() != Some(absence_reason) {
    event.conflict_reason = Some(kind.reason().to_owned());
  }
}

pub fn detect_conflicts(events: Vec<Event>) -> ConflictReport {
  let mut events = events;

  let mut by_employee: BTreeMap<Uuid, Vec<usize>> = BTreeMap::new();
  for (idx, e) in events.iter().enumerate() {
    if let Some(employee) = e.employee_id {
      by_employee.entry(employee).or_default().push(idx);
    }
  }

  let mut seen: HashSet<(String, String)> = HashSet::new();
  let mut conflicts = Vec::new();
  let mut hits: Vec<(usize, usize, ConflictKind)> = Vec::new();

  for (employee, mut indices) in by_employee {
    indices.sort_by(|&a, &b| {
      let (a, b) = (&events[a], &events[b]);
      a.start
        .cmp(&b.start)
        .then(a.end.cmp(&b.end))
        .then_with(|| a.id.cmp(&b.id))
    });

    for (pos, &i) in indices.iter().enumerate() {
      for &j in &indices[pos + 1..] {
        let (current, other) = (&events[i], &events[j]);
        if other.start >= current.end {
          break;
        }
        if !current.overlaps(other) {
          continue;
        }

        let (lo, hi) = if current.id <= other.id { (i, j) } else { (j, i) };
        let (first, second) = (&events[lo], &events[hi]);
        if !seen.insert((first.id.clone(), second.id.clone())) {
          continue;
        }

        let (kind, severity) = classify(first, second);
        let employee_name = first
          .employee_name
          .clone()
          .or_else(|| second.employee_name.clone());
        conflicts.push(Conflict {
          id: format!("conflict-{}+{}", first.id, second.id),
          employee_id: employee,
          employee_name,
          kind,
          severity,
          reason: kind.reason().to_owned(),
          events: [first.into(), second.into()],
          overlap_start: first.start.max(second.start),
          overlap_end: first.end.min(second.end),
        });
        hits.push((lo, hi, kind));
      }
    }
  }

  for (a, b, kind) in hits {
    annotate(&mut events[a], kind);
    annotate(&mut events[b], kind);
  }

  tracing::debug!(
    events = events.len(),
    conflicts = conflicts.len(),
    "conflict detection finished"
  );
  ConflictReport { events, conflicts }
}
