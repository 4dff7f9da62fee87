//! Board events: the request-scoped calendar items derived from assignments
//! and absences. Events are recomputed on every read and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result, absence::AbsenceKind, assignment::Phase, directory::SiteAddress,
};

/// Lane id used in team view for assignments without an employee.
pub const UNASSIGNED_RESOURCE_ID: &str = "unassigned";

// ─── View ────────────────────────────────────────────────────────────────────

/// The two board display modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
  /// One row per employee.
  #[default]
  Team,
  /// One row per project.
  Project,
}

impl View {
  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "team" => Ok(Self::Team),
      "project" => Ok(Self::Project),
      other => Err(Error::InvalidView(other.to_owned())),
    }
  }
}

// ─── Event ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
  Assignment,
  Absence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub id:              String,
  pub title:           String,
  pub start:           DateTime<Utc>,
  pub end:             DateTime<Utc>,
  pub source_type:     SourceType,
  /// Id of the assignment or absence this event was derived from.
  pub source_id:       Uuid,
  /// The board lane: an employee id (or [`UNASSIGNED_RESOURCE_ID`]) in team
  /// view, a project id in project view.
  pub resource_id:     String,
  pub employee_id:     Option<Uuid>,
  pub employee_name:   Option<String>,
  pub project_id:      Option<Uuid>,
  pub project_name:    Option<String>,
  pub phase:           Phase,
  /// Always `false` for absences.
  pub confirmed:       bool,
  pub role:            Option<String>,
  pub notes:           Option<String>,
  pub absence_kind:    Option<AbsenceKind>,
  pub address:         Option<SiteAddress>,

  // Filled by the project-view aggregator.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub employee_ids:    Vec<Uuid>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub employee_names:  Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub source_ids:      Vec<Uuid>,

  pub has_conflict:    bool,
  pub conflict_reason: Option<String>,
}

impl Event {
  pub fn is_assignment(&self) -> bool {
    self.source_type == SourceType::Assignment
  }

  pub fn is_absence(&self) -> bool { self.source_type == SourceType::Absence }

  /// A confirmed assignment; absences never count as confirmed.
  pub fn is_confirmed_assignment(&self) -> bool {
    self.is_assignment() && self.confirmed
  }

  /// Strict half-open overlap: touching intervals do not overlap.
  pub fn overlaps(&self, other: &Event) -> bool {
    self.start < other.end && other.start < self.end
  }

  /// Whether the event intersects the closed window `[from, to]`.
  pub fn intersects_window(
    &self,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
  ) -> bool {
    self.start <= to && self.end >= from
  }
}
