//! JSON seed import for fresh or demo databases.
//!
//! ```json
//! {
//!   "employees":   [{ "id": "...", "firstName": "Anna", "lastName": "Berg", "active": true }],
//!   "projects":    [{ "id": "...", "name": "Rathaus", "status": "active" }],
//!   "absences":    [{ "id": "...", "employeeId": "...", "start": "2024-07-01", "end": "2024-07-05", "status": "approved" }],
//!   "assignments": [{ "id": "...", "projectId": "...", "start": "2024-06-01T08:00:00Z", "end": "2024-06-01T16:00:00Z" }]
//! }
//! ```
//!
//! Absence and assignment entries are stored as given, legacy shapes
//! included, so the board can be exercised against real-world data.

use std::path::Path;

use anyhow::Context as _;
use plantafel_core::{
  absence::AbsenceRow,
  assignment::AssignmentRow,
  directory::{Employee, Project},
};
use plantafel_store_sqlite::SqliteStore;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
  pub employees:   Vec<Employee>,
  pub projects:    Vec<Project>,
  pub absences:    Vec<AbsenceRow>,
  pub assignments: Vec<AssignmentRow>,
}

impl Seed {
  pub fn from_path(path: &Path) -> anyhow::Result<Self> {
    let text = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read seed file {path:?}"))?;
    serde_json::from_str(&text)
      .with_context(|| format!("failed to parse seed file {path:?}"))
  }

  /// Write every record into `store`. Existing catalog entries with the same
  /// id are replaced.
  pub async fn import(self, store: &SqliteStore) -> anyhow::Result<()> {
    let counts = (
      self.employees.len(),
      self.projects.len(),
      self.absences.len(),
      self.assignments.len(),
    );

    for employee in &self.employees {
      store
        .put_employee(employee)
        .await
        .with_context(|| format!("failed to import employee {}", employee.id))?;
    }
    for project in &self.projects {
      store
        .put_project(project)
        .await
        .with_context(|| format!("failed to import project {}", project.id))?;
    }
    for row in self.absences {
      let id = row.id.clone();
      store
        .insert_absence_row(row)
        .await
        .with_context(|| format!("failed to import absence {id}"))?;
    }
    for row in self.assignments {
      let id = row.id.clone();
      store
        .insert_assignment_row(row)
        .await
        .with_context(|| format!("failed to import assignment {id}"))?;
    }

    tracing::info!(
      employees = counts.0,
      projects = counts.1,
      absences = counts.2,
      assignments = counts.3,
      "seed imported"
    );
    Ok(())
  }
}
