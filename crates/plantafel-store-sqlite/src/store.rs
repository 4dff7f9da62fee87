//! [`SqliteStore`]: the SQLite implementation of [`PlanningStore`] and
//! [`TimeTrackingSync`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use plantafel_core::{
  absence::{AbsenceRow, AbsenceStatus},
  assignment::{Assignment, AssignmentRow},
  directory::{Employee, Project},
  store::{PlanningStore, RecordQuery, TimeTrackingSync},
  timesheet::{SyncCounts, TimeEntry, plan_time_entries},
};

use crate::{
  Error, Result,
  encode::{
    ABSENCE_COLUMNS, ASSIGNMENT_COLUMNS, EMPLOYEE_COLUMNS, PROJECT_COLUMNS,
    RawEmployee, RawProject, RawTimeEntry, TIME_ENTRY_COLUMNS, absence_row,
    assignment_row, encode_date, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A planning store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Append `AND <column> IN (?n, ...)` for a non-empty id list.
fn push_in_clause(
  sql: &mut String,
  params: &mut Vec<String>,
  column: &str,
  ids: &[Uuid],
) {
  if ids.is_empty() {
    return;
  }
  let placeholders: Vec<String> = ids
    .iter()
    .map(|id| {
      params.push(encode_uuid(*id));
      format!("?{}", params.len())
    })
    .collect();
  sql.push_str(&format!(" AND {column} IN ({})", placeholders.join(", ")));
}

/// Date bounds for the coarse text prefilter on `start_at`/`end_at`.
///
/// Stored values may carry a UTC offset (at most ±14h), so their date prefix
/// can sit one day off their UTC date. The bounds are widened by a day on
/// each side; the exact window clip happens after normalization.
fn padded_window(query: &RecordQuery) -> (String, String) {
  let from = query.from.pred_opt().unwrap_or(query.from);
  let to = query.to.succ_opt().unwrap_or(query.to);
  (encode_date(from), encode_date(to))
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Catalog writes ────────────────────────────────────────────────────────

  /// Insert or replace an employee.
  pub async fn put_employee(&self, employee: &Employee) -> Result<()> {
    let id_str = encode_uuid(employee.id);
    let first = employee.first_name.clone();
    let last = employee.last_name.clone();
    let active = employee.active;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO employees (
             employee_id, first_name, last_name, active
           ) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, first, last, active],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or replace a project.
  pub async fn put_project(&self, project: &Project) -> Result<()> {
    let id_str   = encode_uuid(project.id);
    let number   = project.number.clone();
    let name     = project.name.clone();
    let customer = project.customer_name.clone();
    let status   = project.status.as_str();
    let address  = project.address.clone().unwrap_or_default();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO projects (
             project_id, number, name, customer_name, status,
             street, postal_code, city
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            number,
            name,
            customer,
            status,
            address.street,
            address.postal_code,
            address.city,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Planning record writes ────────────────────────────────────────────────

  /// Insert an absence exactly as given.
  pub async fn insert_absence_row(&self, row: AbsenceRow) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO absences (
             absence_id, employee_id, employee_name, start_at, end_at,
             kind, status, reason
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            row.id,
            row.employee_id,
            row.employee_name,
            row.start,
            row.end,
            row.kind,
            row.status,
            row.reason,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert an assignment row exactly as given, without validation. Used to
  /// import records written by older clients.
  pub async fn insert_assignment_row(&self, row: AssignmentRow) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO assignments ({ASSIGNMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)"
          ),
          rusqlite::params![
            row.id,
            row.employee_id,
            row.employee_name,
            row.project_id,
            row.project_name,
            row.start,
            row.end,
            row.role,
            row.planned_hours,
            row.notes,
            row.confirmed,
            row.setup_date,
            row.teardown_date,
            row.setup_start,
            row.setup_end,
            row.setup_hours,
            row.teardown_start,
            row.teardown_end,
            row.teardown_hours,
            row.created_at,
            row.updated_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Time entries ──────────────────────────────────────────────────────────

  /// Time entries linked to an assignment, ordered by date and activity.
  pub async fn time_entries_for(
    &self,
    assignment_id: Uuid,
  ) -> Result<Vec<TimeEntry>> {
    let id_str = encode_uuid(assignment_id);

    let raws: Vec<RawTimeEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TIME_ENTRY_COLUMNS} FROM time_entries
           WHERE assignment_id = ?1
           ORDER BY work_date, activity"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawTimeEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTimeEntry::into_time_entry).collect()
  }

  /// Replace the time entries of `assignment_id` with `entries` in one
  /// transaction.
  async fn replace_time_entries(
    &self,
    assignment_id: Uuid,
    entries: Vec<TimeEntry>,
  ) -> Result<SyncCounts> {
    let id_str = encode_uuid(assignment_id);

    let counts = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let deleted = tx.execute(
          "DELETE FROM time_entries WHERE assignment_id = ?1",
          rusqlite::params![id_str],
        )?;
        {
          let mut stmt = tx.prepare(&format!(
            "INSERT INTO time_entries (entry_id, {TIME_ENTRY_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15)"
          ))?;
          for e in &entries {
            stmt.execute(rusqlite::params![
              encode_uuid(Uuid::new_v4()),
              id_str,
              e.employee_id.map(encode_uuid),
              e.employee_name,
              encode_uuid(e.project_id),
              e.project_name,
              encode_date(e.date),
              e.from,
              e.to,
              e.hours,
              e.activity.as_str(),
              e.status,
              e.description,
              e.auto_created,
              encode_dt(e.created_at),
            ])?;
          }
        }
        tx.commit()?;
        Ok(SyncCounts { created: entries.len(), deleted })
      })
      .await?;

    Ok(counts)
  }
}

// ─── PlanningStore impl ──────────────────────────────────────────────────────

impl PlanningStore for SqliteStore {
  type Error = Error;

  // ── Catalogs ──────────────────────────────────────────────────────────────

  async fn list_employees(&self) -> Result<Vec<Employee>> {
    let raws: Vec<RawEmployee> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees"))?;
        let rows = stmt
          .query_map([], RawEmployee::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmployee::into_employee).collect()
  }

  async fn list_projects(&self) -> Result<Vec<Project>> {
    let raws: Vec<RawProject> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects"))?;
        let rows = stmt
          .query_map([], RawProject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProject::into_project).collect()
  }

  async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEmployee> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_id = ?1"
            ),
            rusqlite::params![id_str],
            RawEmployee::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawEmployee::into_employee).transpose()
  }

  async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {PROJECT_COLUMNS} FROM projects WHERE project_id = ?1"
            ),
            rusqlite::params![id_str],
            RawProject::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProject::into_project).transpose()
  }

  // ── Planning records ──────────────────────────────────────────────────────

  async fn assignment_rows(
    &self,
    query: &RecordQuery,
  ) -> Result<Vec<AssignmentRow>> {
    let mut sql = format!(
      "SELECT {ASSIGNMENT_COLUMNS} FROM assignments
       WHERE substr(start_at, 1, 10) <= ?1 AND substr(end_at, 1, 10) >= ?2"
    );
    let (from, to) = padded_window(query);
    let mut params = vec![to, from];
    push_in_clause(&mut sql, &mut params, "employee_id", &query.employee_ids);
    push_in_clause(&mut sql, &mut params, "project_id", &query.project_ids);
    sql.push_str(" ORDER BY start_at, assignment_id");

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), assignment_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn absence_rows(&self, query: &RecordQuery) -> Result<Vec<AbsenceRow>> {
    let mut sql = format!(
      "SELECT {ABSENCE_COLUMNS} FROM absences
       WHERE status = ?1
         AND substr(start_at, 1, 10) <= ?2 AND substr(end_at, 1, 10) >= ?3"
    );
    let (from, to) = padded_window(query);
    let mut params =
      vec![AbsenceStatus::Approved.as_str().to_owned(), to, from];
    push_in_clause(&mut sql, &mut params, "employee_id", &query.employee_ids);
    sql.push_str(" ORDER BY start_at, absence_id");

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), absence_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn insert_assignment(
    &self,
    assignment: Assignment,
  ) -> Result<Assignment> {
    self
      .insert_assignment_row(AssignmentRow::from(&assignment))
      .await?;
    Ok(assignment)
  }
}

// ─── TimeTrackingSync impl ───────────────────────────────────────────────────

impl TimeTrackingSync for SqliteStore {
  type Error = Error;

  async fn sync(&self, assignment: &Assignment) -> Result<SyncCounts> {
    let entries = plan_time_entries(assignment, Utc::now());
    let counts = self.replace_time_entries(assignment.id, entries).await?;
    tracing::debug!(
      assignment_id = %assignment.id,
      created = counts.created,
      deleted = counts.deleted,
      "time entries synchronized"
    );
    Ok(counts)
  }
}
