//! JSON REST API for the Plantafel planning board.
//!
//! Exposes an axum [`Router`] backed by any store implementing
//! [`PlanningStore`] and [`TimeTrackingSync`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", plantafel_api::api_router(store.clone()))
//! ```

pub mod assignments;
pub mod conflicts;
pub mod error;

use std::sync::Arc;

use axum::{Router, routing::get};
use plantafel_core::store::{PlanningStore, TimeTrackingSync};

pub use error::ApiError;

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PlanningStore + TimeTrackingSync + 'static,
{
  Router::new()
    .route(
      "/plantafel/assignments",
      get(assignments::board::<S>).post(assignments::create::<S>),
    )
    .route("/plantafel/conflicts", get(conflicts::handler::<S>))
    .with_state(store)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use plantafel_core::{
    absence::AbsenceRow,
    assignment::{Assignment, AssignmentRow},
    directory::{Employee, Project, ProjectStatus},
    store::RecordQuery,
    timesheet::SyncCounts,
  };
  use plantafel_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  const ANNA: Uuid = Uuid::from_u128(1);
  const BEN: Uuid = Uuid::from_u128(2);
  const RATHAUS: Uuid = Uuid::from_u128(100);

  async fn seeded() -> SqliteStore {
    let store = SqliteStore::open_in_memory().await.unwrap();
    for (id, first, last) in [(ANNA, "Anna", "Berg"), (BEN, "Ben", "Crane")] {
      store
        .put_employee(&Employee {
          id,
          first_name: first.into(),
          last_name: last.into(),
          active: true,
        })
        .await
        .unwrap();
    }
    store
      .put_project(&Project {
        id:            RATHAUS,
        number:        Some("P-100".into()),
        name:          "Rathaus".into(),
        customer_name: None,
        status:        ProjectStatus::Active,
        address:       None,
      })
      .await
      .unwrap();
    store
  }

  async fn make_store() -> Arc<SqliteStore> { Arc::new(seeded().await) }

  /// Planning reads and writes go to SQLite; time tracking is unreachable.
  struct OfflineTimeTracking(SqliteStore);

  impl PlanningStore for OfflineTimeTracking {
    type Error = plantafel_store_sqlite::Error;

    async fn list_employees(&self) -> Result<Vec<Employee>, Self::Error> {
      self.0.list_employees().await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, Self::Error> {
      self.0.list_projects().await
    }

    async fn get_employee(
      &self,
      id: Uuid,
    ) -> Result<Option<Employee>, Self::Error> {
      self.0.get_employee(id).await
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, Self::Error> {
      self.0.get_project(id).await
    }

    async fn assignment_rows(
      &self,
      query: &RecordQuery,
    ) -> Result<Vec<AssignmentRow>, Self::Error> {
      self.0.assignment_rows(query).await
    }

    async fn absence_rows(
      &self,
      query: &RecordQuery,
    ) -> Result<Vec<AbsenceRow>, Self::Error> {
      self.0.absence_rows(query).await
    }

    async fn insert_assignment(
      &self,
      assignment: Assignment,
    ) -> Result<Assignment, Self::Error> {
      self.0.insert_assignment(assignment).await
    }
  }

  impl TimeTrackingSync for OfflineTimeTracking {
    type Error = std::io::Error;

    async fn sync(&self, _: &Assignment) -> Result<SyncCounts, Self::Error> {
      Err(std::io::Error::other("time tracking offline"))
    }
  }

  async fn send<S>(
    store: Arc<S>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value)
  where
    S: PlanningStore + TimeTrackingSync + 'static,
  {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(store)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
  }

  async fn post<S>(store: Arc<S>, body: Value) -> (StatusCode, Value)
  where
    S: PlanningStore + TimeTrackingSync + 'static,
  {
    send(store, "POST", "/plantafel/assignments", Some(body)).await
  }

  async fn get<S>(store: Arc<S>, uri: &str) -> (StatusCode, Value)
  where
    S: PlanningStore + TimeTrackingSync + 'static,
  {
    send(store, "GET", uri, None).await
  }

  // ── POST ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_sync_counts() {
    let store = make_store().await;
    let (status, body) = post(store, json!({
      "mitarbeiterId": ANNA,
      "projektId": RATHAUS,
      "von": "2024-06-01T08:00:00Z",
      "bis": "2024-06-02T16:00:00Z",
      "rolle": "Rigger",
      "bestaetigt": true,
      "aufbauVon": "2024-06-01",
      "aufbauBis": "2024-06-02",
      "stundenAufbau": 16,
    }))
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["assignment"]["employeeName"], "Anna Berg");
    assert_eq!(body["assignment"]["projectName"], "Rathaus");
    assert_eq!(body["assignment"]["confirmed"], true);
    assert_eq!(body["timeTrackingSync"], json!({ "created": 2, "deleted": 0 }));
  }

  #[tokio::test]
  async fn failed_time_tracking_is_502_and_keeps_the_assignment() {
    let store = Arc::new(OfflineTimeTracking(seeded().await));
    let (status, body) = post(store.clone(), json!({
      "mitarbeiterId": ANNA,
      "projektId": RATHAUS,
      "von": "2024-06-01T08:00:00Z",
      "bis": "2024-06-01T16:00:00Z",
      "bestaetigt": true,
    }))
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(
      body["error"]
        .as_str()
        .unwrap()
        .contains("time tracking offline")
    );
    assert_eq!(body["assignment"]["projectName"], "Rathaus");
    assert_eq!(body["assignment"]["confirmed"], true);

    let (_, board) =
      get(store, "/plantafel/assignments?from=2024-06-01&to=2024-06-01").await;
    assert_eq!(board["meta"]["totalAssignments"], 1);
    assert_eq!(board["events"][0]["sourceId"], body["assignment"]["id"]);
  }

  #[tokio::test]
  async fn unconfirmed_create_skips_time_tracking() {
    let store = Arc::new(OfflineTimeTracking(seeded().await));
    let (status, body) = post(store, json!({
      "projektId": RATHAUS,
      "von": "2024-06-01",
      "bis": "2024-06-01",
    }))
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["timeTrackingSync"], json!({ "created": 0, "deleted": 0 }));
  }

  #[tokio::test]
  async fn excessive_window_hours_are_400() {
    let store = make_store().await;
    let (status, body) = post(store.clone(), json!({
      "mitarbeiterId": ANNA,
      "projektId": RATHAUS,
      "von": "2024-06-01T08:00:00Z",
      "bis": "2024-06-01T16:00:00Z",
      "bestaetigt": true,
      "aufbauVon": "2024-06-01",
      "stundenAufbau": 1e12,
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("stundenAufbau"));

    let (_, board) =
      get(store, "/plantafel/assignments?from=2024-06-01&to=2024-06-01").await;
    assert_eq!(board["meta"]["totalAssignments"], 0);
  }

  #[tokio::test]
  async fn create_rejects_inverted_window() {
    let store = make_store().await;
    let (status, body) = post(store.clone(), json!({
      "projektId": RATHAUS,
      "von": "2024-06-02T08:00:00Z",
      "bis": "2024-06-01T08:00:00Z",
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("start"));

    let (status, _) = post(store, json!({
      "projektId": RATHAUS,
      "von": "2024-06-01T08:00:00Z",
      "bis": "2024-06-01T08:00:00Z",
    }))
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  #[tokio::test]
  async fn create_with_missing_project_is_400() {
    let store = make_store().await;
    let (status, body) = post(store, json!({
      "von": "2024-06-01",
      "bis": "2024-06-01",
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "projektId is required");
  }

  #[tokio::test]
  async fn create_with_unknown_references_is_404_and_persists_nothing() {
    let store = make_store().await;
    let (status, body) = post(store.clone(), json!({
      "projektId": Uuid::from_u128(999),
      "von": "2024-06-01",
      "bis": "2024-06-01",
    }))
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = post(store.clone(), json!({
      "mitarbeiterId": Uuid::from_u128(998),
      "projektId": RATHAUS,
      "von": "2024-06-01",
      "bis": "2024-06-01",
    }))
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, board) =
      get(store, "/plantafel/assignments?from=2024-06-01&to=2024-06-01").await;
    assert_eq!(board["meta"]["totalAssignments"], 0);
  }

  #[tokio::test]
  async fn malformed_json_body_is_400() {
    let store = make_store().await;
    let resp = api_router(store)
      .oneshot(
        Request::builder()
          .method("POST")
          .uri("/plantafel/assignments")
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from("{not json"))
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── GET board ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn board_reports_double_booking() {
    let store = make_store().await;
    for (von, bis) in [
      ("2024-06-01T08:00:00Z", "2024-06-01T16:00:00Z"),
      ("2024-06-01T14:00:00Z", "2024-06-01T18:00:00Z"),
    ] {
      let (status, _) = post(store.clone(), json!({
        "mitarbeiterId": ANNA,
        "projektId": RATHAUS,
        "von": von,
        "bis": bis,
        "bestaetigt": true,
      }))
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = get(
      store,
      "/plantafel/assignments?from=2024-06-01&to=2024-06-01&view=team",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let conflicts = body["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["type"], "double_booking");
    assert_eq!(conflicts[0]["severity"], "error");
    assert_eq!(body["meta"]["totalConflicts"], 1);
    assert_eq!(body["meta"]["totalEvents"], 2);
    assert!(
      body["events"]
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["hasConflict"] == true)
    );
    let resources = body["resources"].as_array().unwrap();
    assert_eq!(resources.last().unwrap()["id"], "unassigned");
  }

  #[tokio::test]
  async fn board_reports_work_during_absence() {
    let store = make_store().await;
    store
      .insert_absence_row(AbsenceRow {
        id: Uuid::from_u128(500).to_string(),
        employee_id: Some(ANNA.to_string()),
        employee_name: Some("Anna Berg".into()),
        start: Some("2024-07-01".into()),
        end: Some("2024-07-05".into()),
        kind: Some("vacation".into()),
        status: Some("approved".into()),
        reason: None,
      })
      .await
      .unwrap();
    post(store.clone(), json!({
      "mitarbeiterId": ANNA,
      "projektId": RATHAUS,
      "von": "2024-07-03T08:00:00Z",
      "bis": "2024-07-03T16:00:00Z",
    }))
    .await;

    let (_, body) = get(
      store.clone(),
      "/plantafel/assignments?from=2024-07-03T00:00:00Z&to=2024-07-03T23:59:59Z",
    )
    .await;
    let conflicts = body["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["type"], "work_during_absence");
    assert_eq!(conflicts[0]["severity"], "warning");
    assert_eq!(body["meta"]["totalAbsences"], 1);

    let (_, hidden) = get(
      store,
      "/plantafel/assignments?from=2024-07-03&to=2024-07-03&showAbsences=false",
    )
    .await;
    assert_eq!(hidden["conflicts"].as_array().unwrap().len(), 0);
  }

  #[tokio::test]
  async fn project_view_groups_employees() {
    let store = make_store().await;
    for employee in [ANNA, BEN] {
      post(store.clone(), json!({
        "mitarbeiterId": employee,
        "projektId": RATHAUS,
        "von": "2024-06-01T08:00:00Z",
        "bis": "2024-06-01T16:00:00Z",
      }))
      .await;
    }

    let (status, body) = get(
      store,
      "/plantafel/assignments?from=2024-06-01&to=2024-06-01&view=project",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["employeeIds"].as_array().unwrap().len(), 2);
    assert_eq!(events[0]["title"], "Rathaus · 2 employees");
    assert_eq!(body["resources"][0]["type"], "project");
    assert_eq!(body["meta"]["totalAssignments"], 2);
  }

  #[tokio::test]
  async fn board_query_validation() {
    let store = make_store().await;
    for uri in [
      "/plantafel/assignments?to=2024-06-01",
      "/plantafel/assignments?from=yesterday&to=2024-06-01",
      "/plantafel/assignments?from=2024-06-01&to=2024-06-01&view=gantt",
      "/plantafel/assignments?from=2024-06-01&to=2024-06-01&employeeIds=abc",
    ] {
      let (status, body) = get(store.clone(), uri).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
      assert_eq!(body["success"], false, "{uri}");
    }
  }

  // ── GET conflicts ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn conflict_overview_counts_by_severity() {
    let store = make_store().await;
    for (employee, von, bis, confirmed) in [
      (ANNA, "2024-06-01T08:00:00Z", "2024-06-01T16:00:00Z", true),
      (ANNA, "2024-06-01T10:00:00Z", "2024-06-01T12:00:00Z", true),
      (BEN, "2024-06-01T08:00:00Z", "2024-06-01T16:00:00Z", false),
      (BEN, "2024-06-01T15:00:00Z", "2024-06-01T17:00:00Z", true),
    ] {
      post(store.clone(), json!({
        "mitarbeiterId": employee,
        "projektId": RATHAUS,
        "von": von,
        "bis": bis,
        "bestaetigt": confirmed,
      }))
      .await;
    }

    let (status, body) =
      get(store.clone(), "/plantafel/conflicts?from=2024-06-01&to=2024-06-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["totalConflicts"], 2);
    assert_eq!(body["meta"]["errorCount"], 1);
    assert_eq!(body["meta"]["warningCount"], 1);
    assert_eq!(body["conflicts"][0]["severity"], "error");

    let (_, only_ben) = get(
      store.clone(),
      &format!("/plantafel/conflicts?from=2024-06-01&to=2024-06-01&employeeId={BEN}"),
    )
    .await;
    assert_eq!(only_ben["meta"]["totalConflicts"], 1);
    assert_eq!(only_ben["conflicts"][0]["employeeId"], BEN.to_string());

    let (status, _) = get(
      store,
      "/plantafel/conflicts?from=2024-06-01&to=2024-06-01&employeeId=nope",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}
