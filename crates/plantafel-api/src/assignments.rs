//! Handlers for `/plantafel/assignments`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/plantafel/assignments` | `?from&to` required; optional `view`, `employeeIds`, `projectIds`, `showAbsences` |
//! | `POST` | `/plantafel/assignments` | Body: [`AssignmentBody`]; returns 201 + assignment and sync counts |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use plantafel_core::{
  assignment::Assignment,
  board::{Board, BoardQuery, load_board, parse_ids, parse_window},
  event::View,
  store::{PlanningStore, TimeTrackingSync},
  timesheet::SyncCounts,
  writer::{AssignmentDraft, create_assignment},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Board ───────────────────────────────────────────────────────────────────

/// Query parameters are taken as raw text so every malformed value produces
/// the uniform error body rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardParams {
  pub from:           Option<String>,
  pub to:             Option<String>,
  /// `team` (default) or `project`.
  pub view:           Option<String>,
  /// Comma-separated employee ids.
  pub employee_ids:   Option<String>,
  /// Comma-separated project ids.
  pub project_ids:    Option<String>,
  /// Absences are shown unless this is exactly `false`.
  pub show_absences:  Option<String>,
}

impl BoardParams {
  fn into_query(self) -> plantafel_core::Result<BoardQuery> {
    let (from, to) = parse_window(self.from.as_deref(), self.to.as_deref())?;
    let view = match self.view.as_deref().map(str::trim) {
      None | Some("") => View::default(),
      Some(v) => View::parse(v)?,
    };
    Ok(BoardQuery {
      from,
      to,
      view,
      employee_ids: parse_ids("employeeIds", self.employee_ids.as_deref())?,
      project_ids: parse_ids("projectIds", self.project_ids.as_deref())?,
      show_absences: self.show_absences.as_deref() != Some("false"),
    })
  }
}

/// `GET /plantafel/assignments?from=...&to=...[&view=...][&employeeIds=...][&projectIds=...][&showAbsences=false]`
pub async fn board<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<BoardParams>,
) -> Result<Json<Board>, ApiError>
where
  S: PlanningStore,
{
  let query = params.into_query()?;
  let board = load_board(store.as_ref(), &query).await?;
  Ok(Json(board))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /plantafel/assignments`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentBody {
  pub mitarbeiter_id:  Option<String>,
  pub projekt_id:      Option<String>,
  pub von:             Option<String>,
  pub bis:             Option<String>,
  pub rolle:           Option<String>,
  pub geplant_stunden: Option<f64>,
  pub notizen:         Option<String>,
  pub bestaetigt:      Option<bool>,
  pub aufbau_von:      Option<String>,
  pub aufbau_bis:      Option<String>,
  pub stunden_aufbau:  Option<f64>,
  pub abbau_von:       Option<String>,
  pub abbau_bis:       Option<String>,
  pub stunden_abbau:   Option<f64>,
}

impl From<AssignmentBody> for AssignmentDraft {
  fn from(b: AssignmentBody) -> Self {
    AssignmentDraft {
      employee_id:    b.mitarbeiter_id,
      project_id:     b.projekt_id,
      start:          b.von,
      end:            b.bis,
      role:           b.rolle,
      planned_hours:  b.geplant_stunden,
      notes:          b.notizen,
      confirmed:      b.bestaetigt,
      setup_start:    b.aufbau_von,
      setup_end:      b.aufbau_bis,
      setup_hours:    b.stunden_aufbau,
      teardown_start: b.abbau_von,
      teardown_end:   b.abbau_bis,
      teardown_hours: b.stunden_abbau,
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBody {
  pub assignment:         Assignment,
  pub time_tracking_sync: SyncCounts,
}

/// `POST /plantafel/assignments`: returns 201 + [`CreatedBody`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<AssignmentBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlanningStore + TimeTrackingSync,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let created =
    create_assignment(store.as_ref(), store.as_ref(), body.into()).await?;
  Ok((
    StatusCode::CREATED,
    Json(CreatedBody {
      assignment:         created.assignment,
      time_tracking_sync: created.sync,
    }),
  ))
}
