//! Handler for `GET /plantafel/conflicts`.
//!
//! Lists every conflict in a window across all employees (or one), without
//! the board's row scoping.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use plantafel_core::{
  board::{ConflictSummary, load_conflicts, parse_window},
  store::PlanningStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictParams {
  pub from:        Option<String>,
  pub to:          Option<String>,
  pub employee_id: Option<String>,
}

/// `GET /plantafel/conflicts?from=...&to=...[&employeeId=...]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ConflictParams>,
) -> Result<Json<ConflictSummary>, ApiError>
where
  S: PlanningStore,
{
  let (from, to) = parse_window(params.from.as_deref(), params.to.as_deref())?;
  let employee = params
    .employee_id
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| {
      Uuid::parse_str(s)
        .map_err(|_| ApiError::BadRequest(format!("invalid employeeId: {s:?}")))
    })
    .transpose()?;

  let summary = load_conflicts(store.as_ref(), from, to, employee).await?;
  Ok(Json(summary))
}
