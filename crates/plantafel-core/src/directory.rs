//! Employees and projects, the catalogs the planning board draws its rows
//! from. Both are owned by CRUD surfaces outside this workspace; the engine
//! only reads them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Employee ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  pub id:         Uuid,
  pub first_name: String,
  pub last_name:  String,
  /// Inactive employees never appear as board rows.
  pub active:     bool,
}

impl Employee {
  pub fn display_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
      .trim()
      .to_owned()
  }
}

// ─── Project ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
  InPlanning,
  Active,
  Completed,
  Cancelled,
}

impl ProjectStatus {
  /// Whether projects in this status get a lane on the board.
  pub fn is_plannable(self) -> bool {
    matches!(self, Self::InPlanning | Self::Active)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::InPlanning => "in_planning",
      Self::Active => "active",
      Self::Completed => "completed",
      Self::Cancelled => "cancelled",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "in_planning" => Some(Self::InPlanning),
      "active" => Some(Self::Active),
      "completed" => Some(Self::Completed),
      "cancelled" => Some(Self::Cancelled),
      _ => None,
    }
  }
}

/// Construction-site address of a project, shown on the board's event bars.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAddress {
  pub street:      Option<String>,
  pub postal_code: Option<String>,
  pub city:        Option<String>,
}

impl SiteAddress {
  pub fn is_empty(&self) -> bool {
    self.street.is_none() && self.postal_code.is_none() && self.city.is_none()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub id:            Uuid,
  pub number:        Option<String>,
  pub name:          String,
  pub customer_name: Option<String>,
  pub status:        ProjectStatus,
  pub address:       Option<SiteAddress>,
}
