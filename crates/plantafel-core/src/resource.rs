//! Resource resolver: which rows the board renders for a view.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  directory::{Employee, Project, ProjectStatus, SiteAddress},
  event::{UNASSIGNED_RESOURCE_ID, View},
};

pub const UNASSIGNED_RESOURCE_TITLE: &str = "Unassigned";

/// A board row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
  pub id:    String,
  pub title: String,
  #[serde(flatten)]
  pub meta:  ResourceMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResourceMeta {
  #[serde(rename_all = "camelCase")]
  Employee {
    first_name: String,
    last_name:  String,
    active:     bool,
  },
  #[serde(rename_all = "camelCase")]
  Project {
    number:        Option<String>,
    customer_name: Option<String>,
    status:        ProjectStatus,
    address:       Option<SiteAddress>,
  },
  /// The synthetic lane for assignments without an employee.
  Unassigned,
}

impl Resource {
  pub fn unassigned() -> Self {
    Self {
      id:    UNASSIGNED_RESOURCE_ID.to_owned(),
      title: UNASSIGNED_RESOURCE_TITLE.to_owned(),
      meta:  ResourceMeta::Unassigned,
    }
  }
}

impl From<&Employee> for Resource {
  fn from(e: &Employee) -> Self {
    Self {
      id:    e.id.to_string(),
      title: e.display_name(),
      meta:  ResourceMeta::Employee {
        first_name: e.first_name.clone(),
        last_name:  e.last_name.clone(),
        active:     e.active,
      },
    }
  }
}

impl From<&Project> for Resource {
  fn from(p: &Project) -> Self {
    Self {
      id:    p.id.to_string(),
      title: p.name.clone(),
      meta:  ResourceMeta::Project {
        number:        p.number.clone(),
        customer_name: p.customer_name.clone(),
        status:        p.status,
        address:       p.address.clone().filter(|a| !a.is_empty()),
      },
    }
  }
}

/// Resolve the ordered rows for `view`.
///
/// An empty `allow` list means "no restriction". In team view the
/// unassigned lane is appended last, but only when unrestricted.
pub fn resolve_resources(
  view: View,
  allow: &[Uuid],
  employees: &[Employee],
  projects: &[Project],
) -> Vec<Resource> {
  let allow: HashSet<Uuid> = allow.iter().copied().collect();
  let permitted = |id: &Uuid| allow.is_empty() || allow.contains(id);

  let mut resources: Vec<Resource> = match view {
    View::Team => employees
      .iter()
      .filter(|e| e.active && permitted(&e.id))
      .map(Resource::from)
      .collect(),
    View::Project => projects
      .iter()
      .filter(|p| p.status.is_plannable() && permitted(&p.id))
      .map(Resource::from)
      .collect(),
  };
  resources.sort_by(|a, b| {
    a.title
      .to_lowercase()
      .cmp(&b.title.to_lowercase())
      .then_with(|| a.id.cmp(&b.id))
  });

  if view == View::Team && allow.is_empty() {
    resources.push(Resource::unassigned());
  }
  resources
}
