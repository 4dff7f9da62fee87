//! Error types for `plantafel-core`.

use thiserror::Error;

use crate::assignment::Assignment;

/// Boxed collaborator error (store or synchronizer backend).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("invalid date in {field}: {value:?}")]
  InvalidDate { field: &'static str, value: String },

  #[error("invalid id in {field}: {value:?}")]
  InvalidId { field: &'static str, value: String },

  #[error("{field} exceeds 24 hours per day: {value}")]
  HoursOutOfRange { field: &'static str, value: f64 },

  #[error("start must not be after end")]
  StartAfterEnd,

  #[error("invalid view: {0:?}")]
  InvalidView(String),

  #[error("employee not found: {0}")]
  EmployeeNotFound(String),

  #[error("project not found: {0}")]
  ProjectNotFound(String),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  /// The assignment was committed but the time-tracking handoff failed.
  #[error("assignment {} saved, time-tracking sync failed: {source}", .assignment.id)]
  SyncFailed {
    assignment: Box<Assignment>,
    #[source]
    source:     BoxError,
  },
}

impl Error {
  /// Wrap any backend error as [`Error::Store`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// Malformed or inconsistent caller input.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::MissingField(_)
        | Self::InvalidDate { .. }
        | Self::InvalidId { .. }
        | Self::HoursOutOfRange { .. }
        | Self::StartAfterEnd
        | Self::InvalidView(_)
    )
  }

  /// A referenced employee or project does not exist.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::EmployeeNotFound(_) | Self::ProjectNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
