//! Error type for `plantafel-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A catalog column held a value outside its enumeration.
  #[error("unknown {field}: {value:?}")]
  UnknownValue { field: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
