//! Error type for `tally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] tally_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("column decode error: {0}")]
  Decode(String),
}

/// Collapse into the core taxonomy for the API layer; everything that is not
/// already a core error becomes an opaque backend failure.
impl From<Error> for tally_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(e) => e,
      other => tally_core::Error::Backend(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
