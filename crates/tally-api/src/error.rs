//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(String),
}

impl ApiError {
  /// Map a backend error through the core taxonomy.
  pub fn from_store<E: Into<tally_core::Error>>(err: E) -> Self {
    Self::from(err.into())
  }
}

impl From<tally_core::Error> for ApiError {
  fn from(err: tally_core::Error) -> Self {
    use tally_core::Error as E;
    match &err {
      E::DepartmentNotFound(_)
      | E::CourseNotFound(_)
      | E::StudentNotFound(_)
      | E::UserNotFound(_)
      | E::AttendanceNotFound(_) => Self::NotFound(err.to_string()),

      E::UsernameTaken(_) | E::EmailTaken(_) | E::AlreadyMarked { .. } => {
        Self::Conflict(err.to_string())
      }

      E::SemesterOutOfRange(_) | E::InvalidEmail(_) => {
        Self::BadRequest(err.to_string())
      }

      E::Serialization(_) | E::Backend(_) => Self::Store(err.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      // Conflicts have always been reported as 400 on this API, never 409.
      ApiError::Conflict(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
