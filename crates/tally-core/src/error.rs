//! Error types for `tally-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Department not found")]
  DepartmentNotFound(Uuid),

  #[error("Course not found")]
  CourseNotFound(Uuid),

  #[error("Student not found")]
  StudentNotFound(Uuid),

  #[error("User not found")]
  UserNotFound(Uuid),

  #[error("Attendance record not found")]
  AttendanceNotFound(Uuid),

  #[error("Username already exists")]
  UsernameTaken(String),

  #[error("Email already registered")]
  EmailTaken(String),

  #[error("Attendance already marked for this student today")]
  AlreadyMarked { student_id: Uuid, course_id: Uuid },

  #[error("semester must be between 1 and 8, got {0}")]
  SemesterOutOfRange(u8),

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// A storage-backend failure unrelated to the request itself.
  #[error("storage backend error: {0}")]
  Backend(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
