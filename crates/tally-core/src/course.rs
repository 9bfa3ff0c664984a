//! Course — a taught unit belonging to a department.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A stored course record.
///
/// `class_label` keeps its historical wire name `"class"` in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
  pub id:            Uuid,
  pub course_name:   String,
  pub department_id: Uuid,
  /// Semester the course is taught in, 1 through 8.
  pub semester:      u8,
  #[serde(rename = "class")]
  pub class_label:   String,
  pub lecture_hours: u32,
  pub submitted_by:  String,
  pub updated_at:    DateTime<Utc>,
}

/// Input to course create and update. `lecture_hours` is unsigned, so a
/// negative value is rejected at deserialisation rather than clamped.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
  pub course_name:   String,
  pub department_id: Uuid,
  pub semester:      u8,
  #[serde(rename = "class")]
  pub class_label:   String,
  pub lecture_hours: u32,
}

impl NewCourse {
  /// Reject out-of-range fields. Values are never silently corrected.
  pub fn validate(&self) -> Result<()> {
    if !(1..=8).contains(&self.semester) {
      return Err(Error::SemesterOutOfRange(self.semester));
    }
    Ok(())
  }
}
