//! Student — an enrolled person attendance is recorded against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored student record. `class_label` serialises as `"class"`, matching
/// the course field of the same name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
  pub id:            Uuid,
  pub full_name:     String,
  pub department_id: Uuid,
  #[serde(rename = "class")]
  pub class_label:   String,
  pub submitted_by:  String,
  pub updated_at:    DateTime<Utc>,
}

/// Input to student create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
  pub full_name:     String,
  pub department_id: Uuid,
  #[serde(rename = "class")]
  pub class_label:   String,
}
