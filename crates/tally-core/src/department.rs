//! Department — the root entity everything else hangs off.
//!
//! Departments have no parent. Courses and students reference them by id;
//! those references are checked at write time only, so deleting a department
//! leaves any referencing records dangling (there is no cascade).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored department record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
  pub id:              Uuid,
  pub department_name: String,
  pub submitted_by:    String,
  pub updated_at:      DateTime<Utc>,
}

/// Input to [`crate::store::RosterStore::add_department`] and
/// [`crate::store::RosterStore::update_department`]. The id, submitter, and
/// timestamp are always set by the store; they are not accepted from callers.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
  pub department_name: String,
}
