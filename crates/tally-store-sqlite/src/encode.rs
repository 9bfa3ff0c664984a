//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, attendance `date`/`day` as
//! integers, and UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use tally_core::{
  attendance::AttendanceRecord,
  course::Course,
  department::Department,
  student::Student,
  user::{User, UserRole},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── UserRole ─────────────────────────────────────────────────────────────────

pub fn encode_role(role: UserRole) -> &'static str {
  match role {
    UserRole::Admin => "admin",
    UserRole::Faculty => "faculty",
    UserRole::Student => "student",
  }
}

pub fn decode_role(s: &str) -> Result<UserRole> {
  match s {
    "admin" => Ok(UserRole::Admin),
    "faculty" => Ok(UserRole::Faculty),
    "student" => Ok(UserRole::Student),
    other => Err(Error::Decode(format!("unknown user role: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `departments` row.
pub struct RawDepartment {
  pub department_id:   String,
  pub department_name: String,
  pub submitted_by:    String,
  pub updated_at:      String,
}

impl RawDepartment {
  pub fn into_department(self) -> Result<Department> {
    Ok(Department {
      id:              decode_uuid(&self.department_id)?,
      department_name: self.department_name,
      submitted_by:    self.submitted_by,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `courses` row.
pub struct RawCourse {
  pub course_id:     String,
  pub course_name:   String,
  pub department_id: String,
  pub semester:      i64,
  pub class_label:   String,
  pub lecture_hours: i64,
  pub submitted_by:  String,
  pub updated_at:    String,
}

impl RawCourse {
  pub fn into_course(self) -> Result<Course> {
    Ok(Course {
      id:            decode_uuid(&self.course_id)?,
      course_name:   self.course_name,
      department_id: decode_uuid(&self.department_id)?,
      semester:      u8::try_from(self.semester)
        .map_err(|_| Error::Decode(format!("semester out of range: {}", self.semester)))?,
      class_label:   self.class_label,
      lecture_hours: u32::try_from(self.lecture_hours).map_err(|_| {
        Error::Decode(format!("lecture_hours out of range: {}", self.lecture_hours))
      })?,
      submitted_by:  self.submitted_by,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `students` row.
pub struct RawStudent {
  pub student_id:    String,
  pub full_name:     String,
  pub department_id: String,
  pub class_label:   String,
  pub submitted_by:  String,
  pub updated_at:    String,
}

impl RawStudent {
  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      id:            decode_uuid(&self.student_id)?,
      full_name:     self.full_name,
      department_id: decode_uuid(&self.department_id)?,
      class_label:   self.class_label,
      submitted_by:  self.submitted_by,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `users` row. The `password_digest`
/// column is never selected into this type.
pub struct RawUser {
  pub user_id:      String,
  pub full_name:    String,
  pub username:     String,
  pub email:        String,
  pub role:         String,
  pub submitted_by: String,
  pub updated_at:   String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:           decode_uuid(&self.user_id)?,
      full_name:    self.full_name,
      username:     self.username,
      email:        self.email,
      role:         decode_role(&self.role)?,
      submitted_by: self.submitted_by,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from an `attendance_log` row.
pub struct RawAttendance {
  pub attendance_id: String,
  pub student_id:    String,
  pub course_id:     String,
  pub present:       bool,
  pub date:          i64,
  pub submitted_by:  String,
  pub updated_at:    String,
}

impl RawAttendance {
  pub fn into_record(self) -> Result<AttendanceRecord> {
    Ok(AttendanceRecord {
      id:           decode_uuid(&self.attendance_id)?,
      student_id:   decode_uuid(&self.student_id)?,
      course_id:    decode_uuid(&self.course_id)?,
      present:      self.present,
      date:         self.date,
      submitted_by: self.submitted_by,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}
