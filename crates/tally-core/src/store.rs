//! The `RosterStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! Higher layers (`tally-api`, `tally-server`) depend on this abstraction,
//! not on any concrete backend.
//!
//! Contract notes shared by every entity:
//!
//! - Writes stamp `submitted_by` from the supplied [`Actor`] and set
//!   `updated_at` to the current UTC time.
//! - Every write re-reads the stored row before returning it, so callers
//!   always see the persisted state.
//! - Foreign references (`department_id`, `student_id`, `course_id`) are
//!   validated at write time only. Deletes are hard, never cascade, and do
//!   not protect existing references — dangling ids are permitted.
//! - Updates decide not-found by the mutation's matched-row count, not a
//!   prior existence read.

use std::future::Future;

use uuid::Uuid;

use crate::{
  actor::Actor,
  attendance::{AttendanceRecord, AttendanceStats, NewAttendance},
  course::{Course, NewCourse},
  department::{Department, NewDepartment},
  student::{NewStudent, Student},
  user::{NewUser, User},
};

/// Abstraction over a tally storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Departments ───────────────────────────────────────────────────────

  fn add_department(
    &self,
    new: NewDepartment,
    actor: &Actor,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  /// Retrieve a department by id. Returns `None` if not found.
  fn get_department(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  /// List all departments in store order; no sort is guaranteed.
  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  /// Replace all mutable fields and bump `updated_at`. `submitted_by` keeps
  /// the value stamped at creation; updates never re-attribute a record.
  fn update_department(
    &self,
    id: Uuid,
    new: NewDepartment,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  fn delete_department(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Courses ───────────────────────────────────────────────────────────

  /// Create a course. `department_id` must resolve to an existing
  /// department; fields are validated, never clamped.
  fn add_course(
    &self,
    new: NewCourse,
    actor: &Actor,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  fn get_course(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  fn list_courses(
    &self,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  /// Replace all mutable fields. Re-validates `department_id` exactly as
  /// create does.
  fn update_course(
    &self,
    id: Uuid,
    new: NewCourse,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  fn delete_course(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Students ──────────────────────────────────────────────────────────

  fn add_student(
    &self,
    new: NewStudent,
    actor: &Actor,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  fn list_students(
    &self,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  fn update_student(
    &self,
    id: Uuid,
    new: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  fn delete_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user: username then email must be free (exact-match,
  /// case-sensitive), the password is digested before persisting, and the
  /// returned record carries no credential.
  fn register_user(
    &self,
    new: NewUser,
    actor: &Actor,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Replace all mutable fields. Username uniqueness is re-checked
  /// excluding the row being updated, so a no-op rename succeeds. The
  /// password is re-digested unconditionally.
  fn update_user(
    &self,
    id: Uuid,
    new: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Mark attendance: student and course must exist, and at most one mark
  /// per `(student, course, UTC day)` is accepted. `date` is stamped with
  /// the current wall-clock epoch seconds.
  fn mark_attendance(
    &self,
    new: NewAttendance,
    actor: &Actor,
  ) -> impl Future<Output = Result<AttendanceRecord, Self::Error>> + Send + '_;

  /// All records for a student, unsorted. The student must exist.
  fn attendance_for_student(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;

  /// All records for a course, unsorted. The course must exist.
  fn attendance_for_course(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;

  /// Aggregate statistics over a course's records. The course must exist.
  fn course_stats(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<AttendanceStats, Self::Error>> + Send + '_;

  /// Replace the mutable fields of a record. The submitted student and
  /// course ids are validated — a record may be re-pointed at a different
  /// student or course. `date` keeps its original value.
  fn update_attendance(
    &self,
    id: Uuid,
    new: NewAttendance,
  ) -> impl Future<Output = Result<AttendanceRecord, Self::Error>> + Send + '_;

  fn delete_attendance(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
