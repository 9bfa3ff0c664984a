//! [`SqliteStore`] — the SQLite implementation of [`RosterStore`].

use std::future::Future;
use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tally_core::{
  actor::Actor,
  attendance::{AttendanceRecord, AttendanceStats, NewAttendance, dedup_day},
  course::{Course, NewCourse},
  department::{Department, NewDepartment},
  digest::digest_password,
  store::RosterStore,
  student::{NewStudent, Student},
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawAttendance, RawCourse, RawDepartment, RawStudent, RawUser, encode_dt,
    encode_role, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A tally store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Existence probe shared by the referential-integrity checks. `sql` must
  /// select a single row by one id parameter.
  async fn row_exists(&self, sql: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![id_str], |_| Ok(true))
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn require_department(&self, id: Uuid) -> Result<()> {
    if self
      .row_exists("SELECT 1 FROM departments WHERE department_id = ?1", id)
      .await?
    {
      Ok(())
    } else {
      Err(Error::Core(tally_core::Error::DepartmentNotFound(id)))
    }
  }

  async fn require_student(&self, id: Uuid) -> Result<()> {
    if self
      .row_exists("SELECT 1 FROM students WHERE student_id = ?1", id)
      .await?
    {
      Ok(())
    } else {
      Err(Error::Core(tally_core::Error::StudentNotFound(id)))
    }
  }

  async fn require_course(&self, id: Uuid) -> Result<()> {
    if self
      .row_exists("SELECT 1 FROM courses WHERE course_id = ?1", id)
      .await?
    {
      Ok(())
    } else {
      Err(Error::Core(tally_core::Error::CourseNotFound(id)))
    }
  }
}

/// A row written a moment ago failed to read back; only a backend fault can
/// cause this.
fn missing_after_write(entity: &str) -> Error {
  Error::Core(tally_core::Error::Backend(format!(
    "{entity} row missing after write"
  )))
}

/// Did `err` originate from a UNIQUE constraint on an object whose name
/// contains `needle`? Used to translate index violations — the arbiter
/// between racing writers — into their domain conflicts.
fn is_unique_violation(err: &Error, needle: &str) -> bool {
  if let Error::Database(tokio_rusqlite::Error::Rusqlite(
    rusqlite::Error::SqliteFailure(code, Some(msg)),
  )) = err
  {
    code.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains(needle)
  } else {
    false
  }
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = Error;

  // ── Departments ───────────────────────────────────────────────────────────

  fn add_department(
    &self,
    new: NewDepartment,
    actor: &Actor,
  ) -> impl Future<Output = Result<Department>> + Send + '_ {
    let by = actor.name().to_owned();
    async move {
    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO departments (department_id, department_name, submitted_by, updated_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, new.department_name, by, at_str],
        )?;
        Ok(())
      })
      .await?;

    self
      .get_department(id)
      .await?
      .ok_or_else(|| missing_after_write("department"))
    }
  }

  async fn get_department(&self, id: Uuid) -> Result<Option<Department>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDepartment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT department_id, department_name, submitted_by, updated_at
               FROM departments WHERE department_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawDepartment {
                  department_id:   row.get(0)?,
                  department_name: row.get(1)?,
                  submitted_by:    row.get(2)?,
                  updated_at:      row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDepartment::into_department).transpose()
  }

  async fn list_departments(&self) -> Result<Vec<Department>> {
    let raws: Vec<RawDepartment> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT department_id, department_name, submitted_by, updated_at
           FROM departments",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawDepartment {
              department_id:   row.get(0)?,
              department_name: row.get(1)?,
              submitted_by:    row.get(2)?,
              updated_at:      row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDepartment::into_department).collect()
  }

  async fn update_department(
    &self,
    id: Uuid,
    new: NewDepartment,
  ) -> Result<Department> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE departments SET department_name = ?2, updated_at = ?3
           WHERE department_id = ?1",
          rusqlite::params![id_str, new.department_name, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::Core(tally_core::Error::DepartmentNotFound(id)));
    }

    self
      .get_department(id)
      .await?
      .ok_or_else(|| missing_after_write("department"))
  }

  async fn delete_department(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM departments WHERE department_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::Core(tally_core::Error::DepartmentNotFound(id)));
    }
    Ok(())
  }

  // ── Courses ───────────────────────────────────────────────────────────────

  fn add_course(
    &self,
    new: NewCourse,
    actor: &Actor,
  ) -> impl Future<Output = Result<Course>> + Send + '_ {
    let by = actor.name().to_owned();
    async move {
    new.validate().map_err(Error::Core)?;
    self.require_department(new.department_id).await?;

    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let dept_str = encode_uuid(new.department_id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO courses (
             course_id, course_name, department_id, semester, class_label,
             lecture_hours, submitted_by, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            new.course_name,
            dept_str,
            new.semester,
            new.class_label,
            new.lecture_hours,
            by,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self
      .get_course(id)
      .await?
      .ok_or_else(|| missing_after_write("course"))
    }
  }

  async fn get_course(&self, id: Uuid) -> Result<Option<Course>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCourse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT course_id, course_name, department_id, semester, class_label,
                      lecture_hours, submitted_by, updated_at
               FROM courses WHERE course_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawCourse {
                  course_id:     row.get(0)?,
                  course_name:   row.get(1)?,
                  department_id: row.get(2)?,
                  semester:      row.get(3)?,
                  class_label:   row.get(4)?,
                  lecture_hours: row.get(5)?,
                  submitted_by:  row.get(6)?,
                  updated_at:    row.get(7)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCourse::into_course).transpose()
  }

  async fn list_courses(&self) -> Result<Vec<Course>> {
    let raws: Vec<RawCourse> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT course_id, course_name, department_id, semester, class_label,
                  lecture_hours, submitted_by, updated_at
           FROM courses",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawCourse {
              course_id:     row.get(0)?,
              course_name:   row.get(1)?,
              department_id: row.get(2)?,
              semester:      row.get(3)?,
              class_label:   row.get(4)?,
              lecture_hours: row.get(5)?,
              submitted_by:  row.get(6)?,
              updated_at:    row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCourse::into_course).collect()
  }

  async fn update_course(&self, id: Uuid, new: NewCourse) -> Result<Course> {
    new.validate().map_err(Error::Core)?;
    self.require_department(new.department_id).await?;

    let id_str = encode_uuid(id);
    let dept_str = encode_uuid(new.department_id);
    let at_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE courses SET
             course_name = ?2, department_id = ?3, semester = ?4,
             class_label = ?5, lecture_hours = ?6, updated_at = ?7
           WHERE course_id = ?1",
          rusqlite::params![
            id_str,
            new.course_name,
            dept_str,
            new.semester,
            new.class_label,
            new.lecture_hours,
            at_str,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::Core(tally_core::Error::CourseNotFound(id)));
    }

    self
      .get_course(id)
      .await?
      .ok_or_else(|| missing_after_write("course"))
  }

  async fn delete_course(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM courses WHERE course_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::Core(tally_core::Error::CourseNotFound(id)));
    }
    Ok(())
  }

  // ── Students ──────────────────────────────────────────────────────────────

  fn add_student(
    &self,
    new: NewStudent,
    actor: &Actor,
  ) -> impl Future<Output = Result<Student>> + Send + '_ {
    let by = actor.name().to_owned();
    async move {
    self.require_department(new.department_id).await?;

    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let dept_str = encode_uuid(new.department_id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO students (
             student_id, full_name, department_id, class_label, submitted_by, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            new.full_name,
            dept_str,
            new.class_label,
            by,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self
      .get_student(id)
      .await?
      .ok_or_else(|| missing_after_write("student"))
    }
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT student_id, full_name, department_id, class_label,
                      submitted_by, updated_at
               FROM students WHERE student_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawStudent {
                  student_id:    row.get(0)?,
                  full_name:     row.get(1)?,
                  department_id: row.get(2)?,
                  class_label:   row.get(3)?,
                  submitted_by:  row.get(4)?,
                  updated_at:    row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn list_students(&self) -> Result<Vec<Student>> {
    let raws: Vec<RawStudent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT student_id, full_name, department_id, class_label,
                  submitted_by, updated_at
           FROM students",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawStudent {
              student_id:    row.get(0)?,
              full_name:     row.get(1)?,
              department_id: row.get(2)?,
              class_label:   row.get(3)?,
              submitted_by:  row.get(4)?,
              updated_at:    row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStudent::into_student).collect()
  }

  async fn update_student(&self, id: Uuid, new: NewStudent) -> Result<Student> {
    self.require_department(new.department_id).await?;

    let id_str = encode_uuid(id);
    let dept_str = encode_uuid(new.department_id);
    let at_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE students SET
             full_name = ?2, department_id = ?3, class_label = ?4, updated_at = ?5
           WHERE student_id = ?1",
          rusqlite::params![id_str, new.full_name, dept_str, new.class_label, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::Core(tally_core::Error::StudentNotFound(id)));
    }

    self
      .get_student(id)
      .await?
      .ok_or_else(|| missing_after_write("student"))
  }

  async fn delete_student(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM students WHERE student_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::Core(tally_core::Error::StudentNotFound(id)));
    }
    Ok(())
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  fn register_user(
    &self,
    new: NewUser,
    actor: &Actor,
  ) -> impl Future<Output = Result<User>> + Send + '_ {
    let by = actor.name().to_owned();
    async move {
    new.validate().map_err(Error::Core)?;

    // Username first, then email — callers rely on this order.
    let username = new.username.clone();
    let username_taken: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM users WHERE username = ?1",
              rusqlite::params![username],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    if username_taken {
      return Err(Error::Core(tally_core::Error::UsernameTaken(new.username)));
    }

    let email = new.email.clone();
    let email_taken: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM users WHERE email = ?1",
              rusqlite::params![email],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    if email_taken {
      return Err(Error::Core(tally_core::Error::EmailTaken(new.email)));
    }

    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let digest = digest_password(&new.password);
    let role_str = encode_role(new.role).to_owned();
    let at_str = encode_dt(Utc::now());

    let username = new.username.clone();
    let email = new.email.clone();
    let full_name = new.full_name.clone();
    let insert = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, full_name, username, email, password_digest, role,
             submitted_by, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![id_str, full_name, username, email, digest, role_str, by, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from);

    // The unique indexes arbitrate when two registrations race past the
    // checks above.
    if let Err(err) = insert {
      if is_unique_violation(&err, "users.username") {
        return Err(Error::Core(tally_core::Error::UsernameTaken(new.username)));
      }
      if is_unique_violation(&err, "users.email") {
        return Err(Error::Core(tally_core::Error::EmailTaken(new.email)));
      }
      return Err(err);
    }

    self
      .get_user(id)
      .await?
      .ok_or_else(|| missing_after_write("user"))
    }
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, full_name, username, email, role, submitted_by, updated_at
               FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:      row.get(0)?,
                  full_name:    row.get(1)?,
                  username:     row.get(2)?,
                  email:        row.get(3)?,
                  role:         row.get(4)?,
                  submitted_by: row.get(5)?,
                  updated_at:   row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, full_name, username, email, role, submitted_by, updated_at
           FROM users",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawUser {
              user_id:      row.get(0)?,
              full_name:    row.get(1)?,
              username:     row.get(2)?,
              email:        row.get(3)?,
              role:         row.get(4)?,
              submitted_by: row.get(5)?,
              updated_at:   row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn update_user(&self, id: Uuid, new: NewUser) -> Result<User> {
    new.validate().map_err(Error::Core)?;

    // Exclude the row being updated so a no-op rename succeeds.
    let id_str = encode_uuid(id);
    let username = new.username.clone();
    let username_taken: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM users WHERE username = ?1 AND user_id != ?2",
              rusqlite::params![username, id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    if username_taken {
      return Err(Error::Core(tally_core::Error::UsernameTaken(new.username)));
    }

    let id_str = encode_uuid(id);
    let digest = digest_password(&new.password);
    let role_str = encode_role(new.role).to_owned();
    let at_str = encode_dt(Utc::now());
    let username = new.username.clone();
    let email = new.email.clone();
    let full_name = new.full_name.clone();

    let update = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET
             full_name = ?2, username = ?3, email = ?4, password_digest = ?5,
             role = ?6, updated_at = ?7
           WHERE user_id = ?1",
          rusqlite::params![id_str, full_name, username, email, digest, role_str, at_str],
        )?)
      })
      .await
      .map_err(Error::from);

    let changed: usize = match update {
      Ok(n) => n,
      Err(err) if is_unique_violation(&err, "users.username") => {
        return Err(Error::Core(tally_core::Error::UsernameTaken(new.username)));
      }
      Err(err) if is_unique_violation(&err, "users.email") => {
        return Err(Error::Core(tally_core::Error::EmailTaken(new.email)));
      }
      Err(err) => return Err(err),
    };

    if changed == 0 {
      return Err(Error::Core(tally_core::Error::UserNotFound(id)));
    }

    self
      .get_user(id)
      .await?
      .ok_or_else(|| missing_after_write("user"))
  }

  async fn delete_user(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::Core(tally_core::Error::UserNotFound(id)));
    }
    Ok(())
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  fn mark_attendance(
    &self,
    new: NewAttendance,
    actor: &Actor,
  ) -> impl Future<Output = Result<AttendanceRecord>> + Send + '_ {
    let by = actor.name().to_owned();
    async move {
    self.require_student(new.student_id).await?;
    self.require_course(new.course_id).await?;

    let now = Utc::now();
    let date = now.timestamp();
    let day = dedup_day(date);

    let student_str = encode_uuid(new.student_id);
    let course_str = encode_uuid(new.course_id);
    let already: bool = {
      let (student_str, course_str) = (student_str.clone(), course_str.clone());
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT 1 FROM attendance_log
                 WHERE student_id = ?1 AND course_id = ?2 AND day = ?3",
                rusqlite::params![student_str, course_str, day],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false),
          )
        })
        .await?
    };
    if already {
      return Err(Error::Core(tally_core::Error::AlreadyMarked {
        student_id: new.student_id,
        course_id:  new.course_id,
      }));
    }

    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now);

    let insert = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO attendance_log (
             attendance_id, student_id, course_id, present, date, day,
             submitted_by, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            student_str,
            course_str,
            new.present,
            date,
            day,
            by,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from);

    // The unique index decides the winner when two marks race past the check
    // above; the loser gets the same conflict as a sequential duplicate.
    if let Err(err) = insert {
      if is_unique_violation(&err, "attendance_log") {
        return Err(Error::Core(tally_core::Error::AlreadyMarked {
          student_id: new.student_id,
          course_id:  new.course_id,
        }));
      }
      return Err(err);
    }

    self
      .get_attendance(id)
      .await?
      .ok_or_else(|| missing_after_write("attendance"))
    }
  }

  async fn attendance_for_student(
    &self,
    student_id: Uuid,
  ) -> Result<Vec<AttendanceRecord>> {
    self.require_student(student_id).await?;

    let id_str = encode_uuid(student_id);
    let raws: Vec<RawAttendance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT attendance_id, student_id, course_id, present, date,
                  submitted_by, updated_at
           FROM attendance_log WHERE student_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAttendance {
              attendance_id: row.get(0)?,
              student_id:    row.get(1)?,
              course_id:     row.get(2)?,
              present:       row.get(3)?,
              date:          row.get(4)?,
              submitted_by:  row.get(5)?,
              updated_at:    row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAttendance::into_record).collect()
  }

  async fn attendance_for_course(
    &self,
    course_id: Uuid,
  ) -> Result<Vec<AttendanceRecord>> {
    self.require_course(course_id).await?;

    let id_str = encode_uuid(course_id);
    let raws: Vec<RawAttendance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT attendance_id, student_id, course_id, present, date,
                  submitted_by, updated_at
           FROM attendance_log WHERE course_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAttendance {
              attendance_id: row.get(0)?,
              student_id:    row.get(1)?,
              course_id:     row.get(2)?,
              present:       row.get(3)?,
              date:          row.get(4)?,
              submitted_by:  row.get(5)?,
              updated_at:    row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAttendance::into_record).collect()
  }

  async fn course_stats(&self, course_id: Uuid) -> Result<AttendanceStats> {
    let records = self.attendance_for_course(course_id).await?;
    Ok(AttendanceStats::from_records(course_id, &records))
  }

  async fn update_attendance(
    &self,
    id: Uuid,
    new: NewAttendance,
  ) -> Result<AttendanceRecord> {
    // Validate the submitted ids — a record may be re-pointed at a different
    // student or course.
    self.require_student(new.student_id).await?;
    self.require_course(new.course_id).await?;

    let id_str = encode_uuid(id);
    let student_str = encode_uuid(new.student_id);
    let course_str = encode_uuid(new.course_id);
    let at_str = encode_dt(Utc::now());

    let update = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE attendance_log SET
             student_id = ?2, course_id = ?3, present = ?4, updated_at = ?5
           WHERE attendance_id = ?1",
          rusqlite::params![id_str, student_str, course_str, new.present, at_str],
        )?)
      })
      .await
      .map_err(Error::from);

    let changed: usize = match update {
      Ok(n) => n,
      // Re-pointing collided with an existing mark for the same day.
      Err(err) if is_unique_violation(&err, "attendance_log") => {
        return Err(Error::Core(tally_core::Error::AlreadyMarked {
          student_id: new.student_id,
          course_id:  new.course_id,
        }));
      }
      Err(err) => return Err(err),
    };

    if changed == 0 {
      return Err(Error::Core(tally_core::Error::AttendanceNotFound(id)));
    }

    self
      .get_attendance(id)
      .await?
      .ok_or_else(|| missing_after_write("attendance"))
  }

  async fn delete_attendance(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM attendance_log WHERE attendance_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::Core(tally_core::Error::AttendanceNotFound(id)));
    }
    Ok(())
  }
}

impl SqliteStore {
  /// Single-record read used by the post-write re-reads; not part of the
  /// public trait surface.
  async fn get_attendance(&self, id: Uuid) -> Result<Option<AttendanceRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAttendance> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT attendance_id, student_id, course_id, present, date,
                      submitted_by, updated_at
               FROM attendance_log WHERE attendance_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawAttendance {
                  attendance_id: row.get(0)?,
                  student_id:    row.get(1)?,
                  course_id:     row.get(2)?,
                  present:       row.get(3)?,
                  date:          row.get(4)?,
                  submitted_by:  row.get(5)?,
                  updated_at:    row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAttendance::into_record).transpose()
  }
}
