//! Integration tests for `SqliteStore` against an in-memory database.

use tally_core::{
  Error as CoreError,
  actor::Actor,
  attendance::NewAttendance,
  course::NewCourse,
  department::{Department, NewDepartment},
  store::RosterStore,
  student::{NewStudent, Student},
  user::{NewUser, UserRole},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn actor() -> Actor { Actor::system() }

async fn seed_department(s: &SqliteStore) -> Department {
  s.add_department(
    NewDepartment { department_name: "Computer Science".into() },
    &actor(),
  )
  .await
  .unwrap()
}

async fn seed_course(s: &SqliteStore, department_id: Uuid) -> tally_core::course::Course {
  s.add_course(
    NewCourse {
      course_name: "Algorithms".into(),
      department_id,
      semester: 3,
      class_label: "CS-3A".into(),
      lecture_hours: 42,
    },
    &actor(),
  )
  .await
  .unwrap()
}

async fn seed_student(s: &SqliteStore, department_id: Uuid) -> Student {
  s.add_student(
    NewStudent {
      full_name: "Alice Liddell".into(),
      department_id,
      class_label: "CS-3A".into(),
    },
    &actor(),
  )
  .await
  .unwrap()
}

fn new_user(username: &str, email: &str) -> NewUser {
  NewUser {
    full_name: "Alice Liddell".into(),
    username:  username.into(),
    email:     email.into(),
    password:  "hunter2".into(),
    role:      UserRole::Student,
  }
}

// ─── Departments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_department() {
  let s = store().await;

  let dept = seed_department(&s).await;
  assert_eq!(dept.department_name, "Computer Science");
  assert_eq!(dept.submitted_by, "system");

  let fetched = s.get_department(dept.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, dept.id);
  assert_eq!(fetched.department_name, "Computer Science");
}

#[tokio::test]
async fn get_department_missing_returns_none() {
  let s = store().await;
  assert!(s.get_department(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn get_is_idempotent() {
  let s = store().await;
  let dept = seed_department(&s).await;

  let first = s.get_department(dept.id).await.unwrap().unwrap();
  let second = s.get_department(dept.id).await.unwrap().unwrap();
  assert_eq!(first.department_name, second.department_name);
  assert_eq!(first.updated_at, second.updated_at);
}

#[tokio::test]
async fn list_departments_returns_all() {
  let s = store().await;
  seed_department(&s).await;
  s.add_department(NewDepartment { department_name: "Physics".into() }, &actor())
    .await
    .unwrap();

  let all = s.list_departments().await.unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn update_department_replaces_and_bumps_timestamp() {
  let s = store().await;
  let dept = seed_department(&s).await;

  let updated = s
    .update_department(dept.id, NewDepartment { department_name: "Mathematics".into() })
    .await
    .unwrap();

  assert_eq!(updated.department_name, "Mathematics");
  assert!(updated.updated_at >= dept.updated_at);
  // submitted_by keeps the creation stamp.
  assert_eq!(updated.submitted_by, "system");
}

#[tokio::test]
async fn update_missing_department_errors() {
  let s = store().await;
  let err = s
    .update_department(Uuid::new_v4(), NewDepartment { department_name: "X".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DepartmentNotFound(_))));
}

#[tokio::test]
async fn delete_department_then_get_returns_none() {
  let s = store().await;
  let dept = seed_department(&s).await;

  s.delete_department(dept.id).await.unwrap();
  assert!(s.get_department(dept.id).await.unwrap().is_none());

  let err = s.delete_department(dept.id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DepartmentNotFound(_))));
}

// ─── Courses ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_course_requires_existing_department() {
  let s = store().await;
  let err = s
    .add_course(
      NewCourse {
        course_name: "Ghost Course".into(),
        department_id: Uuid::new_v4(),
        semester: 1,
        class_label: "X".into(),
        lecture_hours: 10,
      },
      &actor(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DepartmentNotFound(_))));

  // Nothing was persisted.
  assert!(s.list_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn add_course_rejects_out_of_range_semester() {
  let s = store().await;
  let dept = seed_department(&s).await;

  for semester in [0, 9] {
    let err = s
      .add_course(
        NewCourse {
          course_name: "Algorithms".into(),
          department_id: dept.id,
          semester,
          class_label: "CS-3A".into(),
          lecture_hours: 42,
        },
        &actor(),
      )
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Core(CoreError::SemesterOutOfRange(_))));
  }
}

#[tokio::test]
async fn add_and_get_course() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;

  let fetched = s.get_course(course.id).await.unwrap().unwrap();
  assert_eq!(fetched.course_name, "Algorithms");
  assert_eq!(fetched.department_id, dept.id);
  assert_eq!(fetched.semester, 3);
  assert_eq!(fetched.lecture_hours, 42);
}

#[tokio::test]
async fn update_course_replaces_all_mutable_fields() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;

  let updated = s
    .update_course(
      course.id,
      NewCourse {
        course_name: "Advanced Algorithms".into(),
        department_id: dept.id,
        semester: 5,
        class_label: "CS-5B".into(),
        lecture_hours: 56,
      },
    )
    .await
    .unwrap();

  assert_eq!(updated.course_name, "Advanced Algorithms");
  assert_eq!(updated.semester, 5);
  assert_eq!(updated.class_label, "CS-5B");
  assert_eq!(updated.lecture_hours, 56);
  assert!(updated.updated_at >= course.updated_at);

  let reread = s.get_course(course.id).await.unwrap().unwrap();
  assert_eq!(reread.semester, 5);
  assert_eq!(reread.lecture_hours, 56);
}

#[tokio::test]
async fn update_course_revalidates_department() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;

  let err = s
    .update_course(
      course.id,
      NewCourse {
        course_name: "Algorithms".into(),
        department_id: Uuid::new_v4(),
        semester: 3,
        class_label: "CS-3A".into(),
        lecture_hours: 42,
      },
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DepartmentNotFound(_))));
}

#[tokio::test]
async fn deleting_department_leaves_course_reference_dangling() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;

  s.delete_department(dept.id).await.unwrap();

  // No cascade, no protection: the course survives with a dangling id.
  let fetched = s.get_course(course.id).await.unwrap().unwrap();
  assert_eq!(fetched.department_id, dept.id);
}

// ─── Students ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_student_requires_existing_department() {
  let s = store().await;
  let err = s
    .add_student(
      NewStudent {
        full_name: "Nobody".into(),
        department_id: Uuid::new_v4(),
        class_label: "X".into(),
      },
      &actor(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DepartmentNotFound(_))));
}

#[tokio::test]
async fn student_crud_round_trip() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let student = seed_student(&s, dept.id).await;

  let fetched = s.get_student(student.id).await.unwrap().unwrap();
  assert_eq!(fetched.full_name, "Alice Liddell");

  let updated = s
    .update_student(
      student.id,
      NewStudent {
        full_name: "Alice L. Hargreaves".into(),
        department_id: dept.id,
        class_label: "CS-4A".into(),
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.full_name, "Alice L. Hargreaves");
  assert_eq!(updated.class_label, "CS-4A");

  s.delete_student(student.id).await.unwrap();
  assert!(s.get_student(student.id).await.unwrap().is_none());
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_get_user() {
  let s = store().await;
  let user = s
    .register_user(new_user("alice", "alice@example.com"), &actor())
    .await
    .unwrap();

  assert_eq!(user.username, "alice");
  assert_eq!(user.role, UserRole::Student);
  assert_eq!(user.submitted_by, "system");

  let fetched = s.get_user(user.id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "alice@example.com");
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
  let s = store().await;
  s.register_user(new_user("alice", "alice@example.com"), &actor())
    .await
    .unwrap();

  let err = s
    .register_user(new_user("alice", "other@example.com"), &actor())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UsernameTaken(_))));
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
  let s = store().await;
  s.register_user(new_user("alice", "alice@example.com"), &actor())
    .await
    .unwrap();

  let err = s
    .register_user(new_user("bob", "alice@example.com"), &actor())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::EmailTaken(_))));
}

#[tokio::test]
async fn uniqueness_is_case_sensitive() {
  let s = store().await;
  s.register_user(new_user("alice", "alice@example.com"), &actor())
    .await
    .unwrap();

  // Exact string match only — no normalisation.
  s.register_user(new_user("Alice", "ALICE@example.com"), &actor())
    .await
    .unwrap();

  assert_eq!(s.list_users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn register_rejects_invalid_email() {
  let s = store().await;
  let err = s
    .register_user(new_user("alice", "not-an-email"), &actor())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidEmail(_))));
}

#[tokio::test]
async fn update_user_allows_noop_rename() {
  let s = store().await;
  let user = s
    .register_user(new_user("alice", "alice@example.com"), &actor())
    .await
    .unwrap();

  // Same username resubmitted — must succeed.
  let updated = s
    .update_user(user.id, new_user("alice", "alice@example.com"))
    .await
    .unwrap();
  assert_eq!(updated.username, "alice");
}

#[tokio::test]
async fn update_user_rejects_username_of_another_user() {
  let s = store().await;
  s.register_user(new_user("alice", "alice@example.com"), &actor())
    .await
    .unwrap();
  let bob = s
    .register_user(new_user("bob", "bob@example.com"), &actor())
    .await
    .unwrap();

  let err = s
    .update_user(bob.id, new_user("alice", "bob@example.com"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UsernameTaken(_))));
}

#[tokio::test]
async fn update_missing_user_errors() {
  let s = store().await;
  let err = s
    .update_user(Uuid::new_v4(), new_user("ghost", "ghost@example.com"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UserNotFound(_))));
}

#[tokio::test]
async fn delete_user() {
  let s = store().await;
  let user = s
    .register_user(new_user("alice", "alice@example.com"), &actor())
    .await
    .unwrap();

  s.delete_user(user.id).await.unwrap();
  assert!(s.get_user(user.id).await.unwrap().is_none());

  let err = s.delete_user(user.id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UserNotFound(_))));
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn mark_requires_existing_student_then_course() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;
  let student = seed_student(&s, dept.id).await;

  let err = s
    .mark_attendance(
      NewAttendance {
        student_id: Uuid::new_v4(),
        course_id:  course.id,
        present:    true,
      },
      &actor(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::StudentNotFound(_))));

  let err = s
    .mark_attendance(
      NewAttendance {
        student_id: student.id,
        course_id:  Uuid::new_v4(),
        present:    true,
      },
      &actor(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CourseNotFound(_))));
}

#[tokio::test]
async fn mark_and_read_back() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;
  let student = seed_student(&s, dept.id).await;

  let record = s
    .mark_attendance(
      NewAttendance {
        student_id: student.id,
        course_id:  course.id,
        present:    true,
      },
      &actor(),
    )
    .await
    .unwrap();

  assert_eq!(record.student_id, student.id);
  assert_eq!(record.course_id, course.id);
  assert!(record.present);
  assert!(record.date > 0);
  assert_eq!(record.submitted_by, "system");
}

#[tokio::test]
async fn second_mark_same_day_conflicts() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;
  let student = seed_student(&s, dept.id).await;

  let new = NewAttendance {
    student_id: student.id,
    course_id:  course.id,
    present:    true,
  };
  s.mark_attendance(new.clone(), &actor()).await.unwrap();

  let err = s.mark_attendance(new, &actor()).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AlreadyMarked { .. })));
}

#[tokio::test]
async fn marks_for_other_course_or_student_succeed() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course_a = seed_course(&s, dept.id).await;
  let course_b = seed_course(&s, dept.id).await;
  let student_a = seed_student(&s, dept.id).await;
  let student_b = seed_student(&s, dept.id).await;

  s.mark_attendance(
    NewAttendance { student_id: student_a.id, course_id: course_a.id, present: true },
    &actor(),
  )
  .await
  .unwrap();

  // Same student, different course.
  s.mark_attendance(
    NewAttendance { student_id: student_a.id, course_id: course_b.id, present: true },
    &actor(),
  )
  .await
  .unwrap();

  // Same course, different student.
  s.mark_attendance(
    NewAttendance { student_id: student_b.id, course_id: course_a.id, present: false },
    &actor(),
  )
  .await
  .unwrap();
}

#[tokio::test]
async fn list_by_student_and_course() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course_a = seed_course(&s, dept.id).await;
  let course_b = seed_course(&s, dept.id).await;
  let student = seed_student(&s, dept.id).await;

  s.mark_attendance(
    NewAttendance { student_id: student.id, course_id: course_a.id, present: true },
    &actor(),
  )
  .await
  .unwrap();
  s.mark_attendance(
    NewAttendance { student_id: student.id, course_id: course_b.id, present: false },
    &actor(),
  )
  .await
  .unwrap();

  let by_student = s.attendance_for_student(student.id).await.unwrap();
  assert_eq!(by_student.len(), 2);

  let by_course = s.attendance_for_course(course_a.id).await.unwrap();
  assert_eq!(by_course.len(), 1);
  assert_eq!(by_course[0].student_id, student.id);
}

#[tokio::test]
async fn listing_unknown_student_or_course_errors() {
  let s = store().await;

  let err = s.attendance_for_student(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::StudentNotFound(_))));

  let err = s.attendance_for_course(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CourseNotFound(_))));
}

#[tokio::test]
async fn stats_two_of_three_present() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;
  let a = seed_student(&s, dept.id).await;
  let b = seed_student(&s, dept.id).await;
  let c = seed_student(&s, dept.id).await;

  for (student, present) in [(&a, true), (&b, true), (&c, false)] {
    s.mark_attendance(
      NewAttendance { student_id: student.id, course_id: course.id, present },
      &actor(),
    )
    .await
    .unwrap();
  }

  let stats = s.course_stats(course.id).await.unwrap();
  assert_eq!(stats.course_id, course.id);
  assert_eq!(stats.total_records, 3);
  assert_eq!(stats.present, 2);
  assert_eq!(stats.absent, 1);
  assert_eq!(stats.attendance_percentage, 66.67);
}

#[tokio::test]
async fn stats_for_empty_course_are_zero() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;

  let stats = s.course_stats(course.id).await.unwrap();
  assert_eq!(stats.total_records, 0);
  assert_eq!(stats.present, 0);
  assert_eq!(stats.absent, 0);
  assert_eq!(stats.attendance_percentage, 0.0);
}

#[tokio::test]
async fn stats_for_unknown_course_errors() {
  let s = store().await;
  let err = s.course_stats(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CourseNotFound(_))));
}

#[tokio::test]
async fn update_can_repoint_record() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;
  let a = seed_student(&s, dept.id).await;
  let b = seed_student(&s, dept.id).await;

  let record = s
    .mark_attendance(
      NewAttendance { student_id: a.id, course_id: course.id, present: true },
      &actor(),
    )
    .await
    .unwrap();

  let updated = s
    .update_attendance(
      record.id,
      NewAttendance { student_id: b.id, course_id: course.id, present: false },
    )
    .await
    .unwrap();

  assert_eq!(updated.id, record.id);
  assert_eq!(updated.student_id, b.id);
  assert!(!updated.present);
  // The original marking time survives updates.
  assert_eq!(updated.date, record.date);
}

#[tokio::test]
async fn update_validates_submitted_ids() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;
  let student = seed_student(&s, dept.id).await;

  let record = s
    .mark_attendance(
      NewAttendance { student_id: student.id, course_id: course.id, present: true },
      &actor(),
    )
    .await
    .unwrap();

  let err = s
    .update_attendance(
      record.id,
      NewAttendance { student_id: Uuid::new_v4(), course_id: course.id, present: true },
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::StudentNotFound(_))));
}

#[tokio::test]
async fn update_missing_record_errors() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;
  let student = seed_student(&s, dept.id).await;

  let err = s
    .update_attendance(
      Uuid::new_v4(),
      NewAttendance { student_id: student.id, course_id: course.id, present: true },
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AttendanceNotFound(_))));
}

#[tokio::test]
async fn repointing_onto_an_existing_mark_conflicts() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;
  let a = seed_student(&s, dept.id).await;
  let b = seed_student(&s, dept.id).await;

  let record_a = s
    .mark_attendance(
      NewAttendance { student_id: a.id, course_id: course.id, present: true },
      &actor(),
    )
    .await
    .unwrap();
  s.mark_attendance(
    NewAttendance { student_id: b.id, course_id: course.id, present: true },
    &actor(),
  )
  .await
  .unwrap();

  // Re-pointing a's record at b collides with b's mark for the same day.
  let err = s
    .update_attendance(
      record_a.id,
      NewAttendance { student_id: b.id, course_id: course.id, present: true },
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AlreadyMarked { .. })));
}

#[tokio::test]
async fn delete_attendance() {
  let s = store().await;
  let dept = seed_department(&s).await;
  let course = seed_course(&s, dept.id).await;
  let student = seed_student(&s, dept.id).await;

  let record = s
    .mark_attendance(
      NewAttendance { student_id: student.id, course_id: course.id, present: true },
      &actor(),
    )
    .await
    .unwrap();

  s.delete_attendance(record.id).await.unwrap();

  let err = s.delete_attendance(record.id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AttendanceNotFound(_))));
}
