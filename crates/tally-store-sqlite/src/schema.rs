//! SQL schema for the tally SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Foreign ids are deliberately plain columns, not REFERENCES: the store
/// validates them at write time only, deletes never cascade, and a deleted
/// parent leaves referencing rows dangling.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS departments (
    department_id   TEXT PRIMARY KEY,
    department_name TEXT NOT NULL,
    submitted_by    TEXT NOT NULL,
    updated_at      TEXT NOT NULL    -- ISO 8601 UTC
);

CREATE TABLE IF NOT EXISTS courses (
    course_id     TEXT PRIMARY KEY,
    course_name   TEXT NOT NULL,
    department_id TEXT NOT NULL,     -- checked at write time only
    semester      INTEGER NOT NULL,  -- 1..8
    class_label   TEXT NOT NULL,
    lecture_hours INTEGER NOT NULL,
    submitted_by  TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    student_id    TEXT PRIMARY KEY,
    full_name     TEXT NOT NULL,
    department_id TEXT NOT NULL,     -- checked at write time only
    class_label   TEXT NOT NULL,
    submitted_by  TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id         TEXT PRIMARY KEY,
    full_name       TEXT NOT NULL,
    username        TEXT NOT NULL UNIQUE,
    email           TEXT NOT NULL UNIQUE,
    password_digest TEXT NOT NULL,   -- hex SHA-256; never read back out
    role            TEXT NOT NULL,   -- 'admin' | 'faculty' | 'student'
    submitted_by    TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

-- day = date truncated to the UTC calendar day. The unique index makes the
-- store the single arbiter between concurrent duplicate marks.
CREATE TABLE IF NOT EXISTS attendance_log (
    attendance_id TEXT PRIMARY KEY,
    student_id    TEXT NOT NULL,
    course_id     TEXT NOT NULL,
    present       INTEGER NOT NULL,  -- 0 | 1
    date          INTEGER NOT NULL,  -- epoch seconds at marking time
    day           INTEGER NOT NULL,
    submitted_by  TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    UNIQUE (student_id, course_id, day)
);

CREATE INDEX IF NOT EXISTS attendance_student_idx ON attendance_log(student_id);
CREATE INDEX IF NOT EXISTS attendance_course_idx  ON attendance_log(course_id);

PRAGMA user_version = 1;
";
