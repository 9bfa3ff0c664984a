//! Attendance records and the derived per-course statistics.
//!
//! This is the only part of the system with real invariants: a student can be
//! marked at most once per course per UTC calendar day, and both foreign
//! references are validated on every write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seconds per UTC day; used to derive the dedup window from `date`.
const SECONDS_PER_DAY: i64 = 86_400;

/// A stored attendance mark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub id:           Uuid,
  pub student_id:   Uuid,
  pub course_id:    Uuid,
  pub present:      bool,
  /// Wall-clock epoch seconds at marking time. Never changed by updates.
  pub date:         i64,
  pub submitted_by: String,
  pub updated_at:   DateTime<Utc>,
}

/// Input to marking and updating attendance. `date` is always stamped by the
/// store at marking time; it is not accepted from callers.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAttendance {
  pub student_id: Uuid,
  pub course_id:  Uuid,
  pub present:    bool,
}

/// The UTC calendar day an epoch-seconds timestamp falls on.
///
/// `(student_id, course_id, day)` is the duplicate-mark key: one mark per
/// student per course per day.
pub fn dedup_day(epoch_seconds: i64) -> i64 {
  epoch_seconds.div_euclid(SECONDS_PER_DAY)
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Aggregate attendance statistics for one course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceStats {
  pub course_id:             Uuid,
  pub total_records:         u64,
  pub present:               u64,
  pub absent:                u64,
  /// `100 * present / total`, rounded to two decimal places. `0` when the
  /// course has no records at all.
  pub attendance_percentage: f64,
}

impl AttendanceStats {
  /// Aggregate a course's records. Pure; the store supplies the scan.
  pub fn from_records(course_id: Uuid, records: &[AttendanceRecord]) -> Self {
    let total = records.len() as u64;
    if total == 0 {
      return Self {
        course_id,
        total_records: 0,
        present: 0,
        absent: 0,
        attendance_percentage: 0.0,
      };
    }

    let present = records.iter().filter(|r| r.present).count() as u64;
    let percentage = 100.0 * present as f64 / total as f64;

    Self {
      course_id,
      total_records: total,
      present,
      absent: total - present,
      attendance_percentage: round2(percentage),
    }
  }
}

/// Round to two decimal places, halves away from zero.
fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(present: bool) -> AttendanceRecord {
    AttendanceRecord {
      id:           Uuid::new_v4(),
      student_id:   Uuid::new_v4(),
      course_id:    Uuid::new_v4(),
      present,
      date:         1_700_000_000,
      submitted_by: "system".into(),
      updated_at:   Utc::now(),
    }
  }

  #[test]
  fn two_of_three_present_is_66_67() {
    let course_id = Uuid::new_v4();
    let records = vec![record(true), record(true), record(false)];
    let stats = AttendanceStats::from_records(course_id, &records);

    assert_eq!(stats.course_id, course_id);
    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.present, 2);
    assert_eq!(stats.absent, 1);
    assert_eq!(stats.attendance_percentage, 66.67);
  }

  #[test]
  fn no_records_is_all_zero() {
    let stats = AttendanceStats::from_records(Uuid::new_v4(), &[]);
    assert_eq!(stats.total_records, 0);
    assert_eq!(stats.present, 0);
    assert_eq!(stats.absent, 0);
    assert_eq!(stats.attendance_percentage, 0.0);
  }

  #[test]
  fn all_present_is_exactly_100() {
    let stats =
      AttendanceStats::from_records(Uuid::new_v4(), &[record(true), record(true)]);
    assert_eq!(stats.attendance_percentage, 100.0);
  }

  #[test]
  fn one_of_eight_rounds_to_12_5() {
    let mut records = vec![record(true)];
    records.extend(std::iter::repeat_with(|| record(false)).take(7));
    let stats = AttendanceStats::from_records(Uuid::new_v4(), &records);
    assert_eq!(stats.attendance_percentage, 12.5);
  }

  #[test]
  fn dedup_day_truncates_within_a_day() {
    let midnight = 1_700_006_400; // some UTC midnight
    assert_eq!(dedup_day(midnight), dedup_day(midnight + 1));
    assert_eq!(dedup_day(midnight), dedup_day(midnight + 86_399));
    assert_ne!(dedup_day(midnight), dedup_day(midnight + 86_400));
  }

  #[test]
  fn dedup_day_handles_pre_epoch_times() {
    // div_euclid keeps day boundaries aligned for negative timestamps too.
    assert_eq!(dedup_day(-1), -1);
    assert_eq!(dedup_day(-86_400), -1);
    assert_eq!(dedup_day(0), 0);
  }
}
