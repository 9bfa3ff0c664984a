//! Handlers for `/attendance` endpoints — the core workflow.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/attendance` | 404 unknown student/course, 400 duplicate |
//! | `GET`    | `/attendance/student/:id` | All records for a student |
//! | `GET`    | `/attendance/course/:id` | All records for a course |
//! | `GET`    | `/attendance/stats/:id` | Aggregate stats for a course |
//! | `PUT`    | `/attendance/:id` | May re-point student/course |
//! | `DELETE` | `/attendance/:id` | 204 on success |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use tally_core::{
  attendance::{AttendanceRecord, AttendanceStats, NewAttendance},
  store::RosterStore,
};

use crate::{ApiContext, error::ApiError, parse_id};

/// `POST /attendance`
pub async fn mark<S>(
  State(ctx): State<ApiContext<S>>,
  Json(body): Json<NewAttendance>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let record = ctx
    .store
    .mark_attendance(body, &ctx.actor)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /attendance/student/:id`
pub async fn by_student<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  S: RosterStore,
{
  let student_id = parse_id(&id, "student")?;
  let records = ctx
    .store
    .attendance_for_student(student_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(records))
}

/// `GET /attendance/course/:id`
pub async fn by_course<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  S: RosterStore,
{
  let course_id = parse_id(&id, "course")?;
  let records = ctx
    .store
    .attendance_for_course(course_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(records))
}

/// `GET /attendance/stats/:id`
pub async fn stats<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<Json<AttendanceStats>, ApiError>
where
  S: RosterStore,
{
  let course_id = parse_id(&id, "course")?;
  let stats = ctx
    .store
    .course_stats(course_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(stats))
}

/// `PUT /attendance/:id`
pub async fn update_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
  Json(body): Json<NewAttendance>,
) -> Result<Json<AttendanceRecord>, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "attendance")?;
  let record = ctx
    .store
    .update_attendance(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(record))
}

/// `DELETE /attendance/:id`
pub async fn delete_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "attendance")?;
  ctx
    .store
    .delete_attendance(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
