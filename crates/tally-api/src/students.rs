//! Handlers for `/students` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/students` | All students, store order |
//! | `POST`   | `/students` | 404 if `department_id` unknown |
//! | `GET`    | `/students/:id` | 400 malformed id, 404 absent |
//! | `PUT`    | `/students/:id` | Re-validates `department_id` |
//! | `DELETE` | `/students/:id` | 204 on success |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use tally_core::{
  store::RosterStore,
  student::{NewStudent, Student},
};

use crate::{ApiContext, error::ApiError, parse_id};

/// `GET /students`
pub async fn list<S>(
  State(ctx): State<ApiContext<S>>,
) -> Result<Json<Vec<Student>>, ApiError>
where
  S: RosterStore,
{
  let students = ctx.store.list_students().await.map_err(ApiError::from_store)?;
  Ok(Json(students))
}

/// `POST /students`
pub async fn create<S>(
  State(ctx): State<ApiContext<S>>,
  Json(body): Json<NewStudent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let student = ctx
    .store
    .add_student(body, &ctx.actor)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(student)))
}

/// `GET /students/:id`
pub async fn get_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<Json<Student>, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "student")?;
  let student = ctx
    .store
    .get_student(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;
  Ok(Json(student))
}

/// `PUT /students/:id`
pub async fn update_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
  Json(body): Json<NewStudent>,
) -> Result<Json<Student>, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "student")?;
  let student = ctx
    .store
    .update_student(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(student))
}

/// `DELETE /students/:id`
pub async fn delete_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "student")?;
  ctx.store.delete_student(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
