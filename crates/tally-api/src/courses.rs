//! Handlers for `/courses` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/courses` | All courses, store order |
//! | `POST`   | `/courses` | 404 if `department_id` unknown, 400 bad semester |
//! | `GET`    | `/courses/:id` | 400 malformed id, 404 absent |
//! | `PUT`    | `/courses/:id` | Re-validates `department_id` |
//! | `DELETE` | `/courses/:id` | 204 on success |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use tally_core::{
  course::{Course, NewCourse},
  store::RosterStore,
};

use crate::{ApiContext, error::ApiError, parse_id};

/// `GET /courses`
pub async fn list<S>(
  State(ctx): State<ApiContext<S>>,
) -> Result<Json<Vec<Course>>, ApiError>
where
  S: RosterStore,
{
  let courses = ctx.store.list_courses().await.map_err(ApiError::from_store)?;
  Ok(Json(courses))
}

/// `POST /courses`
pub async fn create<S>(
  State(ctx): State<ApiContext<S>>,
  Json(body): Json<NewCourse>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let course = ctx
    .store
    .add_course(body, &ctx.actor)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(course)))
}

/// `GET /courses/:id`
pub async fn get_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<Json<Course>, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "course")?;
  let course = ctx
    .store
    .get_course(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;
  Ok(Json(course))
}

/// `PUT /courses/:id`
pub async fn update_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
  Json(body): Json<NewCourse>,
) -> Result<Json<Course>, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "course")?;
  let course = ctx
    .store
    .update_course(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(course))
}

/// `DELETE /courses/:id`
pub async fn delete_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "course")?;
  ctx.store.delete_course(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
