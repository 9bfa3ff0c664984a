//! Handlers for `/departments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/departments` | All departments, store order |
//! | `POST`   | `/departments` | Body: [`NewDepartment`]; 201 |
//! | `GET`    | `/departments/:id` | 400 malformed id, 404 absent |
//! | `PUT`    | `/departments/:id` | Full replacement |
//! | `DELETE` | `/departments/:id` | 204 on success |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use tally_core::{
  department::{Department, NewDepartment},
  store::RosterStore,
};

use crate::{ApiContext, error::ApiError, parse_id};

/// `GET /departments`
pub async fn list<S>(
  State(ctx): State<ApiContext<S>>,
) -> Result<Json<Vec<Department>>, ApiError>
where
  S: RosterStore,
{
  let departments = ctx
    .store
    .list_departments()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(departments))
}

/// `POST /departments`
pub async fn create<S>(
  State(ctx): State<ApiContext<S>>,
  Json(body): Json<NewDepartment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let department = ctx
    .store
    .add_department(body, &ctx.actor)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(department)))
}

/// `GET /departments/:id`
pub async fn get_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<Json<Department>, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "department")?;
  let department = ctx
    .store
    .get_department(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound("Department not found".to_string()))?;
  Ok(Json(department))
}

/// `PUT /departments/:id`
pub async fn update_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
  Json(body): Json<NewDepartment>,
) -> Result<Json<Department>, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "department")?;
  let department = ctx
    .store
    .update_department(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(department))
}

/// `DELETE /departments/:id`
pub async fn delete_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "department")?;
  ctx
    .store
    .delete_department(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
