//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/users/register` | 400 on duplicate username/email |
//! | `GET`    | `/users` | All users |
//! | `GET`    | `/users/:id` | 400 malformed id, 404 absent |
//! | `PUT`    | `/users/:id` | Password must be resupplied; re-digested |
//! | `DELETE` | `/users/:id` | 204 on success |
//!
//! No response on any of these paths carries a credential: the [`User`] type
//! itself has no digest field.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use tally_core::{
  store::RosterStore,
  user::{NewUser, User},
};

use crate::{ApiContext, error::ApiError, parse_id};

/// `POST /users/register`
pub async fn register<S>(
  State(ctx): State<ApiContext<S>>,
  Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let user = ctx
    .store
    .register_user(body, &ctx.actor)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users`
pub async fn list<S>(
  State(ctx): State<ApiContext<S>>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: RosterStore,
{
  let users = ctx.store.list_users().await.map_err(ApiError::from_store)?;
  Ok(Json(users))
}

/// `GET /users/:id`
pub async fn get_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<Json<User>, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "user")?;
  let user = ctx
    .store
    .get_user(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
  Ok(Json(user))
}

/// `PUT /users/:id`
pub async fn update_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
  Json(body): Json<NewUser>,
) -> Result<Json<User>, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "user")?;
  let user = ctx
    .store
    .update_user(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(user))
}

/// `DELETE /users/:id`
pub async fn delete_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore,
{
  let id = parse_id(&id, "user")?;
  ctx.store.delete_user(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
