//! JSON REST API for tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::RosterStore`].
//! Transport concerns (bind address, tracing layers, the `/` and `/health`
//! endpoints) are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(store.clone(), Actor::system()))
//! ```

pub mod attendance;
pub mod courses;
pub mod departments;
pub mod error;
pub mod students;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use tally_core::{actor::Actor, store::RosterStore};
use uuid::Uuid;

pub use error::ApiError;

// ─── Shared state ─────────────────────────────────────────────────────────────

/// State threaded through every handler: the store plus the identity writes
/// are attributed to. The actor is constant until authentication exists.
pub struct ApiContext<S> {
  pub store: Arc<S>,
  pub actor: Actor,
}

// Manual impl: `Arc<S>` clones regardless of whether `S` does.
impl<S> Clone for ApiContext<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), actor: self.actor.clone() }
  }
}

/// Parse a path identifier, naming the entity in the failure message.
/// Rejected before any store access.
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {entity} ID")))
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, actor: Actor) -> Router<()>
where
  S: RosterStore + 'static,
{
  let ctx = ApiContext { store, actor };

  Router::new()
    // Departments
    .route(
      "/departments",
      get(departments::list::<S>).post(departments::create::<S>),
    )
    .route(
      "/departments/{id}",
      get(departments::get_one::<S>)
        .put(departments::update_one::<S>)
        .delete(departments::delete_one::<S>),
    )
    // Courses
    .route("/courses", get(courses::list::<S>).post(courses::create::<S>))
    .route(
      "/courses/{id}",
      get(courses::get_one::<S>)
        .put(courses::update_one::<S>)
        .delete(courses::delete_one::<S>),
    )
    // Students
    .route("/students", get(students::list::<S>).post(students::create::<S>))
    .route(
      "/students/{id}",
      get(students::get_one::<S>)
        .put(students::update_one::<S>)
        .delete(students::delete_one::<S>),
    )
    // Users — registration replaces the bare collection POST
    .route("/users", get(users::list::<S>))
    .route("/users/register", post(users::register::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>)
        .put(users::update_one::<S>)
        .delete(users::delete_one::<S>),
    )
    // Attendance
    .route("/attendance", post(attendance::mark::<S>))
    .route("/attendance/student/{id}", get(attendance::by_student::<S>))
    .route("/attendance/course/{id}", get(attendance::by_course::<S>))
    .route("/attendance/stats/{id}", get(attendance::stats::<S>))
    .route(
      "/attendance/{id}",
      put(attendance::update_one::<S>).delete(attendance::delete_one::<S>),
    )
    .with_state(ctx)
}

// ─── Integration tests ────────────────────────────────────────────────────────
