//! HTTP server assembly for tally.
//!
//! Owns the transport surface the API crate deliberately leaves out: the
//! service-info root, the health probe, request tracing, and the `/api`
//! mount of [`tally_api::api_router`].

use std::{path::PathBuf, sync::Arc};

use axum::{Json, Router, routing::get};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::{actor::Actor, store::RosterStore};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered with
/// `TALLY_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the router needs: the store and the identity writes are
/// stamped with.
pub struct AppState<S> {
  pub store: Arc<S>,
  pub actor: Actor,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete axum [`Router`]: `/`, `/health`, and `/api/...`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RosterStore + 'static,
{
  Router::new()
    .route("/", get(root))
    .route("/health", get(health))
    .nest("/api", tally_api::api_router(state.store, state.actor))
    .layer(TraceLayer::new_for_http())
}

/// `GET /` — service info.
async fn root() -> Json<Value> {
  Json(json!({
    "message": "Attendance Management System API",
    "health":  "/health",
  }))
}

/// `GET /health` — liveness probe.
async fn health() -> Json<Value> {
  Json(json!({
    "status":    "healthy",
    "timestamp": Utc::now(),
  }))
}

// ─── Integration tests ────────────────────────────────────────────────────────
