//! JSON REST API for Signals.
//!
//! Exposes an axum [`Router`] backed by any [`signals_core::store::SignalStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", signals_api::api_router(state.clone()))
//! ```

pub mod candidates;
pub mod config;
pub mod decisions;
pub mod env;
pub mod error;
pub mod ingest;
pub mod mentions;
pub mod scores;
pub mod settings;
pub mod taxonomy;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use signals_core::store::SignalStore;
use signals_ingest::PipelineRunner;

pub use error::ApiError;

/// Shared state for all handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  /// Absent when no pipeline executable is configured; ingestion then always
  /// takes the heuristic fallback path.
  pub pipeline: Option<Arc<PipelineRunner>>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), pipeline: self.pipeline.clone() }
  }
}

/// Build the `/api` router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: SignalStore + 'static,
{
  Router::new()
    // Approval workflow
    .route("/decisions", post(decisions::commit::<S>))
    .route("/candidates", get(candidates::list::<S>))
    // Ingestion
    .route("/ingest", post(ingest::single::<S>))
    .route("/ingest/csv", post(ingest::csv_batch::<S>))
    .route("/chunk-tag", post(ingest::chunk_tag::<S>))
    // Read models
    .route("/taxonomy", get(taxonomy::graph::<S>))
    .route("/mentions", get(mentions::list::<S>))
    .route("/scores", get(scores::latest::<S>))
    .route("/scores/run", post(scores::trigger::<S>))
    // Configuration
    .route("/settings", get(settings::read::<S>).put(settings::write::<S>))
    .route("/env", get(env::probe::<S>))
    .with_state(state)
}

/// The full application: the API surface under `/api` plus a liveness probe.
pub fn app<S>(state: AppState<S>) -> Router<()>
where
  S: SignalStore + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .route("/health", get(health))
}

/// `GET /health` — no store access, just process liveness.
async fn health() -> Json<serde_json::Value> {
  Json(serde_json::json!({ "status": "ok" }))
}
