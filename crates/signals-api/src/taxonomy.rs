//! Handler for `GET /taxonomy` — the assembled topic graph.

use axum::{Json, extract::State};
use signals_core::{store::SignalStore, taxonomy};

use crate::{AppState, error::ApiError};

/// `GET /taxonomy` — read-only, idempotent projection of topics, aliases,
/// and parent/child edges.
pub async fn graph<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<taxonomy::TaxonomyGraph>, ApiError>
where
  S: SignalStore,
{
  let topics = state.store.list_topics().await.map_err(ApiError::store)?;
  let aliases = state.store.list_aliases().await.map_err(ApiError::store)?;
  let relations =
    state.store.list_relations().await.map_err(ApiError::store)?;

  Ok(Json(taxonomy::assemble(topics, &aliases, &relations)))
}
