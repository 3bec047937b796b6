//! Handler for `GET /candidates`.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use signals_core::{
  candidate::{CandidateStatus, TopicCandidate},
  store::SignalStore,
};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Defaults to `pending` — the approval queue view.
  pub status: Option<CandidateStatus>,
}

/// `GET /candidates[?status=approved|rejected|merged|pending]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<TopicCandidate>>, ApiError>
where
  S: SignalStore,
{
  let status = params.status.unwrap_or(CandidateStatus::Pending);
  let candidates = state
    .store
    .list_candidates(Some(status))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(candidates))
}
