//! Handler for `GET /mentions`.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use signals_core::{
  mention::{Mention, MentionFilter},
  store::SignalStore,
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub session_id: Option<Uuid>,
  pub topic_id:   Option<String>,
}

/// `GET /mentions[?session_id=...][&topic_id=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Mention>>, ApiError>
where
  S: SignalStore,
{
  let filter = MentionFilter {
    session_id: params.session_id,
    topic_id:   params.topic_id,
  };
  let mentions = state
    .store
    .list_mentions(&filter)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(mentions))
}
