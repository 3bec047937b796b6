//! Handlers for the settings row.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;
use signals_core::{
  event::{EventType, NewEvent},
  settings::Settings,
  store::SignalStore,
};

use crate::{AppState, error::ApiError};

/// `GET /settings` — the single row, or defaults if never written.
pub async fn read<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Settings>, ApiError>
where
  S: SignalStore,
{
  let settings = state.store.get_settings().await.map_err(ApiError::store)?;
  Ok(Json(settings))
}

/// JSON body accepted by `PUT /settings`. `updated_at` is server-assigned.
#[derive(Debug, Deserialize)]
pub struct SettingsBody {
  pub merge_threshold: f64,
  pub half_life_days:  f64,
  pub min_relevance:   f64,
  pub auto_chunk_tag:  bool,
}

/// `PUT /settings` — upsert the row and log a `settings_updated` event.
pub async fn write<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SettingsBody>,
) -> Result<Json<Settings>, ApiError>
where
  S: SignalStore,
{
  let stored = state
    .store
    .put_settings(Settings {
      merge_threshold: body.merge_threshold,
      half_life_days:  body.half_life_days,
      min_relevance:   body.min_relevance,
      auto_chunk_tag:  body.auto_chunk_tag,
      updated_at:      None,
    })
    .await
    .map_err(ApiError::store)?;

  state
    .store
    .log_event(NewEvent {
      payload: json!({
        "merge_threshold": stored.merge_threshold,
        "half_life_days": stored.half_life_days,
        "min_relevance": stored.min_relevance,
        "auto_chunk_tag": stored.auto_chunk_tag,
      }),
      ..NewEvent::new(EventType::SettingsUpdated, "api")
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(stored))
}
