//! Handlers for the scoring viewer and trigger.
//!
//! Scores are read-only here: the viewer shows the latest run's rows, and
//! the trigger merely enqueues a run row. The score computation itself is an
//! external collaborator.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::json;
use signals_core::{
  event::{EventType, NewEvent},
  scoring::{NewScoringRun, ScoringRun, TopicScore},
  store::SignalStore,
};

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct ScoreBoard {
  pub run:    Option<ScoringRun>,
  /// Sorted descending by total score.
  pub scores: Vec<TopicScore>,
}

/// `GET /scores` — the most recent run and its per-topic rows.
pub async fn latest<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<ScoreBoard>, ApiError>
where
  S: SignalStore,
{
  let run = state
    .store
    .latest_scoring_run()
    .await
    .map_err(ApiError::store)?;

  let scores = match &run {
    Some(run) => {
      state
        .store
        .scores_for_run(run.run_id)
        .await
        .map_err(ApiError::store)?
    }
    None => Vec::new(),
  };

  Ok(Json(ScoreBoard { run, scores }))
}

/// `POST /scores/run` — insert a `manual` run row snapshotting the current
/// settings, and record it in the audit log. Returns 201 + the run.
pub async fn trigger<S>(
  State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SignalStore,
{
  let settings = state.store.get_settings().await.map_err(ApiError::store)?;

  let run = state
    .store
    .start_scoring_run(NewScoringRun {
      run_type:       "manual".to_string(),
      half_life_days: Some(settings.half_life_days),
      min_relevance:  Some(settings.min_relevance),
      rollup_alpha:   None,
      notes:          None,
    })
    .await
    .map_err(ApiError::store)?;

  state
    .store
    .log_event(NewEvent {
      payload: json!({ "run_type": run.run_type }),
      run_id: Some(run.run_id),
      ..NewEvent::new(EventType::ScoringRunStarted, "api")
    })
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(run)))
}
