//! Handlers for ingestion endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/ingest` | Body: [`IngestRequest`]; returns 201 + outcome |
//! | `POST` | `/ingest/csv` | Raw CSV body (`title,content[,date]`) |
//! | `POST` | `/chunk-tag` | Writes a `chunk_tag_requested` audit event only |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::json;
use signals_core::{
  event::{EventType, NewEvent},
  store::SignalStore,
};
use signals_ingest::{IngestOutcome, IngestRequest, ingest_csv, ingest_session};

use crate::{AppState, error::ApiError};

/// `POST /ingest` — returns 201 + the [`IngestOutcome`]. A pipeline failure
/// is not an error: the outcome carries `used_fallback` and a warning.
pub async fn single<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<IngestRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SignalStore,
{
  let outcome =
    ingest_session(state.store.as_ref(), state.pipeline.as_deref(), body)
      .await?;
  Ok((StatusCode::CREATED, Json(outcome)))
}

#[derive(Debug, Serialize)]
pub struct CsvIngestResponse {
  pub sessions: usize,
  pub outcomes: Vec<IngestOutcome>,
}

/// `POST /ingest/csv` — the body is the CSV document itself. Required
/// columns are validated before any row is ingested (400 on failure).
pub async fn csv_batch<S>(
  State(state): State<AppState<S>>,
  body: String,
) -> Result<impl IntoResponse, ApiError>
where
  S: SignalStore,
{
  let outcomes =
    ingest_csv(state.store.as_ref(), state.pipeline.as_deref(), &body).await?;
  Ok((
    StatusCode::CREATED,
    Json(CsvIngestResponse { sessions: outcomes.len(), outcomes }),
  ))
}

/// `POST /chunk-tag` — records a re-run request in the audit log. The actual
/// chunk/tag run is an external collaborator reacting to that event; nothing
/// runs synchronously here.
pub async fn chunk_tag<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: SignalStore,
{
  state
    .store
    .log_event(NewEvent {
      payload: json!({ "reason": "manual" }),
      ..NewEvent::new(EventType::ChunkTagRequested, "api")
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({ "requested": true })))
}
