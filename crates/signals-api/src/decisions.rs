//! Handler for `POST /decisions` — the batch candidate-decision commit.
//!
//! The whole batch is processed sequentially; the first store failure aborts
//! the request and leaves earlier decisions committed (no compensation).

use axum::{Json, extract::State};
use serde::Deserialize;
use signals_core::{
  approval::{BatchOutcome, Decision, apply_decisions},
  store::SignalStore,
};

use crate::{AppState, error::ApiError};

fn default_approver() -> String { "system".to_string() }

/// JSON body accepted by `POST /decisions`.
#[derive(Debug, Deserialize)]
pub struct DecisionsBody {
  #[serde(default = "default_approver")]
  pub approver:  String,
  pub decisions: Vec<Decision>,
}

/// `POST /decisions` — body: [`DecisionsBody`]; returns the batch summary.
pub async fn commit<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<DecisionsBody>,
) -> Result<Json<BatchOutcome>, ApiError>
where
  S: SignalStore,
{
  let outcome =
    apply_decisions(state.store.as_ref(), &body.approver, &body.decisions)
      .await?;
  Ok(Json(outcome))
}
