//! Handler for `GET /env` — the environment-configuration probe.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::AppState;

/// Presence booleans only — secret values are never echoed back.
#[derive(Debug, Serialize)]
pub struct EnvProbe {
  pub openai_api_key:   bool,
  pub openai_model:     bool,
  pub pipeline_command: bool,
}

/// `GET /env`
pub async fn probe<S>(State(state): State<AppState<S>>) -> Json<EnvProbe>
where
  S: Send + Sync,
{
  let present =
    |name: &str| std::env::var(name).is_ok_and(|v| !v.trim().is_empty());

  Json(EnvProbe {
    openai_api_key:   present("OPENAI_API_KEY"),
    openai_model:     present("OPENAI_MODEL"),
    pipeline_command: state.pipeline.is_some(),
  })
}
