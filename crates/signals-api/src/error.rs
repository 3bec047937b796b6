//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use signals_core::approval::ApprovalError;
use signals_ingest::IngestError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error as a generic 500.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store(Box::new(e))
  }
}

impl<E> From<ApprovalError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(e: ApprovalError<E>) -> Self {
    match e {
      ApprovalError::CandidateNotFound(id) => {
        ApiError::NotFound(format!("candidate {id} not found"))
      }
      ApprovalError::Store(e) => ApiError::store(e),
    }
  }
}

impl<E> From<IngestError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(e: IngestError<E>) -> Self {
    match e {
      IngestError::Batch(e) => ApiError::BadRequest(e.to_string()),
      IngestError::Store(e) => ApiError::store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
