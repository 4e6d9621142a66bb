//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use registry_core::{StoreError, StoreErrorKind};
use serde_json::json;
use thiserror::Error;

use crate::decode::DecodeError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Decode(#[from] DecodeError),

  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  NotFound(String),

  #[error("store did not respond in time")]
  Timeout,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend failure: an absent record is the client's problem,
  /// everything else is opaque.
  pub fn from_store<E>(err: E) -> Self
  where
    E: StoreError + Send + Sync + 'static,
  {
    match err.kind() {
      StoreErrorKind::NotFound => ApiError::NotFound(err.to_string()),
      _ => ApiError::Store(Box::new(err)),
    }
  }
}

/// Render an error and all of its sources, outermost first.
fn chain(err: &dyn std::error::Error) -> String {
  let mut out = err.to_string();
  let mut source = err.source();
  while let Some(s) = source {
    out.push_str(": ");
    out.push_str(&s.to_string());
    source = s.source();
  }
  out
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Decode(e) => {
        tracing::warn!(error = %e, "rejected request body");
        (StatusCode::BAD_REQUEST, e.to_string())
      }
      ApiError::Validation(m) | ApiError::BadRequest(m) => {
        tracing::warn!(error = %m, "bad request");
        (StatusCode::BAD_REQUEST, m.clone())
      }
      ApiError::NotFound(m) => {
        tracing::warn!(error = %m, "not found");
        (StatusCode::NOT_FOUND, m.clone())
      }
      ApiError::Timeout => {
        tracing::error!("store call exceeded its deadline");
        (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
      }
      ApiError::Store(e) => {
        tracing::error!(error = %chain(e.as_ref()), "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal server error".to_owned(),
        )
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
