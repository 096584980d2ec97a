//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

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
  /// Classify an error raised by a backend. Core errors keep their
  /// not-found and validation meaning; anything else is a 500.
  pub fn from_store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
    match boxed.downcast::<ferias_core::Error>() {
      Ok(core) => Self::from(*core),
      Err(other) => Self::Store(other),
    }
  }
}

impl From<ferias_core::Error> for ApiError {
  fn from(e: ferias_core::Error) -> Self {
    use ferias_core::Error as E;
    match e {
      e if e.is_not_found() => Self::NotFound(e.to_string()),
      E::MissingField(_)
      | E::InvalidRange { .. }
      | E::InvalidTime(_)
      | E::InvalidDate(_)
      | E::InvalidLunch(_)
      | E::InvalidHours(_)
      | E::SequenceExhausted { .. } => Self::BadRequest(e.to_string()),
      other => Self::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
