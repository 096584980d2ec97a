//! Error types for `ferias-client`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid base URL {url:?}: {reason}")]
  InvalidBaseUrl { url: String, reason: String },

  #[error("{method} {path} → {status}")]
  Status {
    method: &'static str,
    path:   String,
    status: StatusCode,
  },
}

impl Error {
  /// Whether the backend answered 404.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
