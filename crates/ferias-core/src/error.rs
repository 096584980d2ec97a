//! Error types for `ferias-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("worker not found: {0}")]
  WorkerNotFound(String),

  #[error("absence not found: {0}")]
  AbsenceNotFound(String),

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("invalid range: {start} is after {end}")]
  InvalidRange { start: String, end: String },

  #[error("invalid time of day: {0:?}")]
  InvalidTime(String),

  #[error("invalid date: {0:?}")]
  InvalidDate(String),

  #[error("invalid lunch duration: {0:?}")]
  InvalidLunch(String),

  #[error("invalid hours: {0:?}")]
  InvalidHours(String),

  #[error("no identifiers left for worker {owner}, type {kind}")]
  SequenceExhausted { owner: String, kind: String },

  #[error("login required")]
  Unauthorized,

  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Whether the error names a worker or absence the backend does not know.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::WorkerNotFound(_) | Self::AbsenceNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
