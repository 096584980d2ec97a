//! The `Backend` trait, the REST collaborator that owns all persistent state.
//!
//! Implemented by the HTTP client in `ferias-client` and by
//! [`MemoryBackend`](crate::memory::MemoryBackend). The API router in
//! `ferias-api` serves any implementation over HTTP.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  absence::{AbsencePayload, NewAbsenceRequest},
  id::AbsenceId,
  worker::{Credential, NewWorker, Worker, WorkerUpdate},
};

// ─── Wire envelopes ──────────────────────────────────────────────────────────

/// `GET /api/getferias` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkersResponse {
  pub workers: Vec<Worker>,
}

/// `GET /api/getloginferias` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsResponse {
  pub credentials: Vec<Credential>,
}

/// Response to every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
  pub message: String,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the scheduling backend.
///
/// The backend is the sole source of truth. Callers re-fetch with
/// [`Backend::list_workers`] after each mutation; nothing is cached.
///
/// All methods return `Send` futures so the trait can back an `axum` router.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The credential list used for login comparison.
  fn credentials(
    &self,
  ) -> impl Future<Output = Result<Vec<Credential>, Self::Error>> + Send + '_;

  /// Every worker, with nested vacations and off-days.
  fn list_workers(
    &self,
  ) -> impl Future<Output = Result<Vec<Worker>, Self::Error>> + Send + '_;

  // ── Absences ──────────────────────────────────────────────────────────

  fn create_absence(
    &self,
    request: NewAbsenceRequest,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Replace the absence currently stored under `id`. The payload may carry
  /// a different identifier when the absence changed type or owner.
  fn update_absence(
    &self,
    id: AbsenceId,
    payload: AbsencePayload,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_absence(
    &self,
    id: AbsenceId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Workers ───────────────────────────────────────────────────────────

  /// The backend assigns the identifier.
  fn create_worker(
    &self,
    worker: NewWorker,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn update_worker(
    &self,
    id: String,
    update: WorkerUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Cascades to the worker's absences.
  fn delete_worker(
    &self,
    id: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
