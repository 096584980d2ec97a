//! In-memory [`Backend`] for development servers and tests.
//!
//! Stores what it is given. Counters such as available days are not
//! recalculated when absences change.

use std::{
  future::Future,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
  Error, Result,
  absence::{AbsencePayload, NewAbsenceRequest},
  id::AbsenceId,
  store::Backend,
  worker::{Credential, NewWorker, Worker, WorkerUpdate},
};

#[derive(Debug, Default)]
struct State {
  workers:     Vec<Worker>,
  credentials: Vec<Credential>,
}

impl State {
  fn worker_mut(&mut self, id: &str) -> Result<&mut Worker> {
    self
      .workers
      .iter_mut()
      .find(|w| w.id == id)
      .ok_or_else(|| Error::WorkerNotFound(id.to_owned()))
  }

  /// Detach the absence stored under `id` from whichever worker owns it.
  fn take_absence(&mut self, id: &AbsenceId) -> Result<()> {
    for worker in &mut self.workers {
      for list in [&mut worker.vacations, &mut worker.off_days] {
        if let Some(pos) = list.iter().position(|a| &a.id == id) {
          list.remove(pos);
          return Ok(());
        }
      }
    }
    Err(Error::AbsenceNotFound(id.to_string()))
  }

  fn contains_absence(&self, id: &AbsenceId) -> bool {
    self.workers.iter().any(|w| w.find_absence(id).is_some())
  }

  /// Numeric identifiers, one past the highest in use.
  fn next_worker_id(&self) -> String {
    let highest = self
      .workers
      .iter()
      .filter_map(|w| w.id.parse::<u64>().ok())
      .max()
      .unwrap_or(0);
    (highest + 1).to_string()
  }
}

/// A [`Backend`] held entirely in process memory.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
  state: Arc<Mutex<State>>,
}

impl MemoryBackend {
  pub fn new() -> Self { Self::default() }

  pub fn with_workers(self, workers: Vec<Worker>) -> Self {
    self.lock().workers = workers;
    self
  }

  pub fn with_credentials(self, credentials: Vec<Credential>) -> Self {
    self.lock().credentials = credentials;
    self
  }

  /// Snapshot of the current roster.
  pub fn workers(&self) -> Vec<Worker> { self.lock().workers.clone() }

  fn lock(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl Backend for MemoryBackend {
  type Error = Error;

  fn credentials(
    &self,
  ) -> impl Future<Output = Result<Vec<Credential>>> + Send + '_ {
    let credentials = self.lock().credentials.clone();
    async move { Ok(credentials) }
  }

  fn list_workers(&self) -> impl Future<Output = Result<Vec<Worker>>> + Send + '_ {
    let workers = self.workers();
    async move { Ok(workers) }
  }

  fn create_absence(
    &self,
    request: NewAbsenceRequest,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    let result: Result<()> = (|| {
      let mut state = self.lock();
      let worker = state.worker_mut(&request.id)?;
      worker.absences_mut(request.kind).push(request.absence);
      Ok(())
    })();
    async move { result }
  }

  fn update_absence(
    &self,
    id: AbsenceId,
    payload: AbsencePayload,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    let result: Result<()> = (|| {
      let mut state = self.lock();
      if !state.contains_absence(&id) {
        return Err(Error::AbsenceNotFound(id.to_string()));
      }
      state.worker_mut(&payload.worker_id)?;
      state.take_absence(&id)?;
      state
        .worker_mut(&payload.worker_id)?
        .absences_mut(payload.kind)
        .push(payload.to_absence());
      Ok(())
    })();
    async move { result }
  }

  fn delete_absence(
    &self,
    id: AbsenceId,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    let result = self.lock().take_absence(&id);
    async move { result }
  }

  fn create_worker(
    &self,
    worker: NewWorker,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    let result = worker.validate().map(|()| {
      let mut state = self.lock();
      let id = state.next_worker_id();
      state.workers.push(worker.into_worker(id));
    });
    async move { result }
  }

  fn update_worker(
    &self,
    id: String,
    update: WorkerUpdate,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    let result = update.validate().and_then(|()| {
      let mut state = self.lock();
      update.apply(state.worker_mut(&id)?);
      Ok(())
    });
    async move { result }
  }

  fn delete_worker(&self, id: String) -> impl Future<Output = Result<()>> + Send + '_ {
    let result = {
      let mut state = self.lock();
      let before = state.workers.len();
      state.workers.retain(|w| w.id != id);
      if state.workers.len() == before {
        Err(Error::WorkerNotFound(id))
      } else {
        Ok(())
      }
    };
    async move { result }
  }
}
