//! Front-end mode: who is logged in and what is being edited.
//!
//! One value instead of a set of independent flags, so "editing an absence
//! while logged out" or "editing a worker and an absence at once" cannot be
//! represented.

use tracing::debug;

use crate::{
  Error, Result,
  absence::Absence,
  id::AbsenceId,
  reconcile::AbsenceForm,
  worker::{Credential, NewWorker, Worker, WorkerUpdate, authenticate},
};

/// The worker form being edited.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEditor {
  New(NewWorker),
  Existing { id: String, update: WorkerUpdate },
}

impl WorkerEditor {
  pub fn for_worker(worker: &Worker) -> Self {
    Self::Existing { id: worker.id.clone(), update: WorkerUpdate::default() }
  }
}

/// The absence form being edited, and the absence it edits, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsenceEditor {
  pub previous: Option<AbsenceId>,
  pub form:     AbsenceForm,
}

impl AbsenceEditor {
  pub fn new(form: AbsenceForm) -> Self { Self { previous: None, form } }

  /// Editor for an existing event, pre-filled from its record.
  pub fn for_absence(absence: &Absence) -> Self {
    Self {
      previous: Some(absence.id.clone()),
      form:     AbsenceForm::from_absence(absence),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Mode {
  #[default]
  LoggedOut,
  Idle,
  EditingWorker(WorkerEditor),
  EditingAbsence(AbsenceEditor),
}

impl Mode {
  pub fn is_logged_in(&self) -> bool { !matches!(self, Self::LoggedOut) }

  /// Check `username`/`password` against the fetched credential list.
  pub fn login(
    &mut self,
    credentials: &[Credential],
    username: &str,
    password: &str,
  ) -> Result<()> {
    if !authenticate(credentials, username, password) {
      return Err(Error::Unauthorized);
    }
    debug!(username, "logged in");
    if !self.is_logged_in() {
      *self = Self::Idle;
    }
    Ok(())
  }

  pub fn logout(&mut self) { *self = Self::LoggedOut; }

  /// Open a worker form, replacing any open editor.
  pub fn begin_worker(&mut self, editor: WorkerEditor) -> Result<()> {
    if !self.is_logged_in() {
      return Err(Error::Unauthorized);
    }
    *self = Self::EditingWorker(editor);
    Ok(())
  }

  /// Open an absence form, replacing any open editor.
  pub fn begin_absence(&mut self, editor: AbsenceEditor) -> Result<()> {
    if !self.is_logged_in() {
      return Err(Error::Unauthorized);
    }
    *self = Self::EditingAbsence(editor);
    Ok(())
  }

  pub fn absence_editor(&self) -> Option<&AbsenceEditor> {
    match self {
      Self::EditingAbsence(editor) => Some(editor),
      _ => None,
    }
  }

  pub fn worker_editor(&self) -> Option<&WorkerEditor> {
    match self {
      Self::EditingWorker(editor) => Some(editor),
      _ => None,
    }
  }

  /// Close the open editor and return to `Idle`. Yields the mode that was
  /// closed. Logged-out stays logged-out.
  pub fn finish(&mut self) -> Self {
    if !self.is_logged_in() {
      return Self::LoggedOut;
    }
    std::mem::replace(self, Self::Idle)
  }
}
