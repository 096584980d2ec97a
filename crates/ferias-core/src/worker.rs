//! Workers, their roster forms, and login credentials.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
  Error, Result,
  absence::{Absence, AbsenceKind},
  duration::{DEFAULT_LUNCH_HOURS, LunchBreak},
  id::AbsenceId,
};

// ─── Worker ──────────────────────────────────────────────────────────────────

/// One employee, with the absences they own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
  pub id:                 String,
  /// Display name.
  #[serde(rename = "title")]
  pub name:               String,
  #[serde(rename = "dep", default, skip_serializing_if = "Option::is_none")]
  pub department:         Option<String>,
  #[serde(default)]
  pub vacations:          Vec<Absence>,
  #[serde(default)]
  pub off_days:           Vec<Absence>,
  /// CSS colour used when rendering this worker's absences.
  pub color:              String,
  #[serde(rename = "avaDays", default)]
  pub available_days:     u32,
  #[serde(rename = "compH", default, skip_serializing_if = "Option::is_none")]
  pub compensatory_hours: Option<f64>,
  /// Lunch-break length deducted from partial absences that span it.
  #[serde(rename = "lunchH", default, skip_serializing_if = "Option::is_none")]
  pub lunch_hours:        Option<f64>,
}

impl Worker {
  /// A worker with no absences and all counters at zero.
  pub fn new(id: &str, name: &str, color: &str) -> Self {
    Self {
      id:                 id.to_owned(),
      name:               name.to_owned(),
      department:         None,
      vacations:          Vec::new(),
      off_days:           Vec::new(),
      color:              color.to_owned(),
      available_days:     0,
      compensatory_hours: None,
      lunch_hours:        None,
    }
  }

  pub fn absences(&self, kind: AbsenceKind) -> &[Absence] {
    match kind {
      AbsenceKind::Vacation => &self.vacations,
      AbsenceKind::OffDay => &self.off_days,
    }
  }

  pub fn absences_mut(&mut self, kind: AbsenceKind) -> &mut Vec<Absence> {
    match kind {
      AbsenceKind::Vacation => &mut self.vacations,
      AbsenceKind::OffDay => &mut self.off_days,
    }
  }

  /// Looks in both collections.
  pub fn find_absence(&self, id: &AbsenceId) -> Option<&Absence> {
    self
      .vacations
      .iter()
      .chain(&self.off_days)
      .find(|a| &a.id == id)
  }

  pub fn lunch_deduction(&self) -> f64 {
    self.lunch_hours.unwrap_or(DEFAULT_LUNCH_HOURS)
  }
}

pub fn find_worker<'a>(workers: &'a [Worker], id: &str) -> Result<&'a Worker> {
  workers
    .iter()
    .find(|w| w.id == id)
    .ok_or_else(|| Error::WorkerNotFound(id.to_owned()))
}

/// Locate an absence and its owner across the roster.
pub fn find_absence<'a>(
  workers: &'a [Worker],
  id: &AbsenceId,
) -> Result<(&'a Worker, &'a Absence)> {
  workers
    .iter()
    .find_map(|w| w.find_absence(id).map(|a| (w, a)))
    .ok_or_else(|| Error::AbsenceNotFound(id.to_string()))
}

/// Workers keyed by department; workers without one sort first under `None`.
pub fn group_by_department(
  workers: &[Worker],
) -> BTreeMap<Option<&str>, Vec<&Worker>> {
  let mut groups: BTreeMap<Option<&str>, Vec<&Worker>> = BTreeMap::new();
  for worker in workers {
    groups
      .entry(worker.department.as_deref())
      .or_default()
      .push(worker);
  }
  groups
}

// ─── Roster forms ────────────────────────────────────────────────────────────

/// `POST /api/novocolab` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorker {
  pub title:   String,
  pub dep:     String,
  pub color:   String,
  #[serde(rename = "avaDays")]
  pub ava_days: u32,
  #[serde(rename = "compH")]
  pub comp_h:   f64,
  #[serde(rename = "lunchH")]
  pub lunch_h:  f64,
}

impl Default for NewWorker {
  fn default() -> Self {
    Self {
      title:    String::new(),
      dep:      String::new(),
      color:    "#000000".to_owned(),
      ava_days: 0,
      comp_h:   0.0,
      lunch_h:  DEFAULT_LUNCH_HOURS,
    }
  }
}

impl NewWorker {
  /// Name and department are required; hour counters must be finite and
  /// non-negative.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::MissingField("title"));
    }
    if self.dep.trim().is_empty() {
      return Err(Error::MissingField("dep"));
    }
    check_hours(self.comp_h)?;
    LunchBreak::from_hours(self.lunch_h)?;
    Ok(())
  }

  pub fn into_worker(self, id: String) -> Worker {
    Worker {
      id,
      name: self.title,
      department: Some(self.dep),
      vacations: Vec::new(),
      off_days: Vec::new(),
      color: self.color,
      available_days: self.ava_days,
      compensatory_hours: Some(self.comp_h),
      lunch_hours: Some(self.lunch_h),
    }
  }
}

/// `PATCH /api/editarColab/:workerId` body. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dep:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub color:    Option<String>,
  #[serde(rename = "avaDays", default, skip_serializing_if = "Option::is_none")]
  pub ava_days: Option<u32>,
  #[serde(rename = "compH", default, skip_serializing_if = "Option::is_none")]
  pub comp_h:   Option<f64>,
  #[serde(rename = "lunchH", default, skip_serializing_if = "Option::is_none")]
  pub lunch_h:  Option<f64>,
}

impl WorkerUpdate {
  pub fn is_empty(&self) -> bool { self == &Self::default() }

  /// Present fields follow the same rules as [`NewWorker::validate`].
  pub fn validate(&self) -> Result<()> {
    if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
      return Err(Error::MissingField("title"));
    }
    if self.dep.as_deref().is_some_and(|d| d.trim().is_empty()) {
      return Err(Error::MissingField("dep"));
    }
    if let Some(hours) = self.comp_h {
      check_hours(hours)?;
    }
    if let Some(hours) = self.lunch_h {
      LunchBreak::from_hours(hours)?;
    }
    Ok(())
  }

  pub fn apply(&self, worker: &mut Worker) {
    if let Some(title) = &self.title {
      worker.name = title.clone();
    }
    if let Some(dep) = &self.dep {
      worker.department = Some(dep.clone());
    }
    if let Some(color) = &self.color {
      worker.color = color.clone();
    }
    if let Some(days) = self.ava_days {
      worker.available_days = days;
    }
    if let Some(hours) = self.comp_h {
      worker.compensatory_hours = Some(hours);
    }
    if let Some(hours) = self.lunch_h {
      worker.lunch_hours = Some(hours);
    }
  }
}

fn check_hours(hours: f64) -> Result<()> {
  if hours.is_finite() && hours >= 0.0 {
    Ok(())
  } else {
    Err(Error::InvalidHours(hours.to_string()))
  }
}

// ─── Allowance levels ────────────────────────────────────────────────────────

/// Traffic-light rating shown next to a worker's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AllowanceLevel {
  Red,
  Orange,
  Yellow,
  Green,
}

impl AllowanceLevel {
  /// Fewer remaining vacation days is worse.
  pub fn for_available_days(days: u32) -> Self {
    match days {
      0..5 => Self::Red,
      5..10 => Self::Orange,
      10..15 => Self::Yellow,
      _ => Self::Green,
    }
  }

  /// More accumulated compensatory hours is worse.
  pub fn for_compensatory_hours(hours: f64) -> Self {
    if hours < 3.0 {
      Self::Green
    } else if hours < 5.0 {
      Self::Yellow
    } else if hours < 8.0 {
      Self::Orange
    } else {
      Self::Red
    }
  }
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// A login entry from `GET /api/getloginferias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
  pub username: String,
  pub password: String,
}

/// Plaintext comparison against the fetched list.
pub fn authenticate(credentials: &[Credential], username: &str, password: &str) -> bool {
  credentials
    .iter()
    .any(|c| c.username == username && c.password == password)
}
