//! Composite absence identifiers.
//!
//! Format (version 1): `{workerId}-{typeCode}-{sequence}`, where `typeCode` is
//! `1` for vacations and `2` for off-days, and `sequence` counts up from 1 per
//! worker and type. The owner and type of an absence can be read from its
//! identifier alone.
//!
//! Changing the delimiter or the segment order breaks every stored record;
//! bump [`FORMAT_VERSION`] if that ever happens. Worker identifiers must not
//! contain the delimiter, or the owner no longer round-trips.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, absence::AbsenceKind, worker::Worker};

pub const FORMAT_VERSION: u32 = 1;
pub const DELIMITER: char = '-';

/// An absence identifier. Holds the raw string so that malformed identifiers
/// coming from the backend survive a round trip untouched.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AbsenceId(String);

impl AbsenceId {
  pub fn new(owner: &str, kind: AbsenceKind, sequence: u32) -> Self {
    Self(format!(
      "{owner}{DELIMITER}{}{DELIMITER}{sequence}",
      kind.type_code()
    ))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn kind(&self) -> AbsenceKind { parse_type(&self.0) }

  pub fn owner(&self) -> &str { parse_owner(&self.0) }

  /// The numeric suffix; `0` when the identifier is not exactly three
  /// segments or the suffix is not a number.
  pub fn sequence(&self) -> u32 {
    let parts: Vec<&str> = self.0.split(DELIMITER).collect();
    match parts.as_slice() {
      [_, _, seq] => seq.parse().unwrap_or(0),
      _ => 0,
    }
  }
}

impl fmt::Display for AbsenceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<String> for AbsenceId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for AbsenceId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl AsRef<str> for AbsenceId {
  fn as_ref(&self) -> &str { &self.0 }
}

/// The next identifier for a new absence of `kind` owned by `worker`:
/// one past the highest sequence among the worker's absences of that kind.
///
/// Fails with [`Error::SequenceExhausted`] once that sequence reaches
/// `u32::MAX`.
pub fn next_absence_id(worker: &Worker, kind: AbsenceKind) -> Result<AbsenceId> {
  let highest = worker
    .absences(kind)
    .iter()
    .map(|a| a.id.sequence())
    .max()
    .unwrap_or(0);
  let next = highest.checked_add(1).ok_or_else(|| Error::SequenceExhausted {
    owner: worker.id.clone(),
    kind:  kind.type_code().to_string(),
  })?;
  Ok(AbsenceId::new(&worker.id, kind, next))
}

/// Decode the type from the middle segment. Unknown codes are off-days.
pub fn parse_type(id: &str) -> AbsenceKind {
  AbsenceKind::from_type_code(id.split(DELIMITER).nth(1).unwrap_or_default())
}

/// The first segment, verbatim.
pub fn parse_owner(id: &str) -> &str {
  id.split(DELIMITER).next().unwrap_or_default()
}
