//! Absence records: the vacations and off-days owned by a worker.
//!
//! The wire shape mirrors what the backend stores: a flat record whose
//! type-specific fields are optional. [`AbsencePayload`] is the fully
//! populated record the reconciler assembles before it is sent.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result, id::AbsenceId};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The type discriminator of an absence.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AbsenceKind {
  Vacation,
  OffDay,
}

impl AbsenceKind {
  /// The numeric segment embedded in an [`AbsenceId`].
  pub fn type_code(self) -> u8 {
    match self {
      Self::Vacation => 1,
      Self::OffDay => 2,
    }
  }

  /// Decode a type code. Anything other than `1` is an off-day.
  pub fn from_type_code(code: &str) -> Self {
    if code == "1" { Self::Vacation } else { Self::OffDay }
  }

  /// Portuguese label used in calendar titles.
  pub fn label(self) -> &'static str {
    match self {
      Self::Vacation => "Férias",
      Self::OffDay => "Ausência",
    }
  }
}

// ─── Moment ──────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// A calendar date, or a date with a time of day for partial off-days.
///
/// Serialised as `YYYY-MM-DD` or `YYYY-MM-DDTHH:mm`. Parsing also accepts
/// seconds, fractional seconds and RFC 3339 offsets; the wall-clock value is
/// kept as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Moment {
  Date(NaiveDate),
  DateTime(NaiveDateTime),
}

impl Moment {
  /// The calendar date, ignoring any time of day.
  pub fn date(&self) -> NaiveDate {
    match self {
      Self::Date(d) => *d,
      Self::DateTime(dt) => dt.date(),
    }
  }

  pub fn time(&self) -> Option<NaiveTime> {
    match self {
      Self::Date(_) => None,
      Self::DateTime(dt) => Some(dt.time()),
    }
  }

  pub fn is_timed(&self) -> bool { matches!(self, Self::DateTime(_)) }

  /// The same time of day (if any) moved to `date`.
  pub fn with_date(&self, date: NaiveDate) -> Self {
    match self {
      Self::Date(_) => Self::Date(date),
      Self::DateTime(dt) => Self::DateTime(date.and_time(dt.time())),
    }
  }
}

impl fmt::Display for Moment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
      Self::DateTime(dt) => write!(f, "{}", dt.format(DATE_TIME_FORMAT)),
    }
  }
}

impl FromStr for Moment {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
      return Ok(Self::Date(d));
    }
    for format in [DATE_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
    {
      if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
        return Ok(Self::DateTime(dt));
      }
    }
    DateTime::parse_from_rfc3339(s)
      .map(|dt| Self::DateTime(dt.naive_local()))
      .map_err(|_| Error::InvalidDate(s.to_owned()))
  }
}

impl From<NaiveDate> for Moment {
  fn from(d: NaiveDate) -> Self { Self::Date(d) }
}

impl From<NaiveDateTime> for Moment {
  fn from(dt: NaiveDateTime) -> Self { Self::DateTime(dt) }
}

impl Serialize for Moment {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Moment {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
  }
}

// ─── Absence ─────────────────────────────────────────────────────────────────

/// One vacation or off-day interval as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
  pub id:       AbsenceId,
  pub start:    Moment,
  /// Defaults to `start` for single-day events.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end:      Option<Moment>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bus_days: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub all_day:  Option<bool>,
  /// Elapsed absence hours for partial off-days.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub abs_time: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lunch:    Option<bool>,
}

/// How long an absence lasts, by type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbsenceDuration {
  BusinessDays(u32),
  Hours { hours: f64, lunch: bool },
}

impl Absence {
  pub fn end_or_start(&self) -> Moment { self.end.unwrap_or(self.start) }

  /// The type, as encoded in the identifier.
  pub fn kind(&self) -> AbsenceKind { self.id.kind() }

  /// Partial off-days carry hours; everything else counts business days.
  pub fn duration(&self) -> AbsenceDuration {
    if self.kind() == AbsenceKind::OffDay && self.all_day == Some(false) {
      AbsenceDuration::Hours {
        hours: self.abs_time.unwrap_or(0.0),
        lunch: self.lunch.unwrap_or(false),
      }
    } else {
      AbsenceDuration::BusinessDays(self.bus_days.unwrap_or(0))
    }
  }
}

// ─── Outbound payloads ───────────────────────────────────────────────────────

/// The finalized record assembled by the reconciler. Also the `PATCH`
/// body for `/api/editferias/:eventId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsencePayload {
  pub id:        AbsenceId,
  pub worker_id: String,
  #[serde(rename = "type")]
  pub kind:      AbsenceKind,
  pub start:     Moment,
  pub end:       Moment,
  pub all_day:   bool,
  pub bus_days:  u32,
  pub abs_time:  f64,
  pub lunch:     bool,
}

impl AbsencePayload {
  /// The stored record. Only the fields meaningful for the type are set.
  pub fn to_absence(&self) -> Absence {
    let mut absence = Absence {
      id:       self.id.clone(),
      start:    self.start,
      end:      Some(self.end),
      bus_days: None,
      all_day:  None,
      abs_time: None,
      lunch:    None,
    };
    match self.kind {
      AbsenceKind::Vacation => absence.bus_days = Some(self.bus_days),
      AbsenceKind::OffDay => {
        absence.all_day = Some(self.all_day);
        if self.all_day {
          absence.bus_days = Some(1);
        } else {
          absence.abs_time = Some(self.abs_time);
          absence.lunch = Some(self.lunch);
        }
      }
    }
    absence
  }

  /// The `POST /api/postferias` body.
  pub fn to_request(&self) -> NewAbsenceRequest {
    NewAbsenceRequest {
      id:      self.worker_id.clone(),
      absence: self.to_absence(),
      kind:    self.kind,
    }
  }
}

/// `POST /api/postferias` body: `{ id: workerId, absence: {...}, type }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAbsenceRequest {
  /// The owning worker's identifier.
  pub id:      String,
  pub absence: Absence,
  #[serde(rename = "type")]
  pub kind:    AbsenceKind,
}
