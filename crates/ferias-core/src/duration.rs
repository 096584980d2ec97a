//! Elapsed-hour accounting for partial-day absences.

use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::{Error, Result};

pub const DEFAULT_LUNCH_HOURS: f64 = 1.0;

/// Elapsed time in hours, fractional (09:00 → 16:30 is 7.5).
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
  (end - start).num_milliseconds() as f64 / 3_600_000.0
}

/// Remove a lunch break from `hours`, never going below zero.
pub fn deduct_lunch(hours: f64, lunch: LunchBreak) -> f64 {
  (hours - lunch.hours()).max(0.0)
}

/// Hours absent between `start` and `end`, less `lunch` when the interval
/// spans the break.
pub fn absence_hours(
  start: NaiveDateTime,
  end: NaiveDateTime,
  lunch: Option<LunchBreak>,
) -> f64 {
  let hours = hours_between(start, end);
  match lunch {
    Some(lunch) => deduct_lunch(hours, lunch),
    None => hours,
  }
}

// ─── LunchBreak ──────────────────────────────────────────────────────────────

/// A non-negative lunch-break length in hours.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LunchBreak(f64);

impl LunchBreak {
  pub fn from_hours(hours: f64) -> Result<Self> {
    if hours.is_finite() && hours >= 0.0 {
      Ok(Self(hours))
    } else {
      Err(Error::InvalidLunch(hours.to_string()))
    }
  }

  pub fn hours(self) -> f64 { self.0 }
}

impl Default for LunchBreak {
  fn default() -> Self { Self(DEFAULT_LUNCH_HOURS) }
}

impl FromStr for LunchBreak {
  type Err = Error;

  /// Accepts decimal hours (`"1"`, `"1.5"`) or `H:MM` (`"1:30"`).
  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    let invalid = || Error::InvalidLunch(s.to_owned());
    let hours = match s.split_once(':') {
      Some((h, m)) => {
        let h: u32 = h.parse().map_err(|_| invalid())?;
        let m: u32 = m.parse().map_err(|_| invalid())?;
        if m >= 60 {
          return Err(invalid());
        }
        f64::from(h) + f64::from(m) / 60.0
      }
      None => s.parse().map_err(|_| invalid())?,
    };
    Self::from_hours(hours).map_err(|_| invalid())
  }
}
