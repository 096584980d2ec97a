//! Public holidays and the [`HolidaySource`] trait.
//!
//! Holiday data is advisory. A source that cannot reach its upstream returns
//! an empty list, so missing holiday data never blocks day counting; it only
//! makes the count less accurate (every weekday counts as a working day).

use std::{
  collections::{BTreeMap, BTreeSet},
  future::Future,
};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Title used when the upstream event has no name in the requested language.
pub const FALLBACK_TITLE: &str = "Holiday";

/// A normalised public holiday. Read-only; refetched per calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEvent {
  pub id:    String,
  pub title: String,
  pub start: NaiveDate,
  /// Inclusive; equal to `start` for single-day holidays.
  pub end:   NaiveDate,
}

impl HolidayEvent {
  pub fn covers(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }

  pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
    self.start.iter_days().take_while(|d| *d <= self.end)
  }
}

/// Calendar dates that are holidays, for fast membership checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet(BTreeSet<NaiveDate>);

impl HolidaySet {
  pub fn contains(&self, date: NaiveDate) -> bool { self.0.contains(&date) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<'a> FromIterator<&'a HolidayEvent> for HolidaySet {
  fn from_iter<I: IntoIterator<Item = &'a HolidayEvent>>(iter: I) -> Self {
    Self(iter.into_iter().flat_map(HolidayEvent::days).collect())
  }
}

impl Extend<HolidayEvent> for HolidaySet {
  fn extend<I: IntoIterator<Item = HolidayEvent>>(&mut self, iter: I) {
    for event in iter {
      self.0.extend(event.days());
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Supplies the public holidays of a calendar year.
///
/// Implementations never fail: on any upstream error they log and return an
/// empty list.
pub trait HolidaySource: Send + Sync {
  fn holidays(
    &self,
    year: i32,
  ) -> impl Future<Output = Vec<HolidayEvent>> + Send + '_;
}

/// A fixed set of holidays held in memory, grouped by the year they start in.
#[derive(Debug, Clone, Default)]
pub struct StaticHolidays {
  by_year: BTreeMap<i32, Vec<HolidayEvent>>,
}

impl StaticHolidays {
  pub fn new(events: impl IntoIterator<Item = HolidayEvent>) -> Self {
    let mut by_year: BTreeMap<i32, Vec<HolidayEvent>> = BTreeMap::new();
    for event in events {
      by_year.entry(event.start.year()).or_default().push(event);
    }
    Self { by_year }
  }

  /// No holidays at all.
  pub fn none() -> Self { Self::default() }
}

impl HolidaySource for StaticHolidays {
  fn holidays(
    &self,
    year: i32,
  ) -> impl Future<Output = Vec<HolidayEvent>> + Send + '_ {
    let events = self.by_year.get(&year).cloned().unwrap_or_default();
    async move { events }
  }
}
