//! Working-day arithmetic: Monday to Friday, minus public holidays.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::holiday::{HolidaySet, HolidaySource};

pub fn is_weekend(date: NaiveDate) -> bool {
  matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_holiday_or_weekend(date: NaiveDate, holidays: &HolidaySet) -> bool {
  is_weekend(date) || holidays.contains(date)
}

/// Working days in `start..=end`. An inverted range counts zero.
pub fn count_business_days(
  start: NaiveDate,
  end: NaiveDate,
  holidays: &HolidaySet,
) -> u32 {
  let count = start
    .iter_days()
    .take_while(|d| *d <= end)
    .filter(|d| !is_holiday_or_weekend(*d, holidays))
    .count();
  u32::try_from(count).unwrap_or(u32::MAX)
}

/// Shrink `start..=end` so both ends fall on working days. `None` if the
/// range holds no working day at all.
pub fn adjust_absence_period(
  start: NaiveDate,
  end: NaiveDate,
  holidays: &HolidaySet,
) -> Option<(NaiveDate, NaiveDate)> {
  let mut working = start
    .iter_days()
    .take_while(|d| *d <= end)
    .filter(|d| !is_holiday_or_weekend(*d, holidays));
  let first = working.next()?;
  let last = working.last().unwrap_or(first);
  Some((first, last))
}

/// Every calendar year the range touches.
pub fn years_touched(start: NaiveDate, end: NaiveDate) -> RangeInclusive<i32> {
  start.year()..=end.year().max(start.year())
}

// ─── Calculator ──────────────────────────────────────────────────────────────

/// Counts business days with holidays drawn from a [`HolidaySource`].
///
/// Holidays are fetched for every year the range touches, so a range that
/// crosses New Year excludes the later year's holidays too.
pub struct BusinessDayCalculator<'a, H> {
  source: &'a H,
}

impl<'a, H: HolidaySource> BusinessDayCalculator<'a, H> {
  pub fn new(source: &'a H) -> Self { Self { source } }

  /// All holidays in the years `start..=end` touches.
  pub async fn holidays_for(&self, start: NaiveDate, end: NaiveDate) -> HolidaySet {
    let mut set = HolidaySet::default();
    for year in years_touched(start, end) {
      set.extend(self.source.holidays(year).await);
    }
    set
  }

  pub async fn count(&self, start: NaiveDate, end: NaiveDate) -> u32 {
    let holidays = self.holidays_for(start, end).await;
    let days = count_business_days(start, end, &holidays);
    debug!(%start, %end, holidays = holidays.len(), days, "counted business days");
    days
  }

  pub async fn adjust(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Option<(NaiveDate, NaiveDate)> {
    let holidays = self.holidays_for(start, end).await;
    adjust_absence_period(start, end, &holidays)
  }
}
