//! Display events for the calendar view. Derived, never stored.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
  absence::{Absence, AbsenceKind, Moment},
  holiday::HolidayEvent,
  id::AbsenceId,
  worker::Worker,
};

pub const HOLIDAY_BACKGROUND: &str = "rgba(255,0,0,0.3)";
pub const HOLIDAY_TEXT: &str = "black";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventDisplay {
  /// A regular, interactive event.
  Block,
  /// A non-interactive overlay behind the day cells.
  Background,
}

/// A flattened absence or holiday with rendering hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
  pub id:               String,
  pub title:            String,
  pub event_id:         String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub worker_id:        Option<String>,
  /// `None` for holidays.
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind:             Option<AbsenceKind>,
  pub start:            Moment,
  pub end:              Moment,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub border_color:     Option<String>,
  pub background_color: String,
  pub text_color:       String,
  pub display:          EventDisplay,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub all_day:          Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bus_days:         Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub abs_time:         Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lunch:            Option<bool>,
}

impl CalendarEvent {
  pub fn from_absence(worker: &Worker, absence: &Absence) -> Self {
    let kind = absence.kind();
    Self {
      id:               absence.id.to_string(),
      title:            format!("{} ({})", worker.name, kind.label()),
      event_id:         absence.id.to_string(),
      worker_id:        Some(worker.id.clone()),
      kind:             Some(kind),
      start:            absence.start,
      end:              absence.end_or_start(),
      border_color:     Some(worker.color.clone()),
      background_color: worker.color.clone(),
      text_color:       "auto".to_owned(),
      display:          EventDisplay::Block,
      all_day:          match kind {
        AbsenceKind::Vacation => Some(true),
        AbsenceKind::OffDay => absence.all_day,
      },
      bus_days:         absence.bus_days,
      abs_time:         absence.abs_time,
      lunch:            absence.lunch,
    }
  }

  pub fn from_holiday(holiday: &HolidayEvent) -> Self {
    Self {
      id:               holiday.id.clone(),
      title:            holiday.title.clone(),
      event_id:         holiday.id.clone(),
      worker_id:        None,
      kind:             None,
      start:            Moment::Date(holiday.start),
      end:              Moment::Date(holiday.end),
      border_color:     None,
      background_color: HOLIDAY_BACKGROUND.to_owned(),
      text_color:       HOLIDAY_TEXT.to_owned(),
      display:          EventDisplay::Background,
      all_day:          Some(true),
      bus_days:         None,
      abs_time:         None,
      lunch:            None,
    }
  }

  pub fn is_holiday(&self) -> bool { self.display == EventDisplay::Background }

  /// The absence identifier, for holidays `None`.
  pub fn absence_id(&self) -> Option<AbsenceId> {
    self.kind.map(|_| AbsenceId::from(self.event_id.as_str()))
  }

  /// Exclusive end date as the calendar widget expects: whole-day events
  /// end the day after their last day.
  pub fn display_end(&self) -> NaiveDate {
    let last = self.end.date();
    if self.end.is_timed() {
      last
    } else {
      last.checked_add_days(Days::new(1)).unwrap_or(last)
    }
  }

  /// Whether the event touches `year`.
  pub fn in_year(&self, year: i32) -> bool {
    self.start.date().year() <= year && year <= self.end.date().year()
  }
}

/// Every absence of every worker, then every holiday.
pub fn project_events(workers: &[Worker], holidays: &[HolidayEvent]) -> Vec<CalendarEvent> {
  let vacations = workers
    .iter()
    .flat_map(|w| w.vacations.iter().map(move |a| CalendarEvent::from_absence(w, a)));
  let off_days = workers
    .iter()
    .flat_map(|w| w.off_days.iter().map(move |a| CalendarEvent::from_absence(w, a)));
  vacations
    .chain(off_days)
    .chain(holidays.iter().map(CalendarEvent::from_holiday))
    .collect()
}

/// Absence events by identifier.
pub fn find_event<'a>(events: &'a [CalendarEvent], event_id: &str) -> Option<&'a CalendarEvent> {
  events
    .iter()
    .find(|e| !e.is_holiday() && e.event_id == event_id)
}
