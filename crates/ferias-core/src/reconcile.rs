//! Turning a filled-in absence form into a finalized record and submitting it.
//!
//! The [`Reconciler`] decides between the business-day and the elapsed-hour
//! representation, assigns the identifier, and sends the result to the
//! [`Backend`]. Transport failures are logged and returned to the caller
//! unchanged in meaning; nothing is retried and the form is left as it was.

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, error, info};

use crate::{
  Error, Result,
  absence::{Absence, AbsenceKind, AbsencePayload, Moment},
  business_days::BusinessDayCalculator,
  duration::{LunchBreak, absence_hours},
  holiday::HolidaySource,
  id::{AbsenceId, next_absence_id},
  store::Backend,
  worker::{Worker, find_absence, find_worker},
};

// ─── Form ────────────────────────────────────────────────────────────────────

/// Raw values collected by the absence form.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsenceForm {
  pub kind:        AbsenceKind,
  pub worker_id:   String,
  pub start_date:  NaiveDate,
  /// Vacations only; off-days always end on their start date.
  pub end_date:    Option<NaiveDate>,
  /// Off-days only; vacations are always whole days.
  pub all_day:     bool,
  /// Partial off-days; missing times read as midnight.
  pub start_time:  Option<NaiveTime>,
  pub end_time:    Option<NaiveTime>,
  /// Whether the partial interval spans the lunch break.
  pub lunch:       bool,
  /// Overrides the worker's configured lunch length.
  pub lunch_break: Option<LunchBreak>,
}

impl AbsenceForm {
  /// A whole-day form for a single date.
  pub fn new(kind: AbsenceKind, worker_id: impl Into<String>, start_date: NaiveDate) -> Self {
    Self {
      kind,
      worker_id: worker_id.into(),
      start_date,
      end_date: None,
      all_day: true,
      start_time: None,
      end_time: None,
      lunch: false,
      lunch_break: None,
    }
  }

  /// Pre-fill from a stored absence. Kind and owner come from the
  /// identifier, so the form can be built without the owner's record.
  pub fn from_absence(absence: &Absence) -> Self {
    let end = absence.end_or_start();
    Self {
      kind:        absence.id.kind(),
      worker_id:   absence.id.owner().to_owned(),
      start_date:  absence.start.date(),
      end_date:    Some(end.date()),
      all_day:     absence.all_day.unwrap_or(true),
      start_time:  absence.start.time(),
      end_time:    end.time(),
      lunch:       absence.lunch.unwrap_or(false),
      lunch_break: None,
    }
  }

  fn is_partial(&self) -> bool { self.kind == AbsenceKind::OffDay && !self.all_day }

  /// Dates formatted as `YYYY-MM-DD`, or `YYYY-MM-DDTHH:mm` for partial
  /// off-days.
  pub fn normalized_range(&self) -> Result<(Moment, Moment)> {
    let start_date = self.start_date;
    let end_date = match self.kind {
      AbsenceKind::Vacation => self.end_date.unwrap_or(start_date),
      AbsenceKind::OffDay => start_date,
    };
    if end_date < start_date {
      return Err(Error::InvalidRange {
        start: start_date.to_string(),
        end:   end_date.to_string(),
      });
    }
    if !self.is_partial() {
      return Ok((Moment::Date(start_date), Moment::Date(end_date)));
    }

    let start = start_date.and_time(self.start_time.unwrap_or(NaiveTime::MIN));
    let end = end_date.and_time(self.end_time.unwrap_or(NaiveTime::MIN));
    if end < start {
      return Err(Error::InvalidRange {
        start: Moment::DateTime(start).to_string(),
        end:   Moment::DateTime(end).to_string(),
      });
    }
    Ok((Moment::DateTime(start), Moment::DateTime(end)))
  }
}

/// Parse an `HH:mm` time of day as entered in the form.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s.trim(), "%H:%M")
    .map_err(|_| Error::InvalidTime(s.to_owned()))
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

/// Assembles absence records and submits them to a [`Backend`].
pub struct Reconciler<'a, H, B> {
  holidays: &'a H,
  backend:  &'a B,
}

impl<'a, H, B> Reconciler<'a, H, B>
where
  H: HolidaySource,
  B: Backend,
{
  pub fn new(holidays: &'a H, backend: &'a B) -> Self { Self { holidays, backend } }

  /// Build the outbound record for `form`.
  ///
  /// `previous` is the identifier of the absence being edited. It is kept
  /// when neither the type nor the owner changed; otherwise a fresh
  /// identifier is drawn for the new type and owner.
  pub async fn prepare(
    &self,
    form: &AbsenceForm,
    workers: &[Worker],
    previous: Option<&AbsenceId>,
  ) -> Result<AbsencePayload> {
    let worker = find_worker(workers, &form.worker_id)?;
    let (start, end) = form.normalized_range()?;

    // Only partial off-days normalise to timed moments.
    let (bus_days, abs_time) = match (form.kind, start, end) {
      (AbsenceKind::Vacation, ..) => {
        let calc = BusinessDayCalculator::new(self.holidays);
        (calc.count(start.date(), end.date()).await, 0.0)
      }
      (AbsenceKind::OffDay, Moment::DateTime(s), Moment::DateTime(e)) => {
        let lunch = match (form.lunch, form.lunch_break) {
          (false, _) => None,
          (true, Some(lunch)) => Some(lunch),
          (true, None) => Some(LunchBreak::from_hours(worker.lunch_deduction())?),
        };
        (0, absence_hours(s, e, lunch))
      }
      // Whole off-days are fixed at one day, not counted.
      (AbsenceKind::OffDay, ..) => (1, 0.0),
    };

    let id = match previous {
      Some(prev) if prev.kind() == form.kind && prev.owner() == worker.id => {
        prev.clone()
      }
      _ => next_absence_id(worker, form.kind)?,
    };

    let payload = AbsencePayload {
      id,
      worker_id: worker.id.clone(),
      kind: form.kind,
      start,
      end,
      all_day: form.kind == AbsenceKind::Vacation || form.all_day,
      bus_days,
      abs_time,
      lunch: form.is_partial() && form.lunch,
    };
    debug!(?payload, "prepared absence");
    Ok(payload)
  }

  /// `POST` a new absence.
  pub async fn create(
    &self,
    form: &AbsenceForm,
    workers: &[Worker],
  ) -> Result<AbsencePayload> {
    let payload = self.prepare(form, workers, None).await?;
    self
      .backend
      .create_absence(payload.to_request())
      .await
      .map_err(|e| transport("creating absence", e))?;
    info!(id = %payload.id, worker = %payload.worker_id, "absence created");
    Ok(payload)
  }

  /// `PATCH` the absence stored under `previous`.
  pub async fn update(
    &self,
    previous: &AbsenceId,
    form: &AbsenceForm,
    workers: &[Worker],
  ) -> Result<AbsencePayload> {
    let payload = self.prepare(form, workers, Some(previous)).await?;
    self
      .backend
      .update_absence(previous.clone(), payload.clone())
      .await
      .map_err(|e| transport("updating absence", e))?;
    if &payload.id != previous {
      info!(old = %previous, new = %payload.id, "absence re-identified");
    }
    info!(id = %payload.id, "absence updated");
    Ok(payload)
  }

  /// Create or update depending on whether the form edits an existing
  /// absence.
  pub async fn submit(
    &self,
    previous: Option<&AbsenceId>,
    form: &AbsenceForm,
    workers: &[Worker],
  ) -> Result<AbsencePayload> {
    match previous {
      Some(prev) => self.update(prev, form, workers).await,
      None => self.create(form, workers).await,
    }
  }

  /// Move an absence to new dates, as when it is dragged on the calendar.
  ///
  /// Type, identifier and any time-of-day window are kept. Vacations get
  /// their business days recounted; off-days stay on a single date.
  pub async fn reschedule(
    &self,
    id: &AbsenceId,
    start: NaiveDate,
    end: NaiveDate,
    workers: &[Worker],
  ) -> Result<AbsencePayload> {
    let (worker, absence) = find_absence(workers, id)?;
    let mut form = AbsenceForm::from_absence(absence);
    form.worker_id = worker.id.clone();
    form.start_date = start;
    form.end_date = Some(end);

    let mut payload = self.prepare(&form, workers, Some(id)).await?;
    if form.is_partial() {
      // Keep the recorded hours; the time window did not change.
      payload.abs_time = absence.abs_time.unwrap_or(payload.abs_time);
    }
    self
      .backend
      .update_absence(id.clone(), payload.clone())
      .await
      .map_err(|e| transport("rescheduling absence", e))?;
    info!(%id, %start, %end, "absence rescheduled");
    Ok(payload)
  }

  pub async fn delete(&self, id: &AbsenceId) -> Result<()> {
    self
      .backend
      .delete_absence(id.clone())
      .await
      .map_err(|e| transport("deleting absence", e))?;
    info!(%id, "absence deleted");
    Ok(())
  }
}

fn transport<E>(action: &str, e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  error!(error = %e, "{action} failed");
  Error::Backend(Box::new(e))
}
