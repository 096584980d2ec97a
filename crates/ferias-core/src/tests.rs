//! Reconciler tests against the in-memory backend.

use std::future::Future;

use chrono::{NaiveDate, NaiveTime};

use crate::{
  Error,
  absence::{AbsenceKind, AbsencePayload, Moment, NewAbsenceRequest},
  duration::LunchBreak,
  holiday::{HolidayEvent, StaticHolidays},
  id::AbsenceId,
  memory::MemoryBackend,
  mode::{AbsenceEditor, Mode},
  reconcile::{AbsenceForm, Reconciler},
  store::Backend,
  worker::{Credential, NewWorker, Worker, WorkerUpdate},
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, 0).unwrap() }

fn backend() -> MemoryBackend {
  MemoryBackend::new().with_workers(vec![
    Worker::new("W1", "Ana Sousa", "#228be6"),
    Worker::new("W2", "Rui Melo", "#fa5252"),
  ])
}

fn vacation(start: NaiveDate, end: NaiveDate) -> AbsenceForm {
  let mut form = AbsenceForm::new(AbsenceKind::Vacation, "W1", start);
  form.end_date = Some(end);
  form
}

fn partial(day: NaiveDate, from: NaiveTime, to: NaiveTime, lunch: bool) -> AbsenceForm {
  let mut form = AbsenceForm::new(AbsenceKind::OffDay, "W1", day);
  form.all_day = false;
  form.start_time = Some(from);
  form.end_time = Some(to);
  form.lunch = lunch;
  form
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_vacation_counts_business_days() {
  let store = backend();
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);

  let workers = store.list_workers().await.unwrap();
  let payload = rec
    .create(&vacation(date(2024, 7, 1), date(2024, 7, 5)), &workers)
    .await
    .unwrap();

  assert_eq!(payload.id.as_str(), "W1-1-1");
  assert_eq!(payload.bus_days, 5);
  assert!(payload.all_day);

  let workers = store.list_workers().await.unwrap();
  assert_eq!(workers[0].vacations.len(), 1);
  assert_eq!(workers[0].vacations[0].bus_days, Some(5));
  assert_eq!(workers[0].vacations[0].start, Moment::Date(date(2024, 7, 1)));
}

#[tokio::test]
async fn holidays_reduce_vacation_days() {
  let store = backend();
  let holidays = StaticHolidays::new([HolidayEvent {
    id:    "2024-06-10".into(),
    title: "Dia de Portugal".into(),
    start: date(2024, 6, 10),
    end:   date(2024, 6, 10),
  }]);
  let rec = Reconciler::new(&holidays, &store);
  let workers = store.list_workers().await.unwrap();

  let payload = rec
    .create(&vacation(date(2024, 6, 10), date(2024, 6, 14)), &workers)
    .await
    .unwrap();
  assert_eq!(payload.bus_days, 4);
}

#[tokio::test]
async fn sequences_are_independent_per_type() {
  let store = backend();
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);

  let workers = store.list_workers().await.unwrap();
  let v = rec
    .create(&vacation(date(2024, 7, 1), date(2024, 7, 1)), &workers)
    .await
    .unwrap();
  let workers = store.list_workers().await.unwrap();
  let o = rec
    .create(&AbsenceForm::new(AbsenceKind::OffDay, "W1", date(2024, 7, 8)), &workers)
    .await
    .unwrap();

  assert_eq!(v.id.as_str(), "W1-1-1");
  assert_eq!(o.id.as_str(), "W1-2-1");
  assert_eq!(o.bus_days, 1);
}

#[tokio::test]
async fn sequential_creates_increment_after_refetch() {
  let store = backend();
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  let form = vacation(date(2024, 8, 5), date(2024, 8, 9));

  let first = rec.create(&form, &store.list_workers().await.unwrap()).await.unwrap();
  let second = rec.create(&form, &store.list_workers().await.unwrap()).await.unwrap();
  assert_eq!(second.id.sequence(), first.id.sequence() + 1);
}

#[tokio::test]
async fn partial_off_day_deducts_lunch() {
  let store = backend();
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  let workers = store.list_workers().await.unwrap();

  let payload = rec
    .create(&partial(date(2024, 1, 2), time(9, 0), time(17, 0), true), &workers)
    .await
    .unwrap();
  assert_eq!(payload.abs_time, 7.0);
  assert_eq!(payload.bus_days, 0);
  assert!(!payload.all_day);
  assert!(payload.lunch);
  assert_eq!(payload.start.to_string(), "2024-01-02T09:00");

  let workers = store.workers();
  let stored = &workers[0].off_days[0];
  assert_eq!(stored.all_day, Some(false));
  assert_eq!(stored.abs_time, Some(7.0));
}

#[tokio::test]
async fn lunch_length_comes_from_worker_or_form() {
  let store = MemoryBackend::new().with_workers(vec![Worker {
    lunch_hours: Some(1.5),
    ..Worker::new("W1", "Ana Sousa", "#228be6")
  }]);
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  let workers = store.list_workers().await.unwrap();

  let mut form = partial(date(2024, 1, 2), time(9, 0), time(17, 0), true);
  let from_worker = rec.prepare(&form, &workers, None).await.unwrap();
  assert_eq!(from_worker.abs_time, 6.5);

  form.lunch_break = Some("0:30".parse::<LunchBreak>().unwrap());
  let from_form = rec.prepare(&form, &workers, None).await.unwrap();
  assert_eq!(from_form.abs_time, 7.5);

  let short = partial(date(2024, 1, 2), time(12, 0), time(12, 45), true);
  assert_eq!(rec.prepare(&short, &workers, None).await.unwrap().abs_time, 0.0);
}

#[tokio::test]
async fn stored_negative_lunch_is_an_error() {
  let store = MemoryBackend::new().with_workers(vec![Worker {
    lunch_hours: Some(-2.0),
    ..Worker::new("W1", "Ana Sousa", "#228be6")
  }]);
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  let workers = store.list_workers().await.unwrap();

  let form = partial(date(2024, 1, 2), time(9, 0), time(17, 0), true);
  let err = rec.prepare(&form, &workers, None).await.unwrap_err();
  assert!(matches!(err, Error::InvalidLunch(_)));

  let no_lunch = partial(date(2024, 1, 2), time(9, 0), time(17, 0), false);
  assert_eq!(rec.prepare(&no_lunch, &workers, None).await.unwrap().abs_time, 8.0);
}

#[tokio::test]
async fn exhausted_sequence_fails_before_submission() {
  let store = seeded().await;
  let mut workers = store.workers();
  workers[0].vacations[1].id = "W1-1-4294967295".into();
  let store = MemoryBackend::new().with_workers(workers);
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);

  let form = vacation(date(2024, 2, 5), date(2024, 2, 6));
  let err = rec.create(&form, &store.workers()).await.unwrap_err();
  assert!(matches!(err, Error::SequenceExhausted { .. }));
  assert_eq!(store.workers()[0].vacations.len(), 2);
}

#[tokio::test]
async fn unknown_worker_is_rejected_before_submission() {
  let store = backend();
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  let workers = store.list_workers().await.unwrap();

  let form = AbsenceForm::new(AbsenceKind::Vacation, "W9", date(2024, 7, 1));
  let err = rec.create(&form, &workers).await.unwrap_err();
  assert!(matches!(err, Error::WorkerNotFound(id) if id == "W9"));
  assert!(store.workers().iter().all(|w| w.vacations.is_empty()));
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// W1 with off-days 1..=3 and vacations 1..=2.
async fn seeded() -> MemoryBackend {
  let store = backend();
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  for day in [8, 9, 10] {
    let form = AbsenceForm::new(AbsenceKind::OffDay, "W1", date(2024, 1, day));
    rec.create(&form, &store.workers()).await.unwrap();
  }
  for day in [15, 22] {
    let form = vacation(date(2024, 1, day), date(2024, 1, day + 1));
    rec.create(&form, &store.workers()).await.unwrap();
  }
  store
}

#[tokio::test]
async fn type_change_regenerates_identifier() {
  let store = seeded().await;
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  let old: AbsenceId = "W1-2-3".into();

  let form = vacation(date(2024, 1, 10), date(2024, 1, 12));
  let payload = rec.update(&old, &form, &store.workers()).await.unwrap();

  assert_eq!(payload.id.as_str(), "W1-1-3");
  assert_eq!(payload.kind, AbsenceKind::Vacation);
  assert_eq!(payload.bus_days, 3);

  let workers = store.workers();
  let w1 = &workers[0];
  assert!(w1.find_absence(&old).is_none());
  assert!(w1.find_absence(&payload.id).is_some());
  assert_eq!(w1.off_days.len(), 2);
  assert_eq!(w1.vacations.len(), 3);
}

#[tokio::test]
async fn same_type_edit_keeps_identifier() {
  let store = seeded().await;
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  let id: AbsenceId = "W1-1-1".into();

  let form = vacation(date(2024, 1, 15), date(2024, 1, 19));
  let payload = rec.update(&id, &form, &store.workers()).await.unwrap();
  assert_eq!(payload.id, id);
  assert_eq!(store.workers()[0].find_absence(&id).unwrap().bus_days, Some(5));
}

#[tokio::test]
async fn owner_change_regenerates_identifier() {
  let store = seeded().await;
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  let id: AbsenceId = "W1-1-2".into();

  let mut form = vacation(date(2024, 1, 22), date(2024, 1, 23));
  form.worker_id = "W2".into();
  let payload = rec.update(&id, &form, &store.workers()).await.unwrap();
  assert_eq!(payload.id.as_str(), "W2-1-1");

  let workers = store.workers();
  assert_eq!(workers[0].vacations.len(), 1);
  assert_eq!(workers[1].vacations.len(), 1);
}

#[tokio::test]
async fn editor_round_trip_through_mode() {
  let store = seeded().await.with_credentials(vec![Credential {
    username: "admin".into(),
    password: "secret".into(),
  }]);
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);

  let mut mode = Mode::default();
  mode
    .login(&store.credentials().await.unwrap(), "admin", "secret")
    .unwrap();

  let workers = store.workers();
  let existing = workers[0].find_absence(&"W1-2-1".into()).unwrap();
  let mut editor = AbsenceEditor::for_absence(existing);
  editor.form.all_day = false;
  editor.form.start_time = Some(time(14, 0));
  editor.form.end_time = Some(time(18, 0));
  mode.begin_absence(editor).unwrap();

  let editor = mode.absence_editor().unwrap();
  let payload = rec
    .submit(editor.previous.as_ref(), &editor.form, &workers)
    .await
    .unwrap();
  mode.finish();

  assert_eq!(payload.id.as_str(), "W1-2-1");
  assert_eq!(payload.abs_time, 4.0);
  assert_eq!(mode, Mode::Idle);
}

// ─── Reschedule / delete ─────────────────────────────────────────────────────

#[tokio::test]
async fn reschedule_recounts_vacation_days() {
  let store = seeded().await;
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  let id: AbsenceId = "W1-1-1".into();

  // Fri 2 Feb .. Tue 6 Feb 2024.
  let payload = rec
    .reschedule(&id, date(2024, 2, 2), date(2024, 2, 6), &store.workers())
    .await
    .unwrap();
  assert_eq!(payload.id, id);
  assert_eq!(payload.bus_days, 3);
}

#[tokio::test]
async fn reschedule_keeps_partial_hours_on_one_date() {
  let store = backend();
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  let created = rec
    .create(&partial(date(2024, 3, 4), time(9, 0), time(11, 30), false), &store.workers())
    .await
    .unwrap();

  let moved = rec
    .reschedule(&created.id, date(2024, 3, 6), date(2024, 3, 8), &store.workers())
    .await
    .unwrap();
  assert_eq!(moved.start.to_string(), "2024-03-06T09:00");
  assert_eq!(moved.end.to_string(), "2024-03-06T11:30");
  assert_eq!(moved.abs_time, 2.5);
}

#[tokio::test]
async fn delete_removes_and_second_delete_fails() {
  let store = seeded().await;
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &store);
  let id: AbsenceId = "W1-2-2".into();

  rec.delete(&id).await.unwrap();
  assert!(store.workers()[0].find_absence(&id).is_none());
  assert!(matches!(rec.delete(&id).await, Err(Error::Backend(_))));
}

// ─── Transport failure ───────────────────────────────────────────────────────

struct Unreachable;

fn refused<T>() -> std::io::Result<T> {
  Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"))
}

impl Backend for Unreachable {
  type Error = std::io::Error;

  fn credentials(&self) -> impl Future<Output = std::io::Result<Vec<Credential>>> + Send + '_ {
    async { refused() }
  }

  fn list_workers(&self) -> impl Future<Output = std::io::Result<Vec<Worker>>> + Send + '_ {
    async { refused() }
  }

  fn create_absence(
    &self,
    _request: NewAbsenceRequest,
  ) -> impl Future<Output = std::io::Result<()>> + Send + '_ {
    async { refused() }
  }

  fn update_absence(
    &self,
    _id: AbsenceId,
    _payload: AbsencePayload,
  ) -> impl Future<Output = std::io::Result<()>> + Send + '_ {
    async { refused() }
  }

  fn delete_absence(&self, _id: AbsenceId) -> impl Future<Output = std::io::Result<()>> + Send + '_ {
    async { refused() }
  }

  fn create_worker(&self, _worker: NewWorker) -> impl Future<Output = std::io::Result<()>> + Send + '_ {
    async { refused() }
  }

  fn update_worker(
    &self,
    _id: String,
    _update: WorkerUpdate,
  ) -> impl Future<Output = std::io::Result<()>> + Send + '_ {
    async { refused() }
  }

  fn delete_worker(&self, _id: String) -> impl Future<Output = std::io::Result<()>> + Send + '_ {
    async { refused() }
  }
}

#[tokio::test]
async fn transport_failure_is_returned_not_retried() {
  let holidays = StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &Unreachable);
  let workers = vec![Worker::new("W1", "Ana Sousa", "#228be6")];
  let form = vacation(date(2024, 7, 1), date(2024, 7, 5));

  let err = rec.create(&form, &workers).await.unwrap_err();
  assert!(matches!(err, Error::Backend(_)));
  assert!(err.to_string().contains("connection refused"));
}

// ─── Roster ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn worker_lifecycle() {
  let store = MemoryBackend::new();
  store
    .create_worker(NewWorker {
      title: "Ana Sousa".into(),
      dep: "Obra".into(),
      ..NewWorker::default()
    })
    .await
    .unwrap();
  store
    .create_worker(NewWorker {
      title: "Rui Melo".into(),
      dep: "Obra".into(),
      ..NewWorker::default()
    })
    .await
    .unwrap();

  let workers = store.list_workers().await.unwrap();
  let ids: Vec<&str> = workers.iter().map(|w| w.id.as_str()).collect();
  assert_eq!(ids, ["1", "2"]);
  assert_eq!(workers[0].lunch_deduction(), 1.0);

  store
    .update_worker("2".into(), WorkerUpdate { ava_days: Some(22), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(store.workers()[1].available_days, 22);

  store.delete_worker("1".into()).await.unwrap();
  assert_eq!(store.workers().len(), 1);
  assert!(matches!(
    store.delete_worker("1".into()).await,
    Err(Error::WorkerNotFound(_))
  ));
}

#[tokio::test]
async fn blank_worker_is_rejected() {
  let store = MemoryBackend::new();
  let err = store.create_worker(NewWorker::default()).await.unwrap_err();
  assert!(matches!(err, Error::MissingField("title")));
}

#[tokio::test]
async fn negative_hours_are_not_stored() {
  let store = MemoryBackend::new();
  let err = store
    .create_worker(NewWorker {
      title: "Ana Sousa".into(),
      dep: "Obra".into(),
      comp_h: -5.0,
      lunch_h: -2.0,
      ..NewWorker::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidHours(_)));
  assert!(store.workers().is_empty());

  let store = backend();
  let err = store
    .update_worker("W1".into(), WorkerUpdate { lunch_h: Some(-2.0), ..Default::default() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidLunch(_)));
  assert_eq!(store.workers()[0].lunch_hours, None);
}
