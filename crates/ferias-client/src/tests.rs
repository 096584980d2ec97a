//! Client tests against real listeners on `127.0.0.1:0`.

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
  Json, Router,
  extract::Query,
  http::StatusCode,
  routing::get,
};
use chrono::NaiveDate;
use ferias_core::{
  absence::AbsenceKind,
  holiday::HolidaySource,
  memory::MemoryBackend,
  reconcile::{AbsenceForm, Reconciler},
  store::Backend,
  worker::{Credential, NewWorker, Worker, WorkerUpdate},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::{ApiClient, ApiConfig, Error, HolidayConfig, OpenHolidaysClient};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Serve `app` on an ephemeral port and return its base URL.
async fn serve(app: Router) -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  format!("http://{addr}")
}

async fn backend() -> (MemoryBackend, ApiClient) {
  let store = MemoryBackend::new()
    .with_workers(vec![Worker::new("W1", "Ana Sousa", "#228be6")])
    .with_credentials(vec![Credential {
      username: "admin".into(),
      password: "secret".into(),
    }]);
  let app = Router::new().nest("/api", ferias_api::api_router(Arc::new(store.clone())));
  let base_url = serve(app).await;
  let client = ApiClient::new(ApiConfig {
    base_url,
    timeout: Duration::from_secs(5),
  })
  .unwrap();
  (store, client)
}

fn holidays_client(base_url: String) -> OpenHolidaysClient {
  OpenHolidaysClient::new(
    reqwest::Client::new(),
    HolidayConfig { base_url, ..HolidayConfig::default() },
  )
}

// ─── Backend ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reads_roster_and_credentials() {
  let (_, client) = backend().await;
  let workers = client.list_workers().await.unwrap();
  assert_eq!(workers.len(), 1);
  assert_eq!(workers[0].name, "Ana Sousa");

  let creds = client.credentials().await.unwrap();
  assert_eq!(creds[0].username, "admin");
}

#[tokio::test]
async fn reconciler_round_trip_over_http() {
  let (store, client) = backend().await;
  let holidays = ferias_core::holiday::StaticHolidays::none();
  let rec = Reconciler::new(&holidays, &client);

  let mut form = AbsenceForm::new(AbsenceKind::Vacation, "W1", date(2024, 7, 1));
  form.end_date = Some(date(2024, 7, 5));
  let created = rec
    .create(&form, &client.list_workers().await.unwrap())
    .await
    .unwrap();
  assert_eq!(created.id.as_str(), "W1-1-1");

  let workers = client.list_workers().await.unwrap();
  assert_eq!(workers[0].vacations[0].bus_days, Some(5));

  let mut edit = AbsenceForm::new(AbsenceKind::OffDay, "W1", date(2024, 7, 3));
  edit.all_day = true;
  let updated = rec.update(&created.id, &edit, &workers).await.unwrap();
  assert_eq!(updated.id.as_str(), "W1-2-1");

  let stored = store.workers();
  assert!(stored[0].vacations.is_empty());
  assert_eq!(stored[0].off_days[0].bus_days, Some(1));

  rec.delete(&updated.id).await.unwrap();
  assert!(store.workers()[0].off_days.is_empty());
}

#[tokio::test]
async fn not_found_surfaces_as_status() {
  let (_, client) = backend().await;
  let err = client.delete_absence("W1-1-9".into()).await.unwrap_err();
  assert!(err.is_not_found());
  assert!(err.to_string().contains("/deleteferias/W1-1-9"));
}

#[tokio::test]
async fn worker_mutations() {
  let (store, client) = backend().await;
  client
    .create_worker(NewWorker {
      title: "Rui Melo".into(),
      dep: "Obra".into(),
      ..NewWorker::default()
    })
    .await
    .unwrap();
  assert_eq!(store.workers().len(), 2);

  client
    .update_worker(
      "W1".into(),
      WorkerUpdate { color: Some("#40c057".into()), ..Default::default() },
    )
    .await
    .unwrap();
  assert_eq!(store.workers()[0].color, "#40c057");

  client.delete_worker("W1".into()).await.unwrap();
  assert_eq!(store.workers().len(), 1);
}

#[tokio::test]
async fn ids_are_single_path_segments() {
  let odd = "A/B#1?x";
  let store = MemoryBackend::new().with_workers(vec![
    Worker::new("A", "Ana Sousa", "#228be6"),
    Worker::new(odd, "Rui Melo", "#fa5252"),
  ]);
  let app = Router::new().nest("/api", ferias_api::api_router(Arc::new(store.clone())));
  // A trailing slash on the base must not produce an empty segment.
  let base_url = format!("{}/", serve(app).await);
  let client = ApiClient::new(ApiConfig { base_url, timeout: Duration::from_secs(5) }).unwrap();

  client
    .update_worker(odd.into(), WorkerUpdate { color: Some("#40c057".into()), ..Default::default() })
    .await
    .unwrap();
  let workers = store.workers();
  assert_eq!(workers[0].color, "#228be6");
  assert_eq!(workers[1].color, "#40c057");

  let err = client.delete_absence(format!("{odd}-1-1").into()).await.unwrap_err();
  assert!(err.is_not_found());

  client.delete_worker(odd.into()).await.unwrap();
  let ids: Vec<String> = store.workers().into_iter().map(|w| w.id).collect();
  assert_eq!(ids, ["A"]);
}

#[test]
fn base_url_must_be_hierarchical() {
  for base_url in ["not a url", "mailto:ops@example.com"] {
    let config = ApiConfig { base_url: base_url.into(), ..ApiConfig::default() };
    assert!(matches!(ApiClient::new(config), Err(Error::InvalidBaseUrl { .. })));
  }
}

#[tokio::test]
async fn unreachable_backend_is_http_error() {
  let client = ApiClient::new(ApiConfig {
    base_url: "http://127.0.0.1:9".into(),
    timeout:  Duration::from_secs(2),
  })
  .unwrap();
  assert!(matches!(client.list_workers().await, Err(Error::Http(_))));
}

// ─── Holidays ─────────────────────────────────────────────────────────────────

async fn public_holidays(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
  assert_eq!(q.get("countryIsoCode").map(String::as_str), Some("PT"));
  assert_eq!(q.get("subdivisionCode").map(String::as_str), Some("PT-AV-AV"));
  let year = q["validFrom"][..4].to_owned();
  Json(json!([
    {
      "id": format!("{year}-dp"),
      "startDate": format!("{year}-06-10"),
      "endDate": format!("{year}-06-10"),
      "name": [{ "language": "PT", "text": "Dia de Portugal" }]
    },
    {
      "id": format!("{year}-ny"),
      "startDate": format!("{year}-01-01"),
      "name": [{ "language": "EN", "text": "New Year" }]
    }
  ]))
}

#[tokio::test]
async fn fetches_and_normalizes_holidays() {
  let base = serve(Router::new().route("/PublicHolidays", get(public_holidays))).await;
  let source = holidays_client(base);

  let events = source.holidays(2024).await;
  assert_eq!(events.len(), 2);
  assert_eq!(events[0].title, "Dia de Portugal");
  assert_eq!(events[0].start, date(2024, 6, 10));
  assert_eq!(events[1].title, "Holiday");
  assert_eq!(events[1].end, date(2024, 1, 1));
}

#[tokio::test]
async fn holidays_reduce_counts_over_http() {
  let (_, client) = backend().await;
  let base = serve(Router::new().route("/PublicHolidays", get(public_holidays))).await;
  let source = holidays_client(base);
  let rec = Reconciler::new(&source, &client);

  // Mon 10 Jun .. Fri 14 Jun 2024, with the 10th a holiday.
  let mut form = AbsenceForm::new(AbsenceKind::Vacation, "W1", date(2024, 6, 10));
  form.end_date = Some(date(2024, 6, 14));
  let payload = rec
    .prepare(&form, &client.list_workers().await.unwrap(), None)
    .await
    .unwrap();
  assert_eq!(payload.bus_days, 4);
}

#[tokio::test]
async fn holiday_failure_fails_open() {
  let app = Router::new().route(
    "/PublicHolidays",
    get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
  );
  let source = holidays_client(serve(app).await);

  assert!(source.holidays(2024).await.is_empty());
  assert!(matches!(
    source.fetch(2024).await,
    Err(Error::Status { status, .. }) if status == StatusCode::SERVICE_UNAVAILABLE
  ));
}

#[tokio::test]
async fn malformed_holiday_body_fails_open() {
  let app = Router::new().route("/PublicHolidays", get(|| async { Json(json!({ "oops": 1 })) }));
  let source = holidays_client(serve(app).await);
  assert!(source.holidays(2024).await.is_empty());
}
