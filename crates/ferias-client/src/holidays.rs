//! Public holidays from the OpenHolidays API.
//!
//! `GET {base}/PublicHolidays?countryIsoCode=..&languageIsoCode=..&validFrom=..&validTo=..&subdivisionCode=..`
//!
//! Fail-open: any transport, status or decoding failure is logged and yields
//! an empty list.

use std::future::Future;

use chrono::NaiveDate;
use ferias_core::holiday::{FALLBACK_TITLE, HolidayEvent, HolidaySource};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Error, Result};

pub const DEFAULT_HOLIDAYS_URL: &str = "https://openholidaysapi.org";

/// Which region's holidays to request, and in which language.
#[derive(Debug, Clone)]
pub struct HolidayConfig {
  pub base_url:    String,
  pub country:     String,
  pub subdivision: String,
  pub language:    String,
}

impl Default for HolidayConfig {
  fn default() -> Self {
    Self {
      base_url:    DEFAULT_HOLIDAYS_URL.to_owned(),
      country:     "PT".to_owned(),
      subdivision: "PT-AV-AV".to_owned(),
      language:    "PT".to_owned(),
    }
  }
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LocalizedText {
  language: String,
  text:     String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiHoliday {
  id:         String,
  start_date: NaiveDate,
  #[serde(default)]
  end_date:   Option<NaiveDate>,
  #[serde(default)]
  name:       Vec<LocalizedText>,
}

impl ApiHoliday {
  fn normalize(self, language: &str) -> HolidayEvent {
    let title = self
      .name
      .into_iter()
      .find(|n| n.language.eq_ignore_ascii_case(language))
      .map(|n| n.text)
      .unwrap_or_else(|| FALLBACK_TITLE.to_owned());
    let end = self.end_date.unwrap_or(self.start_date).max(self.start_date);
    HolidayEvent { id: self.id, title, start: self.start_date, end }
  }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// [`HolidaySource`] backed by the OpenHolidays REST API.
#[derive(Debug, Clone)]
pub struct OpenHolidaysClient {
  client: Client,
  config: HolidayConfig,
}

impl OpenHolidaysClient {
  pub fn new(client: Client, config: HolidayConfig) -> Self { Self { client, config } }

  /// The year's holidays, or the failure that prevented fetching them.
  pub async fn fetch(&self, year: i32) -> Result<Vec<HolidayEvent>> {
    let url = format!(
      "{}/PublicHolidays",
      self.config.base_url.trim_end_matches('/')
    );
    let valid_from = format!("{year}-01-01");
    let valid_to = format!("{year}-12-31");
    let resp = self
      .client
      .get(&url)
      .query(&[
        ("countryIsoCode", self.config.country.as_str()),
        ("languageIsoCode", self.config.language.as_str()),
        ("validFrom", valid_from.as_str()),
        ("validTo", valid_to.as_str()),
        ("subdivisionCode", self.config.subdivision.as_str()),
      ])
      .send()
      .await?;
    if !resp.status().is_success() {
      return Err(Error::Status {
        method: "GET",
        path:   "/PublicHolidays".to_owned(),
        status: resp.status(),
      });
    }
    let raw: Vec<ApiHoliday> = resp.json().await?;
    Ok(
      raw
        .into_iter()
        .map(|h| h.normalize(&self.config.language))
        .collect(),
    )
  }
}

impl HolidaySource for OpenHolidaysClient {
  fn holidays(&self, year: i32) -> impl Future<Output = Vec<HolidayEvent>> + Send + '_ {
    async move {
      match self.fetch(year).await {
        Ok(events) => {
          debug!(year, count = events.len(), "fetched holidays");
          events
        }
        Err(e) => {
          warn!(year, error = %e, "holiday fetch failed; counting without holidays");
          Vec::new()
        }
      }
    }
  }
}
