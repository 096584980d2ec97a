//! Layered configuration: defaults, then an optional file, then `FERIAS_*`
//! environment variables. Command-line flags are applied on top by the
//! caller.

use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use ferias_client::{
  ApiConfig, HolidayConfig, client::DEFAULT_BASE_URL, holidays::DEFAULT_HOLIDAYS_URL,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub url:          String,
  #[serde(default)]
  pub username:     Option<String>,
  #[serde(default)]
  pub password:     Option<String>,
  pub holidays_url: String,
  pub country:      String,
  pub subdivision:  String,
  pub language:     String,
  pub timeout_secs: u64,
}

impl Settings {
  pub fn load(file: Option<&Path>) -> Result<Self> {
    let mut builder = config::Config::builder()
      .set_default("url", DEFAULT_BASE_URL)?
      .set_default("holidays_url", DEFAULT_HOLIDAYS_URL)?
      .set_default("country", "PT")?
      .set_default("subdivision", "PT-AV-AV")?
      .set_default("language", "PT")?
      .set_default("timeout_secs", 30)?;
    if let Some(path) = file {
      builder = builder.add_source(config::File::from(path).required(true));
    }
    builder
      .add_source(config::Environment::with_prefix("FERIAS"))
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise configuration")
  }

  pub fn api(&self) -> ApiConfig {
    ApiConfig {
      base_url: self.url.clone(),
      timeout:  self.timeout(),
    }
  }

  pub fn holidays(&self) -> HolidayConfig {
    HolidayConfig {
      base_url:    self.holidays_url.clone(),
      country:     self.country.clone(),
      subdivision: self.subdivision.clone(),
      language:    self.language.clone(),
    }
  }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}
