//! Async HTTP client for the scheduling backend's REST surface.

use std::{future::Future, time::Duration};

use ferias_core::{
  absence::{AbsencePayload, NewAbsenceRequest},
  id::AbsenceId,
  store::{Backend, CredentialsResponse, MessageResponse, WorkersResponse},
  worker::{Credential, NewWorker, Worker, WorkerUpdate},
};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_owned(),
      timeout:  Duration::from_secs(30),
    }
  }
}

/// [`Backend`] over HTTP.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
  base:   Url,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let invalid = |reason: String| Error::InvalidBaseUrl {
      url: config.base_url.clone(),
      reason,
    };
    let base = Url::parse(&config.base_url).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
      return Err(invalid("not a hierarchical URL".to_owned()));
    }
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config, base })
  }

  pub fn base_url(&self) -> &str { &self.config.base_url }

  /// `{base}/api/{route}/{id}`, each segment percent-encoded, so an id
  /// holding `/`, `?` or `#` stays a single segment.
  fn url(&self, route: &str, id: Option<&str>) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty().push("api").push(route).extend(id);
    }
    url
  }

  async fn get_json<T: DeserializeOwned>(&self, route: &str) -> Result<T> {
    let resp = self.client.get(self.url(route, None)).send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status {
        method: "GET",
        path:   format!("/{route}"),
        status: resp.status(),
      });
    }
    Ok(resp.json().await?)
  }

  /// Send a mutation and log the backend's `message`.
  async fn mutate(&self, method: &'static str, path: String, req: RequestBuilder) -> Result<()> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Status { method, path, status });
    }
    // The message is informational; an unparseable body is not an error.
    match resp.json::<MessageResponse>().await {
      Ok(body) => debug!(%method, %path, message = %body.message, "backend replied"),
      Err(e) => debug!(%method, %path, error = %e, "backend reply had no message"),
    }
    Ok(())
  }
}

impl Backend for ApiClient {
  type Error = Error;

  /// `GET /api/getloginferias`
  fn credentials(&self) -> impl Future<Output = Result<Vec<Credential>>> + Send + '_ {
    async move {
      let body: CredentialsResponse = self.get_json("getloginferias").await?;
      Ok(body.credentials)
    }
  }

  /// `GET /api/getferias`
  fn list_workers(&self) -> impl Future<Output = Result<Vec<Worker>>> + Send + '_ {
    async move {
      let body: WorkersResponse = self.get_json("getferias").await?;
      Ok(body.workers)
    }
  }

  /// `POST /api/postferias`
  fn create_absence(
    &self,
    request: NewAbsenceRequest,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    async move {
      let path = "/postferias".to_owned();
      let req = self.client.post(self.url("postferias", None)).json(&request);
      self.mutate("POST", path, req).await
    }
  }

  /// `PATCH /api/editferias/:id`
  fn update_absence(
    &self,
    id: AbsenceId,
    payload: AbsencePayload,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    async move {
      let path = format!("/editferias/{id}");
      let req = self.client.patch(self.url("editferias", Some(id.as_str()))).json(&payload);
      self.mutate("PATCH", path, req).await
    }
  }

  /// `DELETE /api/deleteferias/:id`
  fn delete_absence(&self, id: AbsenceId) -> impl Future<Output = Result<()>> + Send + '_ {
    async move {
      let path = format!("/deleteferias/{id}");
      let req = self.client.delete(self.url("deleteferias", Some(id.as_str())));
      self.mutate("DELETE", path, req).await
    }
  }

  /// `POST /api/novocolab`
  fn create_worker(&self, worker: NewWorker) -> impl Future<Output = Result<()>> + Send + '_ {
    async move {
      let path = "/novocolab".to_owned();
      let req = self.client.post(self.url("novocolab", None)).json(&worker);
      self.mutate("POST", path, req).await
    }
  }

  /// `PATCH /api/editarColab/:id`
  fn update_worker(
    &self,
    id: String,
    update: WorkerUpdate,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    async move {
      let path = format!("/editarColab/{id}");
      let req = self.client.patch(self.url("editarColab", Some(&id))).json(&update);
      self.mutate("PATCH", path, req).await
    }
  }

  /// `DELETE /api/eliminarColab/:id`
  fn delete_worker(&self, id: String) -> impl Future<Output = Result<()>> + Send + '_ {
    async move {
      let path = format!("/eliminarColab/{id}");
      let req = self.client.delete(self.url("eliminarColab", Some(&id)));
      self.mutate("DELETE", path, req).await
    }
  }
}
