//! ferias development server.
//!
//! Serves the REST surface from process memory so the CLI can be run
//! without the production backend. Nothing is persisted.
//!
//! ```
//! cargo run -p ferias-api --bin ferias-devserver -- --credential admin:secret
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use ferias_core::{
  memory::MemoryBackend,
  store::WorkersResponse,
  worker::Credential,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "ferias development server")]
struct Cli {
  #[arg(long, default_value = "127.0.0.1")]
  host: String,

  #[arg(long, default_value_t = 8080)]
  port: u16,

  /// A login entry as `user:password`. May be repeated.
  #[arg(long = "credential", value_parser = parse_credential)]
  credentials: Vec<Credential>,

  /// JSON file shaped like the `getferias` response, loaded at start.
  #[arg(long)]
  seed: Option<PathBuf>,
}

fn parse_credential(s: &str) -> Result<Credential, String> {
  let (username, password) = s
    .split_once(':')
    .ok_or_else(|| format!("expected user:password, got {s:?}"))?;
  if username.is_empty() {
    return Err("username must not be empty".to_owned());
  }
  Ok(Credential {
    username: username.to_owned(),
    password: password.to_owned(),
  })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut store = MemoryBackend::new().with_credentials(cli.credentials);
  if let Some(path) = &cli.seed {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read seed file {path:?}"))?;
    let seed: WorkersResponse =
      serde_json::from_str(&raw).context("failed to parse seed file")?;
    tracing::info!(workers = seed.workers.len(), "loaded seed roster");
    store = store.with_workers(seed.workers);
  }

  let app = Router::new()
    .nest("/api", ferias_api::api_router(Arc::new(store)))
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", cli.host, cli.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
