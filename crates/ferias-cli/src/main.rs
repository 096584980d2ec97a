//! `ferias`, the command-line front end for the vacation scheduler.
//!
//! # Usage
//!
//! ```
//! ferias --url http://localhost:8080 workers
//! ferias --user admin --password secret absence add --worker ana --start 2024-07-01 --end 2024-07-05
//! ferias --config ~/.config/ferias/config.toml calendar 2024
//! ```

mod commands;
mod lookup;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::Command;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "ferias", version, about = "Vacation and absence scheduler")]
struct Args {
  /// Path to a config file (url, username, password, holiday region, ...).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the scheduling backend (default: http://localhost:8080).
  #[arg(long, env = "FERIAS_URL")]
  url: Option<String>,

  /// Login username; required by commands that change data.
  #[arg(long, env = "FERIAS_USER")]
  user: Option<String>,

  /// Login password (plaintext).
  #[arg(long, env = "FERIAS_PASSWORD", hide_env_values = true)]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // Flags override environment, which overrides the file and the defaults.
  let mut settings = Settings::load(args.config.as_deref())?;
  if let Some(url) = args.url {
    settings.url = url;
  }
  if args.user.is_some() {
    settings.username = args.user;
  }
  if args.password.is_some() {
    settings.password = args.password;
  }

  let ctx = commands::Context::new(settings)?;
  args.command.run(&ctx).await
}
