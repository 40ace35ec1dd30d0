//! Nivaran portal server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, seeds the default sectors on first run, and
//! serves the JSON API over HTTP.

mod seed;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use nivaran_api::{AppState, BlobStore};
use nivaran_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:           String,
  #[serde(default = "default_port")]
  port:           u16,
  #[serde(default = "default_store_path")]
  store_path:     PathBuf,
  #[serde(default = "default_attachment_dir")]
  attachment_dir: PathBuf,
  /// Insert the built-in sector definitions when the sectors table is
  /// empty. Disable when sectors are managed externally.
  #[serde(default = "default_true")]
  seed_sectors:   bool,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { "nivaran.db".into() }
fn default_attachment_dir() -> PathBuf { "attachments".into() }
fn default_true() -> bool { true }

#[derive(Parser)]
#[command(author, version, about = "Nivaran grievance portal server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("NIVARAN"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if server_cfg.seed_sectors {
    seed::seed_default_sectors(&store)
      .await
      .context("failed to seed sectors")?;
  }

  let blobs = BlobStore::new(expand_tilde(&server_cfg.attachment_dir));
  blobs
    .ensure_dir()
    .await
    .context("failed to create attachment directory")?;

  let state = AppState {
    store: Arc::new(store),
    blobs: Arc::new(blobs),
  };

  let app = axum::Router::new()
    .nest("/api", nivaran_api::api_router(state))
    // The consumer is a browser single-page app on another origin.
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
