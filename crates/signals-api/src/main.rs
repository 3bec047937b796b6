//! signals-server binary.
//!
//! Reads `signals.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the JSON API over HTTP.

use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use signals_api::{AppState, app, config::ServerConfig};
use signals_ingest::PipelineRunner;
use signals_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Signals taxonomy service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "signals.toml")]
  config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SIGNALS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open SQLite store.
  let store = SqliteStore::open(&server_cfg.database_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.database_path)
    })?;

  let pipeline = match &server_cfg.pipeline_command {
    Some(command) => {
      tracing::info!(command = %command.display(), "pipeline configured");
      Some(Arc::new(PipelineRunner::new(
        command.clone(),
        Duration::from_secs(server_cfg.pipeline_timeout_secs),
      )))
    }
    None => {
      tracing::info!("no pipeline configured; ingestion uses heuristics");
      None
    }
  };

  let state = AppState { store: Arc::new(store), pipeline };
  let router = app(state).layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, router).await.context("server error")?;

  Ok(())
}
