//! Server configuration, deserialised from `signals.toml` plus `SIGNALS_*`
//! environment overrides.

use std::path::PathBuf;

use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5860 }
fn default_database_path() -> PathBuf { PathBuf::from("signals.db") }
fn default_pipeline_timeout_secs() -> u64 { 120 }

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,

  #[serde(default = "default_port")]
  pub port: u16,

  /// SQLite database file; created on first start.
  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,

  /// Topic-detection pipeline executable. When unset, ingestion always uses
  /// the heuristic fallback.
  #[serde(default)]
  pub pipeline_command: Option<PathBuf>,

  /// Hard ceiling on one pipeline run; the child is killed at the deadline.
  #[serde(default = "default_pipeline_timeout_secs")]
  pub pipeline_timeout_secs: u64,
}
