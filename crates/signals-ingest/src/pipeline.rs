//! The external topic-detection pipeline, invoked as a subprocess.
//!
//! The executable is handed a meeting transcript file and a taxonomy file
//! and must write `chunks.json`, `new_topics.json`, and `mentions.json`
//! into the output directory within the configured timeout. It is treated
//! as opaque: any failure — spawn error, non-zero exit, timeout, malformed
//! artifact — makes the caller fall back to heuristics.

use std::{path::Path, process::Stdio, time::Duration};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

// ─── Wire shapes ─────────────────────────────────────────────────────────────

/// Meeting input file handed to the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingFile {
  pub title:        String,
  pub meeting_type: String,
  pub started_at:   Option<chrono::DateTime<chrono::Utc>>,
  pub transcript:   String,
}

/// One taxonomy entry in the input file.
#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyEntry {
  pub id:    String,
  pub score: f64,
}

/// One chunk in `chunks.json` (a bare array).
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactChunk {
  pub chunk_id: String,
  #[serde(default)]
  pub speaker:  Option<String>,
  pub text:     String,
}

/// One candidate in `new_topics.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactCandidate {
  pub label:    String,
  #[serde(default)]
  pub topic_id: Option<String>,
  pub evidence: String,
  #[serde(default)]
  pub why_new:  String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NewTopicsFile {
  new_topics: Vec<ArtifactCandidate>,
}

/// One mention in `mentions.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactMention {
  pub chunk_id:    String,
  #[serde(default)]
  pub topic_id:    Option<String>,
  pub topic_label: String,
  pub evidence:    String,
  #[serde(default)]
  pub relevance:   Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MentionsFile {
  mentions: Vec<ArtifactMention>,
}

/// Everything a successful run produced. Absent artifact files decode as
/// empty lists — a detect-only run writes no mentions.
#[derive(Debug, Clone, Default)]
pub struct PipelineArtifacts {
  pub chunks:     Vec<ArtifactChunk>,
  pub candidates: Vec<ArtifactCandidate>,
  pub mentions:   Vec<ArtifactMention>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("failed to spawn pipeline: {0}")]
  Spawn(#[source] std::io::Error),

  #[error("pipeline timed out after {0}s")]
  Timeout(u64),

  #[error("pipeline exited with {code:?}: {stderr}")]
  Exit { code: Option<i32>, stderr: String },

  #[error("bad artifact {file}: {source}")]
  Artifact {
    file:   String,
    #[source]
    source: serde_json::Error,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

// ─── Runner ──────────────────────────────────────────────────────────────────

/// One-shot runner for the pipeline executable.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
  command: std::path::PathBuf,
  timeout: Duration,
}

impl PipelineRunner {
  pub fn new(command: impl Into<std::path::PathBuf>, timeout: Duration) -> Self {
    Self { command: command.into(), timeout }
  }

  /// Run the pipeline against a scratch directory and collect its artifacts.
  ///
  /// On timeout the child is killed and the in-flight work abandoned; there
  /// is no cancellation propagation beyond that.
  pub async fn run(
    &self,
    meeting: &MeetingFile,
    taxonomy: &[TaxonomyEntry],
  ) -> Result<PipelineArtifacts, PipelineError> {
    let scratch = tempfile::tempdir()?;
    let meeting_path = scratch.path().join("input_meeting.json");
    let taxonomy_path = scratch.path().join("input_taxonomy.json");
    let out_dir = scratch.path().join("out");

    tokio::fs::write(&meeting_path, serde_json::to_vec_pretty(meeting)?).await?;
    tokio::fs::write(&taxonomy_path, serde_json::to_vec_pretty(&taxonomy)?).await?;
    tokio::fs::create_dir_all(&out_dir).await?;

    debug!(command = %self.command.display(), "running pipeline");

    let child = Command::new(&self.command)
      .arg("--meeting")
      .arg(&meeting_path)
      .arg("--taxonomy")
      .arg(&taxonomy_path)
      .arg("--out-dir")
      .arg(&out_dir)
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      // Dropping the future on timeout must also reap the child.
      .kill_on_drop(true)
      .spawn()
      .map_err(PipelineError::Spawn)?;

    let output =
      match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => return Err(PipelineError::Timeout(self.timeout.as_secs())),
      };

    if !output.status.success() {
      return Err(PipelineError::Exit {
        code:   output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
      });
    }

    let chunks: Vec<ArtifactChunk> =
      read_artifact(&out_dir.join("chunks.json")).await?.unwrap_or_default();
    let new_topics: NewTopicsFile = read_artifact(&out_dir.join("new_topics.json"))
      .await?
      .unwrap_or_default();
    let mentions: MentionsFile = read_artifact(&out_dir.join("mentions.json"))
      .await?
      .unwrap_or_default();

    Ok(PipelineArtifacts {
      chunks,
      candidates: new_topics.new_topics,
      mentions: mentions.mentions,
    })
  }
}

async fn read_artifact<T: DeserializeOwned>(
  path: &Path,
) -> Result<Option<T>, PipelineError> {
  match tokio::fs::read(path).await {
    Ok(bytes) => {
      serde_json::from_slice(&bytes).map(Some).map_err(|source| {
        PipelineError::Artifact {
          file: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
          source,
        }
      })
    }
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e.into()),
  }
}
