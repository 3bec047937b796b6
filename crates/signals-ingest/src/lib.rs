//! Ingestion glue for Signals.
//!
//! Turns raw transcript text (or CSV batches of it) into session, chunk,
//! candidate, and mention rows. The heavy lifting — topic detection and
//! chunk tagging — belongs to an external pipeline executable; this crate
//! invokes it with a fixed timeout and falls back to naive sentence
//! splitting plus keyword heuristics when it is unavailable. The fallback
//! has no correctness guarantee and is explicitly best-effort.

pub mod batch;
pub mod dates;
pub mod error;
pub mod fallback;
pub mod ingest;
pub mod pipeline;

pub use error::IngestError;
pub use ingest::{IngestOutcome, IngestRequest, Turn, ingest_csv, ingest_session};
pub use pipeline::PipelineRunner;
