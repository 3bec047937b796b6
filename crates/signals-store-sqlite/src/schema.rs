//! SQL schema for the Signals SQLite store.
//!
//! Executed at connection startup, gated on `PRAGMA user_version`. Version 2
//! layers additive columns onto the base schema without altering existing
//! column semantics.

/// Base schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA_V1: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sessions (
    session_id   TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    meeting_type TEXT NOT NULL DEFAULT 'unknown',
    started_at   TEXT,
    ended_at     TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS speakers (
    speaker_id   TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    email        TEXT,
    is_internal  INTEGER NOT NULL DEFAULT 0,
    org          TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS utterances (
    utterance_id TEXT PRIMARY KEY,
    session_id   TEXT NOT NULL REFERENCES sessions(session_id) ON DELETE CASCADE,
    speaker_id   TEXT NOT NULL REFERENCES speakers(speaker_id),
    start_sec    REAL NOT NULL DEFAULT 0,
    end_sec      REAL,
    text         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    chunk_id     TEXT PRIMARY KEY,
    session_id   TEXT NOT NULL REFERENCES sessions(session_id) ON DELETE CASCADE,
    speaker_id   TEXT REFERENCES speakers(speaker_id),
    start_sec    REAL,
    end_sec      REAL,
    text         TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

-- Topic ids are lowercase slugs; labels are unique ignoring case.
CREATE TABLE IF NOT EXISTS topics (
    id          TEXT PRIMARY KEY,
    label       TEXT NOT NULL COLLATE NOCASE UNIQUE,
    description TEXT,
    status      TEXT NOT NULL DEFAULT 'active',   -- 'active' | 'archived'
    created_by  TEXT NOT NULL DEFAULT 'system',
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS topic_aliases (
    alias_id   TEXT PRIMARY KEY,
    topic_id   TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
    alias      TEXT NOT NULL COLLATE NOCASE,
    created_at TEXT NOT NULL,
    UNIQUE (topic_id, alias)
);

-- Composite key permits multi-parent edges. No cycle check exists; a
-- parent/child cycle is representable.
CREATE TABLE IF NOT EXISTS topic_relations (
    parent_id     TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
    child_id      TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
    relation_type TEXT NOT NULL DEFAULT 'parent_child',
    rollup_weight REAL,
    created_at    TEXT NOT NULL,
    PRIMARY KEY (parent_id, child_id, relation_type)
);

CREATE TABLE IF NOT EXISTS topic_candidates (
    candidate_id       TEXT PRIMARY KEY,
    session_id         TEXT REFERENCES sessions(session_id) ON DELETE SET NULL,
    topic_id_suggested TEXT NOT NULL,
    label              TEXT NOT NULL,
    evidence           TEXT NOT NULL DEFAULT '',
    why_new            TEXT NOT NULL DEFAULT '',
    status             TEXT NOT NULL DEFAULT 'pending',
    merged_into_topic  TEXT,
    approver           TEXT,
    decided_at         TEXT,
    created_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS mentions (
    mention_id   TEXT PRIMARY KEY,
    session_id   TEXT NOT NULL REFERENCES sessions(session_id) ON DELETE CASCADE,
    chunk_id     TEXT NOT NULL REFERENCES chunks(chunk_id) ON DELETE CASCADE,
    topic_id     TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
    evidence     TEXT NOT NULL DEFAULT '',
    surface_term TEXT,
    relevance_r  REAL,
    importance_i REAL,
    specificity_s REAL,
    mentioned_at TEXT NOT NULL,   -- when it came up, not when it was inserted
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scoring_runs (
    run_id         TEXT PRIMARY KEY,
    run_type       TEXT NOT NULL DEFAULT 'manual',
    half_life_days REAL,
    min_relevance  REAL,
    rollup_alpha   REAL,
    notes          TEXT,
    run_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS topic_scores (
    run_id          TEXT NOT NULL REFERENCES scoring_runs(run_id) ON DELETE CASCADE,
    topic_id        TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
    direct_score    REAL NOT NULL DEFAULT 0,
    rollup_score    REAL NOT NULL DEFAULT 0,
    total_score     REAL NOT NULL DEFAULT 0,
    num_mentions    INTEGER NOT NULL DEFAULT 0,
    last_mention_at TEXT,
    PRIMARY KEY (run_id, topic_id)
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS events (
    event_id     TEXT PRIMARY KEY,
    event_type   TEXT NOT NULL,
    actor        TEXT NOT NULL DEFAULT 'system',
    payload_json TEXT NOT NULL DEFAULT '{}',
    session_id   TEXT,
    topic_id     TEXT,
    candidate_id TEXT,
    run_id       TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    id              INTEGER PRIMARY KEY CHECK (id = 1),
    merge_threshold REAL NOT NULL,
    half_life_days  REAL NOT NULL,
    min_relevance   REAL NOT NULL,
    auto_chunk_tag  INTEGER NOT NULL DEFAULT 0,
    updated_at      TEXT
);

CREATE INDEX IF NOT EXISTS utterances_session_idx ON utterances(session_id);
CREATE INDEX IF NOT EXISTS chunks_session_idx     ON chunks(session_id);
CREATE INDEX IF NOT EXISTS candidates_status_idx  ON topic_candidates(status);
CREATE INDEX IF NOT EXISTS mentions_session_idx   ON mentions(session_id);
CREATE INDEX IF NOT EXISTS mentions_topic_idx     ON mentions(topic_id);
CREATE INDEX IF NOT EXISTS events_created_idx     ON events(created_at);

PRAGMA user_version = 1;
";

/// Additive columns layered on the base schema: run lifecycle tracking, score
/// breakdowns, and the plain `relevance` alias for `relevance_r` (kept in
/// sync on insert).
pub const MIGRATION_V2: &str = "
ALTER TABLE scoring_runs ADD COLUMN status      TEXT NOT NULL DEFAULT 'queued';
ALTER TABLE scoring_runs ADD COLUMN finished_at TEXT;
ALTER TABLE scoring_runs ADD COLUMN error       TEXT;

ALTER TABLE topic_scores ADD COLUMN breakdown_json TEXT;

ALTER TABLE mentions ADD COLUMN relevance REAL;

PRAGMA user_version = 2;
";
