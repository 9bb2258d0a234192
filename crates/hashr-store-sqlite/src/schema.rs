//! SQL schema for the SQLite rendition of the catalog.
//!
//! Each table is created individually, and only after a `sqlite_master`
//! probe reports it missing. `text[]` columns of the PostgreSQL schema are
//! JSON arrays here; `bytea` is a BLOB.

use hashr_core::Table;

/// Run on every new connection; SQLite leaves foreign keys off by default.
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

pub const TABLE_EXISTS: &str =
  "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)";

const CREATE_SAMPLES: &str = "
CREATE TABLE samples (
    sha256      VARCHAR(100) NOT NULL PRIMARY KEY,
    mimetype    TEXT,
    file_output TEXT,
    size        INTEGER
);
";

const CREATE_PAYLOADS: &str = "
CREATE TABLE payloads (
    sha256  VARCHAR(100) NOT NULL PRIMARY KEY,
    payload BLOB
);
";

const CREATE_SOURCES: &str = "
CREATE TABLE sources (
    sha256            VARCHAR(100) NOT NULL PRIMARY KEY,
    sourceID          TEXT,   -- JSON array of strings
    sourcePath        TEXT,
    sourceDescription TEXT,
    repoName          TEXT,
    repoPath          TEXT
);
";

const CREATE_SAMPLES_SOURCES: &str = "
CREATE TABLE samples_sources (
    sample_sha256 VARCHAR(100) NOT NULL REFERENCES samples(sha256),
    source_sha256 VARCHAR(100) NOT NULL REFERENCES sources(sha256),
    sample_paths  TEXT,       -- JSON array of strings
    PRIMARY KEY (sample_sha256, source_sha256)
);
";

/// DDL creating `table`.
pub fn create_table(table: Table) -> &'static str {
  match table {
    Table::Samples => CREATE_SAMPLES,
    Table::Payloads => CREATE_PAYLOADS,
    Table::Sources => CREATE_SOURCES,
    Table::SamplesSources => CREATE_SAMPLES_SOURCES,
  }
}
