//! SQL schema for the PostgreSQL catalog.

use hashr_core::Table;

pub const TABLE_EXISTS: &str = "
SELECT EXISTS (
    SELECT 1
    FROM   information_schema.tables
    WHERE  table_name = $1
)";

const CREATE_SAMPLES: &str = "
CREATE TABLE samples (
    sha256      VARCHAR(100) PRIMARY KEY,
    mimetype    text,
    file_output text,
    size        INT
)";

const CREATE_PAYLOADS: &str = "
CREATE TABLE payloads (
    sha256  VARCHAR(100) PRIMARY KEY,
    payload bytea
)";

const CREATE_SOURCES: &str = "
CREATE TABLE sources (
    sha256            VARCHAR(100) PRIMARY KEY,
    sourceID          text[],
    sourcePath        text,
    sourceDescription text,
    repoName          text,
    repoPath          text
)";

const CREATE_SAMPLES_SOURCES: &str = "
CREATE TABLE samples_sources (
    sample_sha256 VARCHAR(100) REFERENCES samples(sha256) NOT NULL,
    source_sha256 VARCHAR(100) REFERENCES sources(sha256) NOT NULL,
    sample_paths  text[],
    PRIMARY KEY (sample_sha256, source_sha256)
)";

/// DDL creating `table`.
pub fn create_table(table: Table) -> &'static str {
  match table {
    Table::Samples => CREATE_SAMPLES,
    Table::Payloads => CREATE_PAYLOADS,
    Table::Sources => CREATE_SOURCES,
    Table::SamplesSources => CREATE_SAMPLES_SOURCES,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_statement_creates_its_own_table() {
    for table in Table::ALL {
      let ddl = create_table(table);
      assert!(
        ddl.contains(&format!("CREATE TABLE {} (", table.name())),
        "{table}: {ddl}"
      );
      assert!(ddl.contains("VARCHAR(100)"), "{table}: {ddl}");
    }
  }

  #[test]
  fn association_table_enforces_references() {
    let ddl = create_table(Table::SamplesSources);
    assert!(ddl.contains("REFERENCES samples(sha256) NOT NULL"));
    assert!(ddl.contains("REFERENCES sources(sha256) NOT NULL"));
    assert!(ddl.contains("PRIMARY KEY (sample_sha256, source_sha256)"));
  }
}
