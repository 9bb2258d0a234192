//! Error taxonomy shared by every storage backend and the front-end.

use thiserror::Error;

use crate::{Digest, Table};

/// Boxed driver error carried as the source of backend failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// Unsupported, reserved, or malformed configuration.
  #[error("configuration error: {0}")]
  Configuration(String),

  #[error("cannot connect to database: {0}")]
  Connection(#[source] BoxError),

  /// A table existence probe or `CREATE TABLE` statement failed.
  #[error("schema error on table {table}: {source}")]
  Schema {
    table:  Table,
    #[source]
    source: BoxError,
  },

  #[error("table {0} does not exist")]
  TableMissing(Table),

  #[error("digest {digest} not found in table {table}")]
  NotFound { table: Table, digest: Digest },

  #[error("query error: {0}")]
  Query(#[source] BoxError),
}

impl Error {
  pub fn connection(e: impl Into<BoxError>) -> Self { Self::Connection(e.into()) }

  pub fn schema(table: Table, e: impl Into<BoxError>) -> Self {
    Self::Schema { table, source: e.into() }
  }

  pub fn query(e: impl Into<BoxError>) -> Self { Self::Query(e.into()) }

  pub fn not_found(table: Table, digest: &Digest) -> Self {
    Self::NotFound { table, digest: digest.clone() }
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
