//! The `HashStore` trait.
//!
//! The trait is implemented by storage backends (`hashr-store-postgres`,
//! `hashr-store-sqlite`). The retrieval front-end depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{Digest, Payload, Result, Sample, SampleSource, Source, Table};

/// Abstraction over a sample catalog backend.
///
/// Table existence is re-checked by every operation that touches a table;
/// a missing table yields [`Error::TableMissing`](crate::Error::TableMissing).
/// Only [`HashStore::init_schema`] creates tables.
pub trait HashStore: Send + Sync {
  /// Short backend name, as accepted by the front-end's storage selector.
  fn name(&self) -> &'static str;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Probe the database catalog for `table`.
  fn table_exists(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Create every table of [`Table::ALL`] that does not exist yet.
  ///
  /// Idempotent. Tables created before a failure are left in place.
  fn init_schema(&self) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Existence checks ──────────────────────────────────────────────────

  /// `Ok(false)` when no sample has this digest.
  fn sample_exists<'a>(
    &'a self,
    digest: &'a Digest,
  ) -> impl Future<Output = Result<bool>> + Send + 'a;

  /// `Ok(false)` when no source has this digest.
  fn source_exists<'a>(
    &'a self,
    digest: &'a Digest,
  ) -> impl Future<Output = Result<bool>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All samples, in database-native order.
  fn get_samples(&self) -> impl Future<Output = Result<Vec<Sample>>> + Send + '_;

  /// The sample with `digest`, or [`Error::NotFound`](crate::Error::NotFound).
  fn get_sample<'a>(
    &'a self,
    digest: &'a Digest,
  ) -> impl Future<Output = Result<Sample>> + Send + 'a;

  fn get_payload<'a>(
    &'a self,
    digest: &'a Digest,
  ) -> impl Future<Output = Result<Payload>> + Send + 'a;

  fn get_source<'a>(
    &'a self,
    digest: &'a Digest,
  ) -> impl Future<Output = Result<Source>> + Send + 'a;

  /// Every association row of the sample; empty if it was never linked.
  fn get_sample_sources<'a>(
    &'a self,
    sample: &'a Digest,
  ) -> impl Future<Output = Result<Vec<SampleSource>>> + Send + 'a;

  // ── Writes (idempotent by digest) ─────────────────────────────────────

  /// Insert a sample; a row with the same digest is left untouched.
  fn insert_sample<'a>(
    &'a self,
    sample: &'a Sample,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  fn insert_payload<'a>(
    &'a self,
    payload: &'a Payload,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  fn insert_source<'a>(
    &'a self,
    source: &'a Source,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Record that a sample appeared in a source.
  ///
  /// Fails with [`Error::Query`](crate::Error::Query) when either digest has
  /// no row, as enforced by the referential constraints.
  fn link_sample_source<'a>(
    &'a self,
    link: &'a SampleSource,
  ) -> impl Future<Output = Result<()>> + Send + 'a;
}
