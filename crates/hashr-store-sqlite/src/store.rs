//! [`SqliteStore`], the SQLite implementation of [`HashStore`].

use std::path::Path;

use hashr_core::{
  Digest, Error, HashStore, Payload, Result, Sample, SampleSource, Source, Table,
};
use rusqlite::OptionalExtension as _;
use tracing::{debug, info};

use crate::{
  encode::{RawSampleSource, RawSource, encode_strings},
  schema::{CONNECTION_PRAGMAS, TABLE_EXISTS, create_table},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A hashr catalog backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a catalog at `path` and provision missing tables.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    debug!(path = %path.display(), "opening sqlite catalog");
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(Error::connection)?;
    Self::init(conn).await
  }

  /// Open an in-memory catalog for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(Error::connection)?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        Ok(())
      })
      .await
      .map_err(Error::connection)?;

    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Fail with [`Error::TableMissing`] unless `table` exists right now.
  async fn require(&self, table: Table) -> Result<()> {
    if self.table_exists(table).await? {
      Ok(())
    } else {
      Err(Error::TableMissing(table))
    }
  }

  /// Whether `table` (`samples` or `sources`) has a row keyed by `digest`.
  async fn row_exists(&self, table: Table, digest: &Digest) -> Result<bool> {
    self.require(table).await?;

    let sql = format!("SELECT 1 FROM {} WHERE sha256 = ?1", table.name());
    let digest = digest.as_str().to_owned();

    self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![digest], |_| Ok(()))
            .optional()?
            .is_some(),
        )
      })
      .await
      .map_err(Error::query)
  }
}

fn read_sample(row: &rusqlite::Row<'_>) -> rusqlite::Result<Sample> {
  Ok(Sample {
    sha256:      row.get::<_, String>(0)?.into(),
    mimetype:    row.get::<_, Option<String>>(1)?.unwrap_or_default(),
    file_output: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    size:        row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
  })
}

// ─── HashStore impl ──────────────────────────────────────────────────────────

impl HashStore for SqliteStore {
  fn name(&self) -> &'static str { "sqlite" }

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn table_exists(&self, table: Table) -> Result<bool> {
    let name = table.name();
    self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(TABLE_EXISTS, rusqlite::params![name], |r| r.get(0))?)
      })
      .await
      .map_err(|e| Error::schema(table, e))
  }

  async fn init_schema(&self) -> Result<()> {
    for table in Table::ALL {
      if self.table_exists(table).await? {
        debug!(%table, "table present");
        continue;
      }

      info!(%table, "creating missing table");
      let ddl = create_table(table);
      self
        .conn
        .call(move |conn| {
          conn.execute_batch(ddl)?;
          Ok(())
        })
        .await
        .map_err(|e| Error::schema(table, e))?;
    }
    Ok(())
  }

  // ── Existence checks ──────────────────────────────────────────────────────

  async fn sample_exists(&self, digest: &Digest) -> Result<bool> {
    self.row_exists(Table::Samples, digest).await
  }

  async fn source_exists(&self, digest: &Digest) -> Result<bool> {
    self.row_exists(Table::Sources, digest).await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_samples(&self) -> Result<Vec<Sample>> {
    self.require(Table::Samples).await?;

    self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT sha256, mimetype, file_output, size FROM samples")?;
        let rows = stmt
          .query_map([], read_sample)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::query)
  }

  async fn get_sample(&self, digest: &Digest) -> Result<Sample> {
    self.require(Table::Samples).await?;

    let sha256 = digest.as_str().to_owned();
    let sample = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT sha256, mimetype, file_output, size FROM samples WHERE sha256 = ?1",
              rusqlite::params![sha256],
              read_sample,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::query)?;

    sample.ok_or_else(|| Error::not_found(Table::Samples, digest))
  }

  async fn get_payload(&self, digest: &Digest) -> Result<Payload> {
    self.require(Table::Payloads).await?;

    let sha256 = digest.as_str().to_owned();
    let payload: Option<Option<Vec<u8>>> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT payload FROM payloads WHERE sha256 = ?1",
              rusqlite::params![sha256],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::query)?;

    match payload {
      Some(bytes) => Ok(Payload {
        sha256:  digest.clone(),
        payload: bytes.unwrap_or_default(),
      }),
      None => Err(Error::not_found(Table::Payloads, digest)),
    }
  }

  async fn get_source(&self, digest: &Digest) -> Result<Source> {
    self.require(Table::Sources).await?;

    let sha256 = digest.as_str().to_owned();
    let raw: Option<RawSource> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT sha256, sourceID, sourcePath, sourceDescription, repoName, repoPath
               FROM sources WHERE sha256 = ?1",
              rusqlite::params![sha256],
              |row| {
                Ok(RawSource {
                  sha256:             row.get(0)?,
                  source_ids:         row.get(1)?,
                  source_path:        row.get(2)?,
                  source_description: row.get(3)?,
                  repo_name:          row.get(4)?,
                  repo_path:          row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::query)?;

    match raw {
      Some(raw) => raw.into_source(),
      None => Err(Error::not_found(Table::Sources, digest)),
    }
  }

  async fn get_sample_sources(&self, sample: &Digest) -> Result<Vec<SampleSource>> {
    self.require(Table::SamplesSources).await?;

    let sha256 = sample.as_str().to_owned();
    let raws: Vec<RawSampleSource> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT sample_sha256, source_sha256, sample_paths
           FROM samples_sources WHERE sample_sha256 = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![sha256], |row| {
            Ok(RawSampleSource {
              sample_sha256: row.get(0)?,
              source_sha256: row.get(1)?,
              sample_paths:  row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::query)?;

    raws.into_iter().map(RawSampleSource::into_sample_source).collect()
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_sample(&self, sample: &Sample) -> Result<()> {
    self.require(Table::Samples).await?;

    let sample = sample.clone();
    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO samples (sha256, mimetype, file_output, size)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (sha256) DO NOTHING",
          rusqlite::params![
            sample.sha256.as_str(),
            sample.mimetype,
            sample.file_output,
            sample.size,
          ],
        )?)
      })
      .await
      .map_err(Error::query)?;

    debug!(inserted, "insert sample");
    Ok(())
  }

  async fn insert_payload(&self, payload: &Payload) -> Result<()> {
    self.require(Table::Payloads).await?;

    let payload = payload.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO payloads (sha256, payload) VALUES (?1, ?2)
           ON CONFLICT (sha256) DO NOTHING",
          rusqlite::params![payload.sha256.as_str(), payload.payload],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::query)
  }

  async fn insert_source(&self, source: &Source) -> Result<()> {
    self.require(Table::Sources).await?;

    let source_ids = encode_strings(&source.source_ids)?;
    let source = source.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sources (
             sha256, sourceID, sourcePath, sourceDescription, repoName, repoPath
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (sha256) DO NOTHING",
          rusqlite::params![
            source.sha256.as_str(),
            source_ids,
            source.source_path,
            source.source_description,
            source.repo_name,
            source.repo_path,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::query)
  }

  async fn link_sample_source(&self, link: &SampleSource) -> Result<()> {
    self.require(Table::SamplesSources).await?;

    let paths = encode_strings(&link.sample_paths)?;
    let sample = link.sample_sha256.as_str().to_owned();
    let source = link.source_sha256.as_str().to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO samples_sources (sample_sha256, source_sha256, sample_paths)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (sample_sha256, source_sha256) DO NOTHING",
          rusqlite::params![sample, source, paths],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::query)
  }
}
