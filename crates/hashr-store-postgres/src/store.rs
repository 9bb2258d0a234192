//! [`PostgresStore`], the PostgreSQL implementation of [`HashStore`].

use hashr_core::{
  Digest, Error, HashStore, Payload, Result, Sample, SampleSource, Source, Table,
};
use sqlx::{
  Connection as _, Executor as _, PgConnection, Row as _,
  postgres::PgRow,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
  PostgresConfig,
  schema::{TABLE_EXISTS, create_table},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A hashr catalog stored in PostgreSQL.
///
/// Holds exactly one connection; the client is a one-shot tool with no
/// internal parallelism. Statements are serialised through the mutex.
pub struct PostgresStore {
  pub(crate) conn: Mutex<PgConnection>,
}

impl PostgresStore {
  /// Connect without touching the schema.
  ///
  /// A single attempt is made. The driver's error (refused, authentication,
  /// unknown database) is carried as the source of [`Error::Connection`].
  pub async fn connect(config: &PostgresConfig) -> Result<Self> {
    debug!(
      host = %config.host,
      port = config.port,
      dbname = %config.dbname,
      "connecting to postgres"
    );
    let conn = PgConnection::connect_with(&config.connect_options())
      .await
      .map_err(Error::connection)?;
    Ok(Self::from_connection(conn))
  }

  /// Connect and provision any missing table.
  pub async fn initialize(config: &PostgresConfig) -> Result<Self> {
    let store = Self::connect(config).await?;
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) fn from_connection(conn: PgConnection) -> Self {
    Self { conn: Mutex::new(conn) }
  }

  /// Terminate the session cleanly.
  pub async fn close(self) -> Result<()> {
    self.conn.into_inner().close().await.map_err(Error::connection)
  }

  async fn require(&self, table: Table) -> Result<()> {
    if self.table_exists(table).await? {
      Ok(())
    } else {
      Err(Error::TableMissing(table))
    }
  }

  async fn row_exists(&self, table: Table, digest: &Digest) -> Result<bool> {
    self.require(table).await?;

    let sql = format!("SELECT sha256 FROM {} WHERE sha256 = $1", table.name());
    let row = sqlx::query(&sql)
      .bind(digest.as_str())
      .fetch_optional(&mut *self.conn.lock().await)
      .await
      .map_err(Error::query)?;
    Ok(row.is_some())
  }
}

// ─── Row decoding ────────────────────────────────────────────────────────────

fn read_sample(row: &PgRow) -> sqlx::Result<Sample> {
  Ok(Sample {
    sha256:      row.try_get::<String, _>(0)?.into(),
    mimetype:    row.try_get::<Option<String>, _>(1)?.unwrap_or_default(),
    file_output: row.try_get::<Option<String>, _>(2)?.unwrap_or_default(),
    size:        row.try_get::<Option<i32>, _>(3)?.map(i64::from).unwrap_or_default(),
  })
}

fn read_source(row: &PgRow) -> sqlx::Result<Source> {
  Ok(Source {
    sha256:             row.try_get::<String, _>(0)?.into(),
    source_ids:         row.try_get::<Option<Vec<String>>, _>(1)?.unwrap_or_default(),
    source_path:        row.try_get::<Option<String>, _>(2)?.unwrap_or_default(),
    source_description: row.try_get::<Option<String>, _>(3)?.unwrap_or_default(),
    repo_name:          row.try_get::<Option<String>, _>(4)?.unwrap_or_default(),
    repo_path:          row.try_get::<Option<String>, _>(5)?.unwrap_or_default(),
  })
}

fn read_sample_source(row: &PgRow) -> sqlx::Result<SampleSource> {
  Ok(SampleSource {
    sample_sha256: row.try_get::<String, _>(0)?.into(),
    source_sha256: row.try_get::<String, _>(1)?.into(),
    sample_paths:  row.try_get::<Option<Vec<String>>, _>(2)?.unwrap_or_default(),
  })
}

// ─── HashStore impl ──────────────────────────────────────────────────────────

impl HashStore for PostgresStore {
  fn name(&self) -> &'static str { "postgres" }

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn table_exists(&self, table: Table) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(TABLE_EXISTS)
      .bind(table.name())
      .fetch_one(&mut *self.conn.lock().await)
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
      let mut conn = self.conn.lock().await;
      conn
        .execute(sqlx::raw_sql(create_table(table)))
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

    let rows = sqlx::query("SELECT sha256, mimetype, file_output, size FROM samples")
      .fetch_all(&mut *self.conn.lock().await)
      .await
      .map_err(Error::query)?;

    rows
      .iter()
      .map(read_sample)
      .collect::<sqlx::Result<Vec<_>>>()
      .map_err(Error::query)
  }

  async fn get_sample(&self, digest: &Digest) -> Result<Sample> {
    self.require(Table::Samples).await?;

    let row = sqlx::query(
      "SELECT sha256, mimetype, file_output, size FROM samples WHERE sha256 = $1",
    )
    .bind(digest.as_str())
    .fetch_optional(&mut *self.conn.lock().await)
    .await
    .map_err(Error::query)?;

    match row {
      Some(row) => read_sample(&row).map_err(Error::query),
      None => Err(Error::not_found(Table::Samples, digest)),
    }
  }

  async fn get_payload(&self, digest: &Digest) -> Result<Payload> {
    self.require(Table::Payloads).await?;

    let bytes: Option<Option<Vec<u8>>> =
      sqlx::query_scalar("SELECT payload FROM payloads WHERE sha256 = $1")
        .bind(digest.as_str())
        .fetch_optional(&mut *self.conn.lock().await)
        .await
        .map_err(Error::query)?;

    match bytes {
      Some(bytes) => Ok(Payload {
        sha256:  digest.clone(),
        payload: bytes.unwrap_or_default(),
      }),
      None => Err(Error::not_found(Table::Payloads, digest)),
    }
  }

  async fn get_source(&self, digest: &Digest) -> Result<Source> {
    self.require(Table::Sources).await?;

    let row = sqlx::query(
      "SELECT sha256, sourceID, sourcePath, sourceDescription, repoName, repoPath
       FROM sources WHERE sha256 = $1",
    )
    .bind(digest.as_str())
    .fetch_optional(&mut *self.conn.lock().await)
    .await
    .map_err(Error::query)?;

    match row {
      Some(row) => read_source(&row).map_err(Error::query),
      None => Err(Error::not_found(Table::Sources, digest)),
    }
  }

  async fn get_sample_sources(&self, sample: &Digest) -> Result<Vec<SampleSource>> {
    self.require(Table::SamplesSources).await?;

    let rows = sqlx::query(
      "SELECT sample_sha256, source_sha256, sample_paths
       FROM samples_sources WHERE sample_sha256 = $1",
    )
    .bind(sample.as_str())
    .fetch_all(&mut *self.conn.lock().await)
    .await
    .map_err(Error::query)?;

    rows
      .iter()
      .map(read_sample_source)
      .collect::<sqlx::Result<Vec<_>>>()
      .map_err(Error::query)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_sample(&self, sample: &Sample) -> Result<()> {
    self.require(Table::Samples).await?;

    let size = i32::try_from(sample.size).map_err(|_| {
      Error::query(format!(
        "sample {} is {} bytes, beyond the INT size column",
        sample.sha256, sample.size
      ))
    })?;

    let done = sqlx::query(
      "INSERT INTO samples (sha256, mimetype, file_output, size)
       VALUES ($1, $2, $3, $4)
       ON CONFLICT DO NOTHING",
    )
    .bind(sample.sha256.as_str())
    .bind(&sample.mimetype)
    .bind(&sample.file_output)
    .bind(size)
    .execute(&mut *self.conn.lock().await)
    .await
    .map_err(Error::query)?;

    debug!(inserted = done.rows_affected(), "insert sample");
    Ok(())
  }

  async fn insert_payload(&self, payload: &Payload) -> Result<()> {
    self.require(Table::Payloads).await?;

    sqlx::query(
      "INSERT INTO payloads (sha256, payload) VALUES ($1, $2)
       ON CONFLICT DO NOTHING",
    )
    .bind(payload.sha256.as_str())
    .bind(&payload.payload)
    .execute(&mut *self.conn.lock().await)
    .await
    .map_err(Error::query)?;
    Ok(())
  }

  async fn insert_source(&self, source: &Source) -> Result<()> {
    self.require(Table::Sources).await?;

    sqlx::query(
      "INSERT INTO sources (
         sha256, sourceID, sourcePath, sourceDescription, repoName, repoPath
       ) VALUES ($1, $2, $3, $4, $5, $6)
       ON CONFLICT DO NOTHING",
    )
    .bind(source.sha256.as_str())
    .bind(&source.source_ids)
    .bind(&source.source_path)
    .bind(&source.source_description)
    .bind(&source.repo_name)
    .bind(&source.repo_path)
    .execute(&mut *self.conn.lock().await)
    .await
    .map_err(Error::query)?;
    Ok(())
  }

  async fn link_sample_source(&self, link: &SampleSource) -> Result<()> {
    self.require(Table::SamplesSources).await?;

    sqlx::query(
      "INSERT INTO samples_sources (sample_sha256, source_sha256, sample_paths)
       VALUES ($1, $2, $3)
       ON CONFLICT DO NOTHING",
    )
    .bind(link.sample_sha256.as_str())
    .bind(link.source_sha256.as_str())
    .bind(&link.sample_paths)
    .execute(&mut *self.conn.lock().await)
    .await
    .map_err(Error::query)?;
    Ok(())
  }
}
