//! Retrieval front-end for the hashr sample catalog.
//!
//! Turns an operator request ("list everything" or "get one digest") into
//! [`HashStore`] calls and renders the result as text or JSON. Any store
//! error is handed back unchanged; the binary treats all of them as fatal.

pub mod settings;

pub use settings::{ClientConfig, StorageKind};

use hashr_core::{Digest, Error, HashStore, Result, Sample};
use hashr_store_postgres::PostgresStore;
use hashr_store_sqlite::SqliteStore;
use tracing::{debug, info};

// ─── Request ──────────────────────────────────────────────────────────────────

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
  List,
  Get(Digest),
}

impl Request {
  /// An absent or blank digest selects list mode.
  pub fn from_digest(digest: Option<String>) -> Self {
    match digest {
      Some(d) if !d.trim().is_empty() => Request::Get(d.trim().into()),
      _ => Request::List,
    }
  }
}

// ─── Output ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
  Samples(Vec<Sample>),
  Sample(Sample),
}

impl Output {
  pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
    match (format, self) {
      (OutputFormat::Text, Output::Samples(samples)) if samples.is_empty() => {
        Ok("no samples".to_string())
      }
      (OutputFormat::Text, Output::Samples(samples)) => Ok(
        samples
          .iter()
          .map(Sample::to_string)
          .collect::<Vec<_>>()
          .join("\n"),
      ),
      (OutputFormat::Text, Output::Sample(sample)) => Ok(sample.to_string()),
      (OutputFormat::Json, Output::Samples(samples)) => {
        serde_json::to_string_pretty(samples)
      }
      (OutputFormat::Json, Output::Sample(sample)) => {
        serde_json::to_string_pretty(sample)
      }
    }
  }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Run `request` against any backend.
pub async fn execute<S: HashStore>(store: &S, request: &Request) -> Result<Output> {
  match request {
    Request::List => {
      let samples = store.get_samples().await?;
      info!(store = store.name(), count = samples.len(), "listed samples");
      Ok(Output::Samples(samples))
    }
    Request::Get(digest) => {
      let sample = store.get_sample(digest).await?;
      info!(store = store.name(), %digest, "fetched sample");
      Ok(Output::Sample(sample))
    }
  }
}

/// Open the configured store, provision its schema, and run `request`.
pub async fn run(config: &ClientConfig, request: &Request) -> Result<Output> {
  config.validate()?;

  match config.storage()? {
    StorageKind::Postgres => {
      let store = PostgresStore::initialize(&config.postgres).await?;
      let output = execute(&store, request).await;
      store.close().await?;
      output
    }
    StorageKind::Sqlite => {
      std::fs::create_dir_all(&config.cache_dir).map_err(Error::connection)?;
      let path = config.sqlite_path();
      debug!(path = %path.display(), "using embedded catalog");
      let store = SqliteStore::open(&path).await?;
      execute(&store, request).await
    }
    StorageKind::CloudSpanner => Err(Error::Configuration(
      "cloudspanner storage is reserved and not implemented".into(),
    )),
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
