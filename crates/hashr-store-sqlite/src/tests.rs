//! Integration tests for `SqliteStore` against an in-memory database.

use hashr_core::{
  Digest, Error, HashStore, Payload, Sample, SampleSource, Source, Table,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn drop_table(s: &SqliteStore, table: Table) {
  let sql = format!("DROP TABLE {}", table.name());
  s.conn
    .call(move |conn| {
      conn.execute_batch(&sql)?;
      Ok(())
    })
    .await
    .unwrap();
}

fn example_sample() -> Sample {
  Sample {
    sha256:      "abc123".into(),
    mimetype:    "text/plain".into(),
    file_output: "ASCII text".into(),
    size:        42,
  }
}

fn example_source(digest: &str) -> Source {
  Source {
    sha256:             digest.into(),
    source_ids:         vec!["ubuntu-22.04".into(), "disk-0".into()],
    source_path:        "gs://images/ubuntu-22.04.tar.gz".into(),
    source_description: "Ubuntu 22.04 base image".into(),
    repo_name:          "gcp-images".into(),
    repo_path:          "/projects/ubuntu-os-cloud".into(),
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn open_creates_all_tables() {
  let s = store().await;
  for table in Table::ALL {
    assert!(s.table_exists(table).await.unwrap(), "{table} missing");
  }
}

#[tokio::test]
async fn init_schema_twice_is_idempotent() {
  let s = store().await;
  s.insert_sample(&example_sample()).await.unwrap();

  s.init_schema().await.unwrap();
  s.init_schema().await.unwrap();

  // Existing rows survive; nothing was recreated.
  assert_eq!(s.get_samples().await.unwrap().len(), 1);

  let count: i64 = s
    .conn
    .call(|conn| {
      Ok(conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
        [],
        |r| r.get(0),
      )?)
    })
    .await
    .unwrap();
  assert_eq!(count, 4);
}

#[tokio::test]
async fn init_schema_recreates_dropped_table() {
  let s = store().await;
  drop_table(&s, Table::SamplesSources).await;
  assert!(!s.table_exists(Table::SamplesSources).await.unwrap());

  s.init_schema().await.unwrap();
  assert!(s.table_exists(Table::SamplesSources).await.unwrap());
}

#[tokio::test]
async fn reads_report_missing_table() {
  let s = store().await;
  drop_table(&s, Table::Samples).await;

  let err = s.get_samples().await.unwrap_err();
  assert!(matches!(err, Error::TableMissing(Table::Samples)));

  let err = s.get_sample(&"abc123".into()).await.unwrap_err();
  assert!(matches!(err, Error::TableMissing(Table::Samples)));

  let err = s.sample_exists(&"abc123".into()).await.unwrap_err();
  assert!(matches!(err, Error::TableMissing(Table::Samples)));
}

#[tokio::test]
async fn open_file_store_reuses_existing_tables() {
  let dir = std::env::temp_dir().join(format!("hashr-sqlite-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("catalog.sqlite3");
  let _ = std::fs::remove_file(&path);

  let first = SqliteStore::open(&path).await.unwrap();
  first.insert_sample(&example_sample()).await.unwrap();
  drop(first);

  let second = SqliteStore::open(&path).await.unwrap();
  assert!(second.sample_exists(&"abc123".into()).await.unwrap());

  drop(second);
  std::fs::remove_dir_all(&dir).ok();
}

// ─── Samples ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sample_exists_after_insert() {
  let s = store().await;
  let digest = Digest::from("abc123");

  assert!(!s.sample_exists(&digest).await.unwrap());
  s.insert_sample(&example_sample()).await.unwrap();
  assert!(s.sample_exists(&digest).await.unwrap());
}

#[tokio::test]
async fn get_sample_returns_inserted_record() {
  let s = store().await;
  s.insert_sample(&example_sample()).await.unwrap();

  let fetched = s.get_sample(&"abc123".into()).await.unwrap();
  assert_eq!(fetched, example_sample());

  let all = s.get_samples().await.unwrap();
  assert_eq!(all, vec![example_sample()]);
}

#[tokio::test]
async fn get_sample_missing_is_not_found() {
  let s = store().await;
  s.insert_sample(&example_sample()).await.unwrap();

  let err = s.get_sample(&"zzz999".into()).await.unwrap_err();
  assert!(
    matches!(&err, Error::NotFound { table: Table::Samples, digest } if digest.as_str() == "zzz999"),
    "unexpected error: {err}"
  );
}

#[tokio::test]
async fn get_samples_counts_rows() {
  let s = store().await;
  assert!(s.get_samples().await.unwrap().is_empty());

  s.insert_sample(&example_sample()).await.unwrap();
  assert_eq!(s.get_samples().await.unwrap().len(), 1);

  for content in ["one", "two", "three"] {
    let sample = Sample::describe(content.as_bytes(), "text/plain", "ASCII text");
    s.insert_sample(&sample).await.unwrap();
  }
  assert_eq!(s.get_samples().await.unwrap().len(), 4);
}

#[tokio::test]
async fn duplicate_sample_insert_is_ignored() {
  let s = store().await;
  s.insert_sample(&example_sample()).await.unwrap();

  let mut changed = example_sample();
  changed.mimetype = "application/octet-stream".into();
  s.insert_sample(&changed).await.unwrap();

  let all = s.get_samples().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].mimetype, "text/plain");
}

// ─── Payloads ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn payload_roundtrip() {
  let s = store().await;
  let bytes = vec![0u8, 159, 146, 150, 255];
  let payload = Payload::new(bytes.clone());

  s.insert_payload(&payload).await.unwrap();
  let fetched = s.get_payload(&payload.sha256).await.unwrap();
  assert_eq!(fetched.payload, bytes);
  assert_eq!(fetched.sha256, Digest::of(&bytes));

  let err = s.get_payload(&"zzz999".into()).await.unwrap_err();
  assert!(err.is_not_found());
}

// ─── Sources and links ───────────────────────────────────────────────────────

#[tokio::test]
async fn source_exists_after_insert() {
  let s = store().await;
  let digest = Digest::from("src001");

  assert!(!s.source_exists(&digest).await.unwrap());
  s.insert_source(&example_source("src001")).await.unwrap();
  assert!(s.source_exists(&digest).await.unwrap());

  let fetched = s.get_source(&digest).await.unwrap();
  assert_eq!(fetched, example_source("src001"));
}

#[tokio::test]
async fn link_records_paths_in_order() {
  let s = store().await;
  s.insert_sample(&example_sample()).await.unwrap();
  s.insert_source(&example_source("src001")).await.unwrap();

  let link = SampleSource {
    sample_sha256: "abc123".into(),
    source_sha256: "src001".into(),
    sample_paths:  vec!["/usr/bin/z".into(), "/bin/a".into()],
  };
  s.link_sample_source(&link).await.unwrap();

  let links = s.get_sample_sources(&"abc123".into()).await.unwrap();
  assert_eq!(links, vec![link]);

  assert!(s.get_sample_sources(&"zzz999".into()).await.unwrap().is_empty());
}

#[tokio::test]
async fn link_to_unknown_sample_is_rejected() {
  let s = store().await;
  s.insert_source(&example_source("src001")).await.unwrap();

  let err = s
    .link_sample_source(&SampleSource {
      sample_sha256: "nosuchsample".into(),
      source_sha256: "src001".into(),
      sample_paths:  vec!["/etc/passwd".into()],
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Query(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn link_to_unknown_source_is_rejected() {
  let s = store().await;
  s.insert_sample(&example_sample()).await.unwrap();

  let err = s
    .link_sample_source(&SampleSource {
      sample_sha256: "abc123".into(),
      source_sha256: "nosuchsource".into(),
      sample_paths:  vec![],
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Query(_)), "unexpected error: {err}");
  assert!(s.get_sample_sources(&"abc123".into()).await.unwrap().is_empty());
}
