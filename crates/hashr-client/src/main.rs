//! hashr-client binary.
//!
//! Lists every sample in the catalog, or prints a single sample when
//! `--get-sample` names a digest.
//!
//! # Usage
//!
//! ```
//! hashr-client --hash-storage postgres --postgres-host db.internal
//! hashr-client --hash-storage postgres --get-sample <sha256>
//! hashr-client --config /etc/hashr/client.toml --format json
//! ```
//!
//! Settings are read from the TOML file, then `HASHR_*` environment
//! variables (`HASHR_POSTGRES__HOST` for nested keys), then flags.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use hashr_client::{
  ClientConfig, OutputFormat, Request, StorageKind,
  settings::{DEFAULT_CONFIG_FILE, Overrides},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Query the hashr sample catalog")]
struct Cli {
  /// Path to the TOML configuration file; must exist unless left default.
  #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
  config: PathBuf,

  /// Storage used for computed hashes.
  #[arg(long, value_enum)]
  hash_storage: Option<StorageKind>,

  /// Path to the local cache directory.
  #[arg(long)]
  cache_dir: Option<PathBuf>,

  /// Path to the Cloud Spanner database (reserved).
  #[arg(long)]
  spanner_db_path: Option<String>,

  /// PostgreSQL instance address.
  #[arg(long)]
  postgres_host: Option<String>,

  /// PostgreSQL instance port.
  #[arg(long)]
  postgres_port: Option<u16>,

  /// PostgreSQL user.
  #[arg(long)]
  postgres_user: Option<String>,

  /// PostgreSQL password.
  #[arg(long)]
  postgres_password: Option<String>,

  /// PostgreSQL database.
  #[arg(long)]
  postgres_db: Option<String>,

  /// SHA-256 of the sample to retrieve; all samples are listed if omitted.
  #[arg(long)]
  get_sample: Option<String>,

  /// Output format.
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  format: OutputFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout carries the rendered samples.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let overrides = Overrides {
    hash_storage:      cli.hash_storage,
    cache_dir:         cli.cache_dir,
    spanner_db_path:   cli.spanner_db_path,
    postgres_host:     cli.postgres_host,
    postgres_port:     cli.postgres_port,
    postgres_user:     cli.postgres_user,
    postgres_password: cli.postgres_password,
    postgres_db:       cli.postgres_db,
  };
  let client_cfg = ClientConfig::load(&cli.config, overrides)
    .context("invalid client configuration")?;

  let request = Request::from_digest(cli.get_sample);
  let output = hashr_client::run(&client_cfg, &request)
    .await
    .context("error retrieving samples")?;

  println!("{}", output.render(cli.format)?);
  Ok(())
}
