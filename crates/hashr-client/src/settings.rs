//! Client configuration: which backing store to use and how to reach it.
//!
//! Values are layered (TOML file, `HASHR_` environment variables, then
//! command-line flags) and validated here before any connection is
//! attempted.

use std::path::{Path, PathBuf};

use config::{ConfigError, Environment, File, Map};
use hashr_core::{Error, Result};
use hashr_store_postgres::PostgresConfig;
use serde::Deserialize;
use strum::{Display, EnumString};

/// Config file read when `--config` is not given. It may be absent.
pub const DEFAULT_CONFIG_FILE: &str = "hashr.toml";

/// File name of the embedded catalog inside the cache directory.
pub const SQLITE_FILE_NAME: &str = "hashr.sqlite3";

/// Backing store selector.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageKind {
  Postgres,
  /// Embedded catalog stored under the cache directory.
  Sqlite,
  /// Reserved. Selecting it is a configuration error.
  #[value(name = "cloudspanner")]
  CloudSpanner,
}

fn default_cache_dir() -> PathBuf { PathBuf::from("/tmp/") }

/// Runtime configuration of the retrieval client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
  /// No default: the operator must choose.
  #[serde(default)]
  pub hash_storage:    Option<StorageKind>,
  #[serde(default = "default_cache_dir")]
  pub cache_dir:       PathBuf,
  /// Accepted for the reserved `cloudspanner` store; otherwise unused.
  #[serde(default)]
  pub spanner_db_path: Option<String>,
  #[serde(default)]
  pub postgres:        PostgresConfig,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      hash_storage:    None,
      cache_dir:       default_cache_dir(),
      spanner_db_path: None,
      postgres:        PostgresConfig::default(),
    }
  }
}

/// Values given on the command line; each one beats the file and the
/// environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub hash_storage:      Option<StorageKind>,
  pub cache_dir:         Option<PathBuf>,
  pub spanner_db_path:   Option<String>,
  pub postgres_host:     Option<String>,
  pub postgres_port:     Option<u16>,
  pub postgres_user:     Option<String>,
  pub postgres_password: Option<String>,
  pub postgres_db:       Option<String>,
}

fn layered(
  path: &Path,
  env: Option<Map<String, String>>,
  overrides: Overrides,
) -> std::result::Result<config::Config, ConfigError> {
  // Only the implicit default may be missing.
  let required = path != Path::new(DEFAULT_CONFIG_FILE);

  config::Config::builder()
    .add_source(File::from(path).required(required))
    .add_source(
      Environment::with_prefix("HASHR")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .source(env),
    )
    .set_override_option("hash_storage", overrides.hash_storage.map(|k| k.to_string()))?
    .set_override_option(
      "cache_dir",
      overrides.cache_dir.map(|p| p.to_string_lossy().into_owned()),
    )?
    .set_override_option("spanner_db_path", overrides.spanner_db_path)?
    .set_override_option("postgres.host", overrides.postgres_host)?
    .set_override_option("postgres.port", overrides.postgres_port.map(i64::from))?
    .set_override_option("postgres.user", overrides.postgres_user)?
    .set_override_option("postgres.password", overrides.postgres_password)?
    .set_override_option("postgres.dbname", overrides.postgres_db)?
    .build()
}

impl ClientConfig {
  /// Layer `path`, the process environment and `overrides`, then validate.
  pub fn load(path: &Path, overrides: Overrides) -> Result<Self> {
    Self::load_with_env(path, None, overrides)
  }

  /// As [`ClientConfig::load`], reading `HASHR_*` from `env` instead of the
  /// process environment when given.
  fn load_with_env(
    path: &Path,
    env: Option<Map<String, String>>,
    overrides: Overrides,
  ) -> Result<Self> {
    let settings = layered(path, env, overrides).map_err(|e| {
      Error::Configuration(format!("failed to read config from {}: {e}", path.display()))
    })?;
    Self::from_settings(settings)
  }

  /// Deserialise layered settings and validate them.
  pub fn from_settings(settings: config::Config) -> Result<Self> {
    let cfg: Self = settings
      .try_deserialize()
      .map_err(|e| Error::Configuration(e.to_string()))?;
    cfg.validate()?;
    Ok(cfg)
  }

  /// The selected store, if it is one that can actually be opened.
  pub fn storage(&self) -> Result<StorageKind> {
    match self.hash_storage {
      None => Err(Error::Configuration(
        "hash_storage needs to have one of the values: postgres, sqlite, cloudspanner".into(),
      )),
      Some(StorageKind::CloudSpanner) => Err(Error::Configuration(
        "cloudspanner storage is reserved and not implemented".into(),
      )),
      Some(kind) => Ok(kind),
    }
  }

  /// Check every option relevant to the selected store.
  pub fn validate(&self) -> Result<()> {
    if self.cache_dir.as_os_str().is_empty() {
      return Err(Error::Configuration("cache_dir must not be empty".into()));
    }

    match self.storage()? {
      StorageKind::Postgres => {
        let pg = &self.postgres;
        for (key, value) in [
          ("postgres.host", &pg.host),
          ("postgres.user", &pg.user),
          ("postgres.dbname", &pg.dbname),
        ] {
          if value.trim().is_empty() {
            return Err(Error::Configuration(format!("{key} must not be empty")));
          }
        }
        if pg.port == 0 {
          return Err(Error::Configuration("postgres.port must be non-zero".into()));
        }
      }
      StorageKind::Sqlite | StorageKind::CloudSpanner => {}
    }
    Ok(())
  }

  /// Location of the embedded catalog used by [`StorageKind::Sqlite`].
  pub fn sqlite_path(&self) -> PathBuf { self.cache_dir.join(SQLITE_FILE_NAME) }
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  fn write_config(name: &str, toml: &str) -> PathBuf {
    let path = std::env::temp_dir()
      .join(format!("hashr-settings-{name}-{}.toml", std::process::id()));
    std::fs::write(&path, toml).unwrap();
    path
  }

  fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
    Some(
      vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    )
  }

  const FILE: &str = r#"
    hash_storage = "postgres"

    [postgres]
    host = "file-host"
    user = "file-user"
  "#;

  fn settings(toml: &str) -> config::Config {
    config::Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
  }

  #[test]
  fn storage_kind_names() {
    assert_eq!(StorageKind::CloudSpanner.to_string(), "cloudspanner");
    assert_eq!("postgres".parse::<StorageKind>().unwrap(), StorageKind::Postgres);
    assert!("mysql".parse::<StorageKind>().is_err());
  }

  #[test]
  fn postgres_settings_with_defaults() {
    let cfg = ClientConfig::from_settings(settings(
      r#"
      hash_storage = "postgres"

      [postgres]
      host = "db.internal"
      "#,
    ))
    .unwrap();

    assert_eq!(cfg.hash_storage, Some(StorageKind::Postgres));
    assert_eq!(cfg.cache_dir, PathBuf::from("/tmp/"));
    assert_eq!(cfg.postgres.host, "db.internal");
    assert_eq!(cfg.postgres.port, 5432);
    assert_eq!(cfg.postgres.dbname, "hashr");
  }

  #[test]
  fn missing_selector_is_rejected() {
    let err = ClientConfig::from_settings(settings("")).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
  }

  #[test]
  fn unknown_selector_is_rejected() {
    let err = ClientConfig::from_settings(settings(r#"hash_storage = "mysql""#)).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
  }

  #[test]
  fn cloudspanner_is_reserved() {
    let err = ClientConfig::from_settings(settings(
      r#"
      hash_storage = "cloudspanner"
      spanner_db_path = "projects/p/instances/i/databases/hashr"
      "#,
    ))
    .unwrap_err();
    assert!(
      matches!(&err, Error::Configuration(msg) if msg.contains("not implemented")),
      "{err}"
    );
  }

  #[test]
  fn zero_port_is_rejected() {
    let cfg = ClientConfig {
      hash_storage: Some(StorageKind::Postgres),
      postgres: PostgresConfig { port: 0, ..PostgresConfig::default() },
      ..ClientConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(Error::Configuration(_))));
  }

  #[test]
  fn empty_host_is_rejected() {
    let cfg = ClientConfig {
      hash_storage: Some(StorageKind::Postgres),
      postgres: PostgresConfig { host: " ".into(), ..PostgresConfig::default() },
      ..ClientConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(Error::Configuration(_))));
  }

  #[test]
  fn sqlite_catalog_lives_in_cache_dir() {
    let cfg = ClientConfig {
      hash_storage: Some(StorageKind::Sqlite),
      cache_dir: PathBuf::from("/var/cache/hashr"),
      ..ClientConfig::default()
    };
    cfg.validate().unwrap();
    assert_eq!(cfg.sqlite_path(), PathBuf::from("/var/cache/hashr/hashr.sqlite3"));
  }

  // ── Layering ────────────────────────────────────────────────────────────────

  #[test]
  fn environment_beats_file() {
    let path = write_config("env-beats-file", FILE);
    let cfg = ClientConfig::load_with_env(
      &path,
      env(&[("HASHR_POSTGRES__HOST", "env-host"), ("HASHR_POSTGRES__PORT", "55432")]),
      Overrides::default(),
    )
    .unwrap();

    assert_eq!(cfg.hash_storage, Some(StorageKind::Postgres));
    assert_eq!(cfg.postgres.host, "env-host");
    assert_eq!(cfg.postgres.port, 55432);
    assert_eq!(cfg.postgres.user, "file-user");
  }

  #[test]
  fn flag_beats_environment() {
    let path = write_config("flag-beats-env", FILE);
    let cfg = ClientConfig::load_with_env(
      &path,
      env(&[("HASHR_POSTGRES__HOST", "env-host"), ("HASHR_HASH_STORAGE", "sqlite")]),
      Overrides {
        postgres_host: Some("flag-host".into()),
        hash_storage: Some(StorageKind::Postgres),
        ..Overrides::default()
      },
    )
    .unwrap();

    assert_eq!(cfg.hash_storage, Some(StorageKind::Postgres));
    assert_eq!(cfg.postgres.host, "flag-host");
  }

  #[test]
  fn missing_default_file_is_tolerated() {
    let cfg = ClientConfig::load_with_env(
      Path::new(DEFAULT_CONFIG_FILE),
      env(&[]),
      Overrides {
        hash_storage: Some(StorageKind::Sqlite),
        cache_dir: Some(PathBuf::from("/var/cache/hashr")),
        ..Overrides::default()
      },
    )
    .unwrap();

    assert_eq!(cfg.sqlite_path(), PathBuf::from("/var/cache/hashr/hashr.sqlite3"));
  }

  #[test]
  fn missing_explicit_file_is_rejected() {
    let err = ClientConfig::load_with_env(
      Path::new("/nonexistent/hashr-client.toml"),
      env(&[]),
      Overrides {
        hash_storage: Some(StorageKind::Sqlite),
        ..Overrides::default()
      },
    )
    .unwrap_err();

    assert!(
      matches!(&err, Error::Configuration(msg) if msg.contains("/nonexistent/hashr-client.toml")),
      "{err}"
    );
  }
}
