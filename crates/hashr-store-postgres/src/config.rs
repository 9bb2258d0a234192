//! Connection parameters.

use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Where the PostgreSQL catalog lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
  pub host:     String,
  pub port:     u16,
  pub user:     String,
  pub password: String,
  pub dbname:   String,
}

impl Default for PostgresConfig {
  fn default() -> Self {
    Self {
      host:     "localhost".to_string(),
      port:     5432,
      user:     "hashr".to_string(),
      password: "hashr".to_string(),
      dbname:   "hashr".to_string(),
    }
  }
}

impl PostgresConfig {
  pub(crate) fn connect_options(&self) -> PgConnectOptions {
    PgConnectOptions::new()
      .host(&self.host)
      .port(self.port)
      .username(&self.user)
      .password(&self.password)
      .database(&self.dbname)
      .ssl_mode(PgSslMode::Disable)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_target_local_hashr_database() {
    let cfg = PostgresConfig::default();
    let opts = cfg.connect_options();
    assert_eq!(opts.get_host(), "localhost");
    assert_eq!(opts.get_port(), 5432);
    assert_eq!(opts.get_username(), "hashr");
    assert_eq!(opts.get_database(), Some("hashr"));
  }
}
