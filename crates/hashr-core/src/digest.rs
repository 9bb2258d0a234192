//! Content digests, the primary key of every catalog table.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// A lowercase hex SHA-256 digest identifying a sample or a source.
///
/// Identical bytes always produce the same digest, which is what makes
/// inserts into the catalog idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
  /// Hash `bytes` with SHA-256.
  pub fn of(bytes: impl AsRef<[u8]>) -> Self {
    Self(hex::encode(Sha256::digest(bytes.as_ref())))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Digest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<String> for Digest {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for Digest {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl AsRef<str> for Digest {
  fn as_ref(&self) -> &str { &self.0 }
}
