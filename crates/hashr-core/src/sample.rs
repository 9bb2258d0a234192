//! Samples and their payloads.
//!
//! A sample is a unique piece of content, keyed by the SHA-256 of its bytes.
//! It is created once and never updated or deleted; the raw bytes live in a
//! separate one-to-one `payloads` row.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Digest;

/// A row of the `samples` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
  pub sha256:      Digest,
  pub mimetype:    String,
  /// Free-text description, typically the output of a file-type classifier.
  pub file_output: String,
  /// Size in bytes.
  pub size:        i64,
}

impl Sample {
  /// Describe `bytes` as a sample; digest and size are derived from the
  /// content.
  pub fn describe(
    bytes: &[u8],
    mimetype: impl Into<String>,
    file_output: impl Into<String>,
  ) -> Self {
    Self {
      sha256:      Digest::of(bytes),
      mimetype:    mimetype.into(),
      file_output: file_output.into(),
      size:        bytes.len() as i64,
    }
  }
}

impl fmt::Display for Sample {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} {} {} bytes ({})",
      self.sha256, self.mimetype, self.size, self.file_output
    )
  }
}

/// A row of the `payloads` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
  pub sha256:  Digest,
  pub payload: Vec<u8>,
}

impl Payload {
  pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
    let payload = bytes.into();
    Self { sha256: Digest::of(&payload), payload }
  }
}
