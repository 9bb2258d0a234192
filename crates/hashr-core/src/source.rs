//! Sources (where samples were extracted from) and the association rows
//! linking samples to them.

use serde::{Deserialize, Serialize};

use crate::Digest;

/// A provenance origin, e.g. an extracted filesystem image or a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
  pub sha256:             Digest,
  /// Identifiers of the origin, in the order the importer reported them.
  pub source_ids:         Vec<String>,
  pub source_path:        String,
  pub source_description: String,
  pub repo_name:          String,
  pub repo_path:          String,
}

/// "This sample appeared at these paths within this source."
///
/// Both digests must reference existing rows; the backend's referential
/// constraints reject the link otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSource {
  pub sample_sha256: Digest,
  pub source_sha256: Digest,
  pub sample_paths:  Vec<String>,
}
