//! Conversions between catalog types and the values stored in SQLite
//! columns.
//!
//! Ordered string sequences (`sourceID`, `sample_paths`) are stored as
//! compact JSON arrays. Nullable text columns decode to empty strings.

use hashr_core::{Error, Result, SampleSource, Source};

pub fn encode_strings(items: &[String]) -> Result<String> {
  serde_json::to_string(items).map_err(Error::query)
}

pub fn decode_strings(s: Option<&str>) -> Result<Vec<String>> {
  match s {
    Some(s) => serde_json::from_str(s).map_err(Error::query),
    None => Ok(Vec::new()),
  }
}

/// Raw values read directly from a `sources` row.
pub struct RawSource {
  pub sha256:             String,
  pub source_ids:         Option<String>,
  pub source_path:        Option<String>,
  pub source_description: Option<String>,
  pub repo_name:          Option<String>,
  pub repo_path:          Option<String>,
}

impl RawSource {
  pub fn into_source(self) -> Result<Source> {
    Ok(Source {
      sha256:             self.sha256.into(),
      source_ids:         decode_strings(self.source_ids.as_deref())?,
      source_path:        self.source_path.unwrap_or_default(),
      source_description: self.source_description.unwrap_or_default(),
      repo_name:          self.repo_name.unwrap_or_default(),
      repo_path:          self.repo_path.unwrap_or_default(),
    })
  }
}

/// Raw values read directly from a `samples_sources` row.
pub struct RawSampleSource {
  pub sample_sha256: String,
  pub source_sha256: String,
  pub sample_paths:  Option<String>,
}

impl RawSampleSource {
  pub fn into_sample_source(self) -> Result<SampleSource> {
    Ok(SampleSource {
      sample_sha256: self.sample_sha256.into(),
      source_sha256: self.source_sha256.into(),
      sample_paths:  decode_strings(self.sample_paths.as_deref())?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn null_sequence_decodes_empty() {
    assert!(decode_strings(None).unwrap().is_empty());
  }

  #[test]
  fn sequence_order_is_preserved() {
    let paths = vec!["/b".to_string(), "/a".to_string(), "/c".to_string()];
    let encoded = encode_strings(&paths).unwrap();
    assert_eq!(encoded, r#"["/b","/a","/c"]"#);
    assert_eq!(decode_strings(Some(&encoded)).unwrap(), paths);
  }

  #[test]
  fn malformed_sequence_is_a_query_error() {
    assert!(matches!(decode_strings(Some("not json")), Err(Error::Query(_))));
  }
}
