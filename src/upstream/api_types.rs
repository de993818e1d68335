//! Serde-deserializable types matching upstream catalog responses.
//!
//! Records are kept as raw JSON values so the cached text stays the catalog
//! as the upstream sent it; typed decoding happens in `types::Project`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ============================================================================
// Portfolio catalog endpoint response
// ============================================================================

/// `GET /project/projects_data` answers `{ "data": [...] }`; older
/// deployments return the bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiCatalogResponse {
  Envelope { data: Vec<Value> },
  Bare(Vec<Value>),
}

impl ApiCatalogResponse {
  pub fn into_records(self) -> Vec<Value> {
    match self {
      Self::Envelope { data } => data,
      Self::Bare(records) => records,
    }
  }
}

// ============================================================================
// Lenient field decoding
// ============================================================================

/// Accept a JSON number or a numeric string ("92.50" from a DECIMAL column).
/// Anything else reads as missing.
pub fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
  }

  let raw: Option<Raw> = Option::deserialize(deserializer)?;
  Ok(match raw {
    Some(Raw::Number(n)) => Some(n),
    Some(Raw::Text(s)) => s.trim().parse().ok(),
    Some(Raw::Other(_)) | None => None,
  })
}
