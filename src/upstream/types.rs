use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

use super::api_types::deserialize_lenient_number;

/// Catalog identity; the database hands out integers but nothing forbids strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum ProjectId {
  Number(i64),
  Text(String),
}

impl fmt::Display for ProjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Number(n) => write!(f, "{}", n),
      Self::Text(s) => f.write_str(s),
    }
  }
}

/// One portfolio entry from the upstream catalog
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub id: ProjectId,
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default, alias = "live_url")]
  pub live_url: Option<String>,
  #[serde(
    default,
    alias = "model_accuracy",
    deserialize_with = "deserialize_lenient_number"
  )]
  pub model_accuracy: Option<f64>,
  #[serde(
    default,
    alias = "model_features",
    deserialize_with = "deserialize_lenient_number"
  )]
  pub model_features: Option<f64>,
}

/// The project list exactly as fetched.
///
/// Equality is structural: same length and same JSON serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
  records: Vec<Value>,
}

impl Catalog {
  pub fn new(records: Vec<Value>) -> Self {
    Self { records }
  }

  #[cfg(test)]
  pub fn records(&self) -> &[Value] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Serialize to the JSON text kept in the cache slot.
  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string(&self.records)
  }

  pub fn from_json(text: &str) -> serde_json::Result<Self> {
    serde_json::from_str(text).map(Self::new)
  }

  /// Hex SHA-256 of the serialized catalog
  pub fn digest(&self) -> String {
    let text = self.to_json().unwrap_or_default();
    hex::encode(Sha256::digest(text.as_bytes()))
  }

  pub fn same_as(&self, other: &Catalog) -> bool {
    if self.len() != other.len() {
      return false;
    }
    match (self.to_json(), other.to_json()) {
      (Ok(a), Ok(b)) => a == b,
      _ => false,
    }
  }

  /// Decode every record into a `Project`, skipping (and logging) the ones that don't fit.
  pub fn projects(&self) -> Vec<Project> {
    self
      .records
      .iter()
      .filter_map(|record| match Project::deserialize(record) {
        Ok(project) => Some(project),
        Err(e) => {
          tracing::warn!(error = %e, "skipping undecodable catalog record");
          None
        }
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_project_accepts_camel_and_snake_case() {
    let camel: Project = serde_json::from_value(json!({
      "id": 1,
      "title": "Heart",
      "category": "Machine Learning",
      "liveUrl": "https://x/heart-disease-prediction",
      "modelAccuracy": 92,
      "modelFeatures": 8
    }))
    .unwrap();
    let snake: Project = serde_json::from_value(json!({
      "id": 1,
      "title": "Heart",
      "category": "Machine Learning",
      "live_url": "https://x/heart-disease-prediction",
      "model_accuracy": "92",
      "model_features": 8.0
    }))
    .unwrap();
    assert_eq!(camel, snake);
    assert_eq!(camel.model_accuracy, Some(92.0));
  }

  #[test]
  fn test_project_tolerates_nulls_and_missing_fields() {
    let project: Project = serde_json::from_value(json!({
      "id": "abc",
      "title": null,
      "modelAccuracy": null,
      "modelFeatures": "not a number"
    }))
    .unwrap();
    assert_eq!(project.id, ProjectId::Text("abc".to_string()));
    assert_eq!(project.title, None);
    assert_eq!(project.live_url, None);
    assert_eq!(project.model_accuracy, None);
    assert_eq!(project.model_features, None);

    let odd: Project = serde_json::from_value(json!({
      "id": 7,
      "category": "Machine Learning",
      "liveUrl": "https://x/model-7",
      "modelAccuracy": true,
      "modelFeatures": {"count": 8}
    }))
    .unwrap();
    assert_eq!(odd.model_accuracy, None);
    assert_eq!(odd.model_features, None);
    assert_eq!(odd.live_url.as_deref(), Some("https://x/model-7"));
  }

  #[test]
  fn test_same_as_compares_serialized_content() {
    let a = Catalog::new(vec![json!({"id": 1, "title": "A"})]);
    let a2 = Catalog::new(vec![json!({"title": "A", "id": 1})]);
    let b = Catalog::new(vec![json!({"id": 1, "title": "B"})]);
    let longer = Catalog::new(vec![json!({"id": 1, "title": "A"}), json!({"id": 2})]);

    assert!(a.same_as(&a2));
    assert!(!a.same_as(&b));
    assert!(!a.same_as(&longer));
    assert!(!a.is_empty());
    assert!(Catalog::default().is_empty());
    assert_eq!(a.digest(), a2.digest());
    assert_ne!(a.digest(), b.digest());
  }

  #[test]
  fn test_projects_skips_bad_records() {
    let catalog = Catalog::new(vec![json!({"id": 1}), json!("junk"), json!({"title": "no id"})]);
    let projects = catalog.projects();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, ProjectId::Number(1));
  }

  #[test]
  fn test_json_text_round_trips_through_cache_format() {
    let catalog = Catalog::new(vec![json!({"id": 1, "title": "Heart"})]);
    let text = catalog.to_json().unwrap();
    assert_eq!(text, r#"[{"id":1,"title":"Heart"}]"#);
    assert!(Catalog::from_json(&text).unwrap().same_as(&catalog));
  }
}
