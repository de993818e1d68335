//! Turning catalog projects into render-ready display models.

use crate::upstream::{Catalog, Project, ProjectId};

/// Only projects in this category are shown
pub const ML_CATEGORY: &str = "Machine Learning";

/// Card icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
  Activity,
  Heart,
  UserSearch,
  Home,
  ShoppingCart,
  /// Generic placeholder
  Plus,
}

/// Card accent color (gradient family)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
  Purple,
  Red,
  Amber,
  Teal,
  Gray,
}

/// Model demos with local presentation settings, keyed by their site path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownModel {
  MedicalCharge,
  HeartDisease,
  CustomerChurn,
  HousePrice,
  Uplift,
}

impl KnownModel {
  pub const ALL: [KnownModel; 5] = [
    KnownModel::MedicalCharge,
    KnownModel::HeartDisease,
    KnownModel::CustomerChurn,
    KnownModel::HousePrice,
    KnownModel::Uplift,
  ];

  pub fn path(self) -> &'static str {
    match self {
      Self::MedicalCharge => "/medical-charge-prediction",
      Self::HeartDisease => "/heart-disease-prediction",
      Self::CustomerChurn => "/customer-churn-prediction",
      Self::HousePrice => "/house-price-estimator",
      Self::Uplift => "/uplift-model",
    }
  }

  pub fn id(self) -> i64 {
    match self {
      Self::MedicalCharge => 1,
      Self::HeartDisease => 2,
      Self::CustomerChurn => 3,
      Self::HousePrice => 4,
      Self::Uplift => 5,
    }
  }

  pub fn icon(self) -> Icon {
    match self {
      Self::MedicalCharge => Icon::Activity,
      Self::HeartDisease => Icon::Heart,
      Self::CustomerChurn => Icon::UserSearch,
      Self::HousePrice => Icon::Home,
      Self::Uplift => Icon::ShoppingCart,
    }
  }

  pub fn accent(self) -> Accent {
    match self {
      Self::MedicalCharge => Accent::Purple,
      Self::HeartDisease => Accent::Red,
      Self::CustomerChurn => Accent::Amber,
      Self::HousePrice | Self::Uplift => Accent::Teal,
    }
  }

  /// Exact match on the URL path
  pub fn from_path(path: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|m| m.path() == path)
  }
}

/// One card's worth of data
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayModel {
  pub name: String,
  pub description: String,
  pub path: String,
  pub stats: String,
  pub accuracy: String,
  pub id: ProjectId,
  pub icon: Icon,
  pub color: Accent,
  pub fetched: Project,
}

/// Round a metric for display; missing or zero reads as "N/A".
fn format_metric(value: Option<f64>, suffix: &str) -> String {
  match value {
    Some(v) if v != 0.0 && v.is_finite() => format!("{}{}", v.round() as i64, suffix),
    _ => "N/A".to_string(),
  }
}

/// URL path of an eligible project's live link.
fn eligible_path(project: &Project) -> Option<String> {
  if project.category.as_deref() != Some(ML_CATEGORY) {
    return None;
  }

  let live_url = project.live_url.as_deref().map(str::trim).unwrap_or("");
  if live_url.is_empty() {
    return None;
  }

  match url::Url::parse(live_url) {
    Ok(url) => Some(url.path().to_string()),
    Err(e) => {
      tracing::warn!(id = %project.id, live_url, error = %e, "skipping project with invalid live URL");
      None
    }
  }
}

/// Build a display model, or `None` if the project isn't shown.
pub fn display_model(project: &Project, site_origin: &str) -> Option<DisplayModel> {
  let path = eligible_path(project)?;
  let known = KnownModel::from_path(&path);

  Some(DisplayModel {
    name: project.title.clone().unwrap_or_default(),
    description: project.description.clone().unwrap_or_default(),
    path: format!("{}{}", site_origin.trim_end_matches('/'), path),
    stats: format_metric(project.model_features, " Features"),
    accuracy: format_metric(project.model_accuracy, "% Accuracy"),
    id: known
      .map(|k| ProjectId::Number(k.id()))
      .unwrap_or_else(|| project.id.clone()),
    icon: known.map(KnownModel::icon).unwrap_or(Icon::Plus),
    color: known.map(KnownModel::accent).unwrap_or(Accent::Gray),
    fetched: project.clone(),
  })
}

/// All display models for a catalog, in catalog order.
pub fn derive_models(catalog: &Catalog, site_origin: &str) -> Vec<DisplayModel> {
  catalog
    .projects()
    .iter()
    .filter_map(|p| display_model(p, site_origin))
    .collect()
}
