//! Upstream services: the project catalog and the ML inference backend.

pub mod api_types;
pub mod client;
pub mod types;

pub use client::UpstreamClient;
pub use types::{Catalog, Project, ProjectId};

use crate::config::{UpstreamsConfig, ENV_CATALOG_BACKEND, ENV_ML_BACKEND, ENV_PORTFOLIO_SERVER};
use crate::error::Error;

/// The upstream services this application talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
  CatalogBackend,
  MlBackend,
  PortfolioServer,
}

impl Upstream {
  /// Environment variable that configures this upstream's base URL
  pub fn env_var(self) -> &'static str {
    match self {
      Self::CatalogBackend => ENV_CATALOG_BACKEND,
      Self::MlBackend => ENV_ML_BACKEND,
      Self::PortfolioServer => ENV_PORTFOLIO_SERVER,
    }
  }
}

/// Resolved base URLs, cheap to clone into request handlers
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
  catalog_backend: Option<String>,
  ml_backend: Option<String>,
  portfolio_server: Option<String>,
}

impl Endpoints {
  pub fn new(config: &UpstreamsConfig) -> Self {
    Self {
      catalog_backend: config.catalog_backend.clone(),
      ml_backend: config.ml_backend.clone(),
      portfolio_server: config.portfolio_server.clone(),
    }
  }

  /// Base URL for an upstream; an unset one fails like an unreachable host.
  pub fn base(&self, upstream: Upstream) -> Result<&str, Error> {
    let base = match upstream {
      Upstream::CatalogBackend => self.catalog_backend.as_deref(),
      Upstream::MlBackend => self.ml_backend.as_deref(),
      Upstream::PortfolioServer => self.portfolio_server.as_deref(),
    };
    base.ok_or_else(|| {
      Error::UpstreamUnreachable(format!("{} is not configured", upstream.env_var()))
    })
  }

  /// Host part of the portfolio server, for the header line
  pub fn portfolio_host(&self) -> Option<String> {
    let base = self.portfolio_server.as_deref()?;
    url::Url::parse(base)
      .ok()
      .and_then(|u| u.host_str().map(|h| match u.port() {
        Some(port) => format!("{}:{}", h, port),
        None => h.to_string(),
      }))
  }
}
