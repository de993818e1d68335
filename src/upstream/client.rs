use color_eyre::{eyre::eyre, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use super::api_types::ApiCatalogResponse;
use super::types::Catalog;
use crate::error::Error;

/// Path of the catalog listing on the portfolio server
pub const CATALOG_PATH: &str = "/project/projects_data";

/// Join a base URL and an absolute path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
  format!("{}{}", base.trim_end_matches('/'), path)
}

/// JSON-over-HTTP client shared by the proxy and the gallery
#[derive(Clone)]
pub struct UpstreamClient {
  http: reqwest::Client,
}

impl UpstreamClient {
  pub fn new() -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("ml-gallery/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http })
  }

  /// Client that ignores proxy environment variables, for loopback test servers.
  #[cfg(test)]
  pub fn direct() -> Self {
    let http = reqwest::Client::builder()
      .no_proxy()
      .build()
      .expect("build test HTTP client");
    Self { http }
  }

  /// GET a JSON document
  pub async fn get_json(&self, url: &str) -> Result<Value, Error> {
    let response = self
      .http
      .get(url)
      .header(ACCEPT, "application/json")
      .send()
      .await
      .map_err(|e| Error::UpstreamUnreachable(e.to_string()))?;

    Self::read_json(response).await
  }

  /// POST a JSON body and read a JSON document back
  pub async fn post_json(&self, url: &str, body: &Value) -> Result<Value, Error> {
    let payload =
      serde_json::to_vec(body).map_err(|e| Error::UpstreamError(format!("invalid request body: {}", e)))?;

    let response = self
      .http
      .post(url)
      .header(CONTENT_TYPE, "application/json")
      .header(ACCEPT, "application/json")
      .body(payload)
      .send()
      .await
      .map_err(|e| Error::UpstreamUnreachable(e.to_string()))?;

    Self::read_json(response).await
  }

  async fn read_json(response: reqwest::Response) -> Result<Value, Error> {
    let status = response.status();
    if !status.is_success() {
      return Err(Error::UpstreamError(format!(
        "upstream server error: {}",
        status.as_u16()
      )));
    }

    let bytes = response
      .bytes()
      .await
      .map_err(|e| Error::UpstreamUnreachable(e.to_string()))?;

    serde_json::from_slice(&bytes)
      .map_err(|e| Error::UpstreamError(format!("invalid JSON from upstream: {}", e)))
  }

  /// Fetch the project catalog from the portfolio server
  pub async fn fetch_catalog(&self, portfolio_base: &str) -> Result<Catalog, Error> {
    let url = join_url(portfolio_base, CATALOG_PATH);
    let body = self.get_json(&url).await?;

    let response: ApiCatalogResponse = serde_json::from_value(body)
      .map_err(|e| Error::UpstreamError(format!("unexpected catalog payload: {}", e)))?;

    let catalog = Catalog::new(response.into_records());
    tracing::debug!(url = %url, records = catalog.len(), "fetched catalog");
    Ok(catalog)
  }
}
