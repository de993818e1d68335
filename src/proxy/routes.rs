//! The fixed table of proxied routes and the forwarding handler.

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use super::ProxyState;
use crate::error::Error;
use crate::upstream::client::join_url;
use crate::upstream::Upstream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMethod {
  /// No inbound body
  Get,
  /// Inbound JSON body forwarded as-is
  Post,
}

/// Shape of the 500 body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorEnvelope {
  /// `{ "error": msg }`
  Plain,
  /// `{ "success": false, "error": msg }`
  Prediction,
}

impl ErrorEnvelope {
  pub fn body(self, message: &str) -> Value {
    match self {
      Self::Plain => json!({ "error": message }),
      Self::Prediction => json!({ "success": false, "error": message }),
    }
  }
}

/// One inbound path mapped to one fixed upstream endpoint
#[derive(Debug, Clone, Copy)]
pub struct ProxyRoute {
  pub path: &'static str,
  pub method: ProxyMethod,
  pub upstream: Upstream,
  pub upstream_path: &'static str,
  pub envelope: ErrorEnvelope,
}

pub const ROUTES: &[ProxyRoute] = &[
  ProxyRoute {
    path: "/api/projects_data",
    method: ProxyMethod::Get,
    upstream: Upstream::CatalogBackend,
    upstream_path: "/api/projects_data",
    envelope: ErrorEnvelope::Plain,
  },
  ProxyRoute {
    path: "/api/health_check",
    method: ProxyMethod::Get,
    upstream: Upstream::MlBackend,
    upstream_path: "/health",
    envelope: ErrorEnvelope::Plain,
  },
  ProxyRoute {
    path: "/api/heart_disease",
    method: ProxyMethod::Post,
    upstream: Upstream::MlBackend,
    upstream_path: "/heart-disease/predict",
    envelope: ErrorEnvelope::Prediction,
  },
  ProxyRoute {
    path: "/api/medical_charge",
    method: ProxyMethod::Post,
    upstream: Upstream::MlBackend,
    upstream_path: "/medical-charge/predict",
    envelope: ErrorEnvelope::Prediction,
  },
  ProxyRoute {
    path: "/api/customer_churn",
    method: ProxyMethod::Post,
    upstream: Upstream::MlBackend,
    upstream_path: "/customer-churn/prediction",
    envelope: ErrorEnvelope::Prediction,
  },
  ProxyRoute {
    path: "/api/uplift",
    method: ProxyMethod::Post,
    upstream: Upstream::MlBackend,
    upstream_path: "/predict_uplift/predict",
    envelope: ErrorEnvelope::Prediction,
  },
];

/// Forward one request and relay the upstream JSON, or answer 500.
pub async fn forward(state: ProxyState, route: &'static ProxyRoute, body: Option<Bytes>) -> Response {
  match relay(&state, route, body).await {
    Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
    Err(e) => {
      tracing::error!(
        route = route.path,
        kind = e.kind(),
        error = %e,
        "proxy request failed"
      );
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(route.envelope.body(&e.to_string())),
      )
        .into_response()
    }
  }
}

async fn relay(state: &ProxyState, route: &ProxyRoute, body: Option<Bytes>) -> Result<Value, Error> {
  let url = join_url(state.endpoints.base(route.upstream)?, route.upstream_path);

  match route.method {
    ProxyMethod::Get => state.client.get_json(&url).await,
    ProxyMethod::Post => {
      let bytes = body.unwrap_or_default();
      let payload: Value = serde_json::from_slice(&bytes)
        .map_err(|e| Error::UpstreamError(format!("invalid JSON in request body: {}", e)))?;
      state.client.post_json(&url, &payload).await
    }
  }
}
