//! JSON proxy server: each route forwards to one fixed upstream endpoint.

pub mod routes;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use color_eyre::{eyre::eyre, Result};
use std::net::SocketAddr;

use crate::upstream::{Endpoints, UpstreamClient};
use routes::{forward, ProxyMethod, ROUTES};

/// Shared, immutable per-server state
#[derive(Clone)]
pub struct ProxyState {
  pub client: UpstreamClient,
  pub endpoints: Endpoints,
}

/// Build the router with one handler per entry in the route table.
pub fn router(state: ProxyState) -> Router {
  let mut router = Router::new();

  for route in ROUTES {
    router = match route.method {
      ProxyMethod::Get => router.route(
        route.path,
        get(move |State(state): State<ProxyState>| forward(state, route, None)),
      ),
      ProxyMethod::Post => router.route(
        route.path,
        post(move |State(state): State<ProxyState>, body: Bytes| forward(state, route, Some(body))),
      ),
    };
  }

  router.with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: ProxyState, bind: SocketAddr) -> Result<()> {
  let listener = tokio::net::TcpListener::bind(bind)
    .await
    .map_err(|e| eyre!("Failed to bind {}: {}", bind, e))?;

  let addr = listener.local_addr()?;
  tracing::info!(%addr, routes = ROUTES.len(), "proxy listening");

  axum::serve(listener, router(state))
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| eyre!("Proxy server failed: {}", e))?;

  tracing::info!("proxy stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "failed to listen for Ctrl-C");
    std::future::pending::<()>().await;
  }
}
