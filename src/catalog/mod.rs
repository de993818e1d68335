//! The model catalog: display models and the cache reconciler.

pub mod models;
pub mod reconcile;

pub use models::{derive_models, Accent, DisplayModel, Icon};
pub use reconcile::{CatalogReconciler, CatalogSink, ReconcileOutcome, ReconcileState};

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cache::CatalogStore;
use crate::config::{Config, FetchErrorPolicy};
use crate::upstream::{Endpoints, Upstream, UpstreamClient};

/// Render instructions sent from a background reconciliation to the UI
#[derive(Debug)]
pub enum CatalogEvent {
  Show(Vec<DisplayModel>),
  Clear,
  Reload,
  Finished(ReconcileOutcome),
}

impl CatalogSink for mpsc::UnboundedSender<CatalogEvent> {
  // Send errors mean the view is gone; nothing left to render into
  fn show(&mut self, models: Vec<DisplayModel>) {
    let _ = self.send(CatalogEvent::Show(models));
  }

  fn clear(&mut self) {
    let _ = self.send(CatalogEvent::Clear);
  }

  fn reload(&mut self) {
    let _ = self.send(CatalogEvent::Reload);
  }
}

/// Everything a gallery session needs to run reconciliations
#[derive(Clone)]
pub struct CatalogService {
  client: UpstreamClient,
  endpoints: Endpoints,
  store: Arc<Box<dyn CatalogStore>>,
  site_origin: String,
  on_fetch_error: FetchErrorPolicy,
}

impl CatalogService {
  pub fn new(
    client: UpstreamClient,
    store: Box<dyn CatalogStore>,
    config: &Config,
  ) -> Self {
    Self {
      client,
      endpoints: Endpoints::new(&config.upstreams),
      store: Arc::new(store),
      site_origin: config.gallery.site_origin.clone(),
      on_fetch_error: config.gallery.on_fetch_error,
    }
  }

  pub fn client(&self) -> &UpstreamClient {
    &self.client
  }

  pub fn endpoints(&self) -> &Endpoints {
    &self.endpoints
  }

  /// Run one reconciliation in the background; events arrive on the receiver.
  pub fn spawn_reconcile(&self) -> mpsc::UnboundedReceiver<CatalogEvent> {
    let (mut tx, rx) = mpsc::unbounded_channel();
    let service = self.clone();

    tokio::spawn(async move {
      let mut reconciler = CatalogReconciler::new(service.store.clone())
        .with_site_origin(service.site_origin.clone())
        .with_fetch_error_policy(service.on_fetch_error);

      let fetch = || async {
        let base = service.endpoints.base(Upstream::PortfolioServer)?;
        service.client.fetch_catalog(base).await
      };

      let outcome = reconciler.reconcile(fetch, &mut tx).await;
      tracing::debug!(?outcome, "reconciliation finished");
      let _ = tx.send(CatalogEvent::Finished(outcome));
    });

    rx
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::SqliteStorage;
  use crate::config::UpstreamsConfig;
  use axum::routing::get;
  use axum::{Json, Router};
  use serde_json::json;

  async fn drain(mut rx: mpsc::UnboundedReceiver<CatalogEvent>) -> Vec<CatalogEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
      events.push(event);
    }
    events
  }

  fn service(portfolio: Option<String>, store: Box<dyn CatalogStore>) -> CatalogService {
    let config = Config {
      upstreams: UpstreamsConfig {
        portfolio_server: portfolio,
        ..Default::default()
      },
      ..Default::default()
    };
    CatalogService::new(UpstreamClient::direct(), store, &config)
  }

  #[tokio::test]
  async fn test_background_reconcile_streams_events() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let upstream = Router::new().route(
      "/project/projects_data",
      get(|| async {
        Json(json!({"data": [{
          "id": 1,
          "title": "Heart",
          "category": "Machine Learning",
          "liveUrl": "https://x/heart-disease-prediction"
        }]}))
      }),
    );
    tokio::spawn(async move {
      axum::serve(listener, upstream).await.unwrap();
    });

    let store = Box::new(SqliteStorage::open_in_memory().unwrap());
    let service = service(Some(format!("http://{}", addr)), store);

    let events = drain(service.spawn_reconcile()).await;
    assert_eq!(events.len(), 2);
    match &events[0] {
      CatalogEvent::Show(models) => assert_eq!(models[0].name, "Heart"),
      other => panic!("unexpected event {:?}", other),
    }
    assert!(matches!(
      events[1],
      CatalogEvent::Finished(ReconcileOutcome::Created)
    ));

    // Second session sees the cache first and finds it unchanged
    let events = drain(service.spawn_reconcile()).await;
    assert!(matches!(events[0], CatalogEvent::Show(_)));
    assert!(matches!(
      events[1],
      CatalogEvent::Finished(ReconcileOutcome::Unchanged)
    ));
  }

  #[tokio::test]
  async fn test_unconfigured_portfolio_server_clears() {
    let service = service(None, Box::new(crate::cache::NoopStorage));

    let events = drain(service.spawn_reconcile()).await;
    assert!(matches!(events[0], CatalogEvent::Clear));
    assert!(matches!(
      events[1],
      CatalogEvent::Finished(ReconcileOutcome::Failed)
    ));
  }
}
