//! The fetch, render, compare, update cycle behind the gallery.
//!
//! 1. Show the cached catalog right away, if there is one
//! 2. Always fetch a fresh copy
//! 3. First visit: cache and show it. Otherwise compare with the cache:
//!    unchanged means nothing to do, changed means replace the cache and ask
//!    the surface to reload (which starts over at step 1)
//! 4. A failed fetch clears the list, unless configured to keep the cache

use std::future::Future;
use std::sync::Arc;

use super::models::{derive_models, DisplayModel};
use crate::cache::CatalogStore;
use crate::config::FetchErrorPolicy;
use crate::error::Error;
use crate::upstream::Catalog;

/// Where the reconciler is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
  NoCache,
  CacheOnly,
  Reconciling,
  Settled,
}

/// How a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
  /// No cache existed; the fresh catalog was cached and shown
  Created,
  /// Fresh catalog matches the cache; nothing changed
  Unchanged,
  /// Cache replaced; one reload was requested
  Replaced,
  /// Fresh catalog shown, but it could not be cached
  Uncached,
  /// Fetch failed
  Failed,
}

/// Receives render instructions from the reconciler.
pub trait CatalogSink {
  /// Replace the displayed list (also ends the loading state)
  fn show(&mut self, models: Vec<DisplayModel>);

  /// Show the empty state
  fn clear(&mut self);

  /// Discard what is displayed and run a fresh cycle against the new cache
  fn reload(&mut self);
}

pub struct CatalogReconciler<S: CatalogStore> {
  store: Arc<S>,
  site_origin: String,
  on_fetch_error: FetchErrorPolicy,
  state: ReconcileState,
}

impl<S: CatalogStore> CatalogReconciler<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      site_origin: String::new(),
      on_fetch_error: FetchErrorPolicy::default(),
      state: ReconcileState::NoCache,
    }
  }

  /// Prefix for model links.
  pub fn with_site_origin(mut self, site_origin: impl Into<String>) -> Self {
    self.site_origin = site_origin.into();
    self
  }

  pub fn with_fetch_error_policy(mut self, policy: FetchErrorPolicy) -> Self {
    self.on_fetch_error = policy;
    self
  }

  pub fn state(&self) -> ReconcileState {
    self.state
  }

  fn transition(&mut self, to: ReconcileState) {
    tracing::debug!(from = ?self.state, ?to, "reconciler state");
    self.state = to;
  }

  /// Run one cycle. `fetch` is called exactly once.
  pub async fn reconcile<F, Fut, K>(&mut self, fetch: F, sink: &mut K) -> ReconcileOutcome
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Catalog, Error>>,
    K: CatalogSink + ?Sized,
  {
    let cached = match self.store.read() {
      Ok(cached) => cached,
      Err(e) => {
        tracing::warn!(kind = e.kind(), error = %e, "ignoring unreadable catalog cache");
        None
      }
    };

    match &cached {
      Some(snapshot) => {
        self.transition(ReconcileState::CacheOnly);
        tracing::info!(
          records = snapshot.catalog.len(),
          cached_at = %snapshot.cached_at,
          "showing cached catalog"
        );
        sink.show(derive_models(&snapshot.catalog, &self.site_origin));
      }
      None => self.transition(ReconcileState::NoCache),
    }

    self.transition(ReconcileState::Reconciling);
    let fresh = fetch().await;
    self.transition(ReconcileState::Settled);

    let fresh = match fresh {
      Ok(catalog) => catalog,
      Err(e) => {
        tracing::error!(kind = e.kind(), error = %e, "failed to fetch catalog");
        let keep = cached.is_some() && self.on_fetch_error == FetchErrorPolicy::KeepLastGood;
        if !keep {
          sink.clear();
        }
        return ReconcileOutcome::Failed;
      }
    };

    if fresh.is_empty() {
      tracing::warn!("upstream catalog has no records");
    }

    let Some(snapshot) = cached else {
      tracing::info!(records = fresh.len(), "no cached catalog, caching fetched one");
      let outcome = self.persist(&fresh);
      sink.show(derive_models(&fresh, &self.site_origin));
      return outcome;
    };

    if snapshot.catalog.same_as(&fresh) {
      tracing::info!("catalog unchanged");
      return ReconcileOutcome::Unchanged;
    }

    tracing::info!(
      old = %snapshot.digest,
      new = %fresh.digest(),
      "catalog changed, replacing cache"
    );
    match self.persist(&fresh) {
      ReconcileOutcome::Created => {
        sink.reload();
        ReconcileOutcome::Replaced
      }
      outcome => {
        // Reloading would only show the stale cache again
        sink.show(derive_models(&fresh, &self.site_origin));
        outcome
      }
    }
  }

  fn persist(&self, catalog: &Catalog) -> ReconcileOutcome {
    match self.store.write(catalog) {
      Ok(()) => ReconcileOutcome::Created,
      Err(e) => {
        tracing::warn!(kind = e.kind(), error = %e, "failed to cache catalog");
        ReconcileOutcome::Uncached
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CachedCatalog;
  use crate::upstream::ProjectId;
  use chrono::Utc;
  use serde_json::{json, Value};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;

  /// In-memory store that counts writes and can be told to fail.
  #[derive(Default)]
  struct MemoryStore {
    slot: Mutex<Option<String>>,
    writes: AtomicUsize,
    fail_reads: bool,
    fail_writes: bool,
  }

  impl MemoryStore {
    fn with(catalog: &Catalog) -> Self {
      let store = Self::default();
      *store.slot.lock().unwrap() = Some(catalog.to_json().unwrap());
      store
    }

    fn writes(&self) -> usize {
      self.writes.load(Ordering::SeqCst)
    }

    fn stored(&self) -> Option<Catalog> {
      self
        .slot
        .lock()
        .unwrap()
        .as_deref()
        .map(|text| Catalog::from_json(text).unwrap())
    }
  }

  impl CatalogStore for MemoryStore {
    fn read(&self) -> Result<Option<CachedCatalog>, Error> {
      if self.fail_reads {
        return Err(Error::StorageUnavailable("disabled".to_string()));
      }
      Ok(self.stored().map(|catalog| CachedCatalog {
        digest: catalog.digest(),
        catalog,
        cached_at: Utc::now(),
      }))
    }

    fn write(&self, catalog: &Catalog) -> Result<(), Error> {
      if self.fail_writes {
        return Err(Error::StorageUnavailable("quota exceeded".to_string()));
      }
      self.writes.fetch_add(1, Ordering::SeqCst);
      *self.slot.lock().unwrap() = Some(catalog.to_json().unwrap());
      Ok(())
    }
  }

  #[derive(Debug, PartialEq)]
  enum Rendered {
    Show(Vec<String>),
    Clear,
    Reload,
  }

  #[derive(Default)]
  struct RecordingSink {
    events: Vec<Rendered>,
  }

  impl RecordingSink {
    fn reloads(&self) -> usize {
      self
        .events
        .iter()
        .filter(|e| **e == Rendered::Reload)
        .count()
    }
  }

  impl CatalogSink for RecordingSink {
    fn show(&mut self, models: Vec<DisplayModel>) {
      self
        .events
        .push(Rendered::Show(models.into_iter().map(|m| m.name).collect()));
    }

    fn clear(&mut self) {
      self.events.push(Rendered::Clear);
    }

    fn reload(&mut self) {
      self.events.push(Rendered::Reload);
    }
  }

  fn ml_project(id: i64, title: &str) -> Value {
    json!({
      "id": id,
      "title": title,
      "category": "Machine Learning",
      "liveUrl": format!("https://x/model-{}", id),
    })
  }

  fn catalog_a() -> Catalog {
    Catalog::new(vec![ml_project(1, "Heart"), ml_project(2, "Churn")])
  }

  fn catalog_b() -> Catalog {
    Catalog::new(vec![ml_project(1, "Heart v2"), ml_project(2, "Churn")])
  }

  async fn run(
    store: Arc<MemoryStore>,
    policy: FetchErrorPolicy,
    fetched: Result<Catalog, Error>,
  ) -> (ReconcileOutcome, RecordingSink, ReconcileState) {
    let mut reconciler = CatalogReconciler::new(store).with_fetch_error_policy(policy);
    let mut sink = RecordingSink::default();
    let outcome = reconciler
      .reconcile(|| async move { fetched }, &mut sink)
      .await;
    (outcome, sink, reconciler.state())
  }

  #[tokio::test]
  async fn test_first_visit_creates_cache_and_renders() {
    let store = Arc::new(MemoryStore::default());
    let fetched = Catalog::new(vec![json!({
      "id": 1,
      "category": "Machine Learning",
      "liveUrl": "https://x/heart-disease-prediction",
      "title": "Heart",
      "modelAccuracy": 92,
      "modelFeatures": 8
    })]);

    let mut reconciler = CatalogReconciler::new(store.clone());
    let mut models = Vec::new();
    struct Capture<'a>(&'a mut Vec<DisplayModel>);
    impl CatalogSink for Capture<'_> {
      fn show(&mut self, models: Vec<DisplayModel>) {
        *self.0 = models;
      }
      fn clear(&mut self) {
        self.0.clear();
      }
      fn reload(&mut self) {
        panic!("no reload expected");
      }
    }

    let expected = fetched.clone();
    let outcome = reconciler
      .reconcile(|| async move { Ok(fetched) }, &mut Capture(&mut models))
      .await;

    assert_eq!(outcome, ReconcileOutcome::Created);
    assert_eq!(reconciler.state(), ReconcileState::Settled);
    assert!(store.stored().unwrap().same_as(&expected));
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "Heart");
    assert_eq!(models[0].accuracy, "92% Accuracy");
    assert_eq!(models[0].stats, "8 Features");
    assert_eq!(models[0].id, ProjectId::Number(2));
  }

  #[tokio::test]
  async fn test_identical_fetch_writes_nothing_and_keeps_render() {
    let store = Arc::new(MemoryStore::with(&catalog_a()));
    let (outcome, sink, state) = run(store.clone(), FetchErrorPolicy::Clear, Ok(catalog_a())).await;

    assert_eq!(outcome, ReconcileOutcome::Unchanged);
    assert_eq!(state, ReconcileState::Settled);
    assert_eq!(store.writes(), 0);
    assert_eq!(sink.reloads(), 0);
    assert_eq!(
      sink.events,
      vec![Rendered::Show(vec!["Heart".into(), "Churn".into()])]
    );
  }

  #[tokio::test]
  async fn test_changed_fetch_replaces_cache_and_reloads_once() {
    let store = Arc::new(MemoryStore::with(&catalog_a()));
    let (outcome, sink, _) = run(store.clone(), FetchErrorPolicy::Clear, Ok(catalog_b())).await;

    assert_eq!(outcome, ReconcileOutcome::Replaced);
    assert_eq!(store.writes(), 1);
    assert!(store.stored().unwrap().same_as(&catalog_b()));
    assert_eq!(sink.reloads(), 1);
    // Only the optimistic render precedes the reload
    assert_eq!(
      sink.events,
      vec![
        Rendered::Show(vec!["Heart".into(), "Churn".into()]),
        Rendered::Reload
      ]
    );
  }

  #[tokio::test]
  async fn test_length_change_counts_as_changed() {
    let store = Arc::new(MemoryStore::with(&catalog_a()));
    let shorter = Catalog::new(vec![ml_project(1, "Heart")]);
    let (outcome, sink, _) = run(store.clone(), FetchErrorPolicy::Clear, Ok(shorter)).await;

    assert_eq!(outcome, ReconcileOutcome::Replaced);
    assert_eq!(store.writes(), 1);
    assert_eq!(sink.reloads(), 1);
  }

  #[tokio::test]
  async fn test_reload_after_change_settles() {
    let store = Arc::new(MemoryStore::with(&catalog_a()));
    run(store.clone(), FetchErrorPolicy::Clear, Ok(catalog_b())).await;

    // The reload re-enters with the new cache and the same upstream data
    let (outcome, sink, _) = run(store.clone(), FetchErrorPolicy::Clear, Ok(catalog_b())).await;
    assert_eq!(outcome, ReconcileOutcome::Unchanged);
    assert_eq!(store.writes(), 1);
    assert_eq!(
      sink.events,
      vec![Rendered::Show(vec!["Heart v2".into(), "Churn".into()])]
    );
  }

  #[tokio::test]
  async fn test_fetch_failure_clears_displayed_cache_by_default() {
    let store = Arc::new(MemoryStore::with(&catalog_a()));
    let (outcome, sink, state) = run(
      store.clone(),
      FetchErrorPolicy::Clear,
      Err(Error::UpstreamUnreachable("connection refused".into())),
    )
    .await;

    assert_eq!(outcome, ReconcileOutcome::Failed);
    assert_eq!(state, ReconcileState::Settled);
    assert_eq!(store.writes(), 0);
    assert_eq!(
      sink.events,
      vec![
        Rendered::Show(vec!["Heart".into(), "Churn".into()]),
        Rendered::Clear
      ]
    );
  }

  #[tokio::test]
  async fn test_fetch_failure_can_keep_last_good() {
    let store = Arc::new(MemoryStore::with(&catalog_a()));
    let (outcome, sink, _) = run(
      store,
      FetchErrorPolicy::KeepLastGood,
      Err(Error::UpstreamError("upstream server error: 500".into())),
    )
    .await;

    assert_eq!(outcome, ReconcileOutcome::Failed);
    assert_eq!(
      sink.events,
      vec![Rendered::Show(vec!["Heart".into(), "Churn".into()])]
    );
  }

  #[tokio::test]
  async fn test_fetch_failure_without_cache_clears_under_any_policy() {
    let store = Arc::new(MemoryStore::default());
    let (_, sink, _) = run(
      store,
      FetchErrorPolicy::KeepLastGood,
      Err(Error::UpstreamUnreachable("dns".into())),
    )
    .await;

    assert_eq!(sink.events, vec![Rendered::Clear]);
  }

  #[tokio::test]
  async fn test_unreadable_cache_is_treated_as_first_visit() {
    let store = Arc::new(MemoryStore {
      fail_reads: true,
      ..Default::default()
    });
    let (outcome, sink, _) = run(store.clone(), FetchErrorPolicy::Clear, Ok(catalog_a())).await;

    assert_eq!(outcome, ReconcileOutcome::Created);
    assert_eq!(store.writes(), 1);
    assert_eq!(
      sink.events,
      vec![Rendered::Show(vec!["Heart".into(), "Churn".into()])]
    );
  }

  #[tokio::test]
  async fn test_unwritable_cache_shows_fresh_data_without_reload() {
    let store = Arc::new(MemoryStore {
      fail_writes: true,
      ..MemoryStore::with(&catalog_a())
    });
    let (outcome, sink, _) = run(store.clone(), FetchErrorPolicy::Clear, Ok(catalog_b())).await;

    assert_eq!(outcome, ReconcileOutcome::Uncached);
    assert_eq!(sink.reloads(), 0);
    assert_eq!(
      sink.events,
      vec![
        Rendered::Show(vec!["Heart".into(), "Churn".into()]),
        Rendered::Show(vec!["Heart v2".into(), "Churn".into()])
      ]
    );
  }

  #[tokio::test]
  async fn test_long_float_round_trips_through_sqlite_cache() {
    // More significant digits than an f64 holds; parsing must round the
    // same way for the fresh text and the cached text.
    let upstream_text = r#"[{"id":1,"category":"Machine Learning","liveUrl":"https://x/model-1","modelAccuracy":0.9742236744619146016}]"#;
    let store = Arc::new(crate::cache::SqliteStorage::open_in_memory().unwrap());
    let mut reconciler = CatalogReconciler::new(store);

    let mut outcomes = Vec::new();
    for _ in 0..3 {
      let fresh = Catalog::from_json(upstream_text).unwrap();
      let mut sink = RecordingSink::default();
      outcomes.push(reconciler.reconcile(|| async move { Ok(fresh) }, &mut sink).await);
      assert_eq!(sink.reloads(), 0);
    }

    assert_eq!(
      outcomes,
      vec![
        ReconcileOutcome::Created,
        ReconcileOutcome::Unchanged,
        ReconcileOutcome::Unchanged
      ]
    );
  }
}
