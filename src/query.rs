//! Background fetches polled from the UI tick.
//!
//! A `Query<T>` owns a fetcher closure and the state of its latest run. The
//! view calls `fetch()` once, `poll()` on every tick and renders `state()`:
//!
//! ```ignore
//! let mut query = Query::new(move || {
//!   let client = client.clone();
//!   async move { client.get_json(&url).await.map_err(|e| e.to_string()) }
//! });
//! query.fetch();
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  Idle,
  Loading,
  Success(T),
  Error(String),
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// An async fetch whose result is picked up by polling
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T: Send + 'static> Query<T> {
  /// The fetcher is called again on every `fetch()` / `refetch()`.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    match &self.state {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match &self.state {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.state, QueryState::Loading)
  }

  /// Start a fetch unless one is already running.
  pub fn fetch(&mut self) {
    if self.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Start a fetch now; a pending result from an earlier run is discarded.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.start_fetch();
  }

  /// Pick up a finished result. Returns `true` when the state changed.
  pub fn poll(&mut self) -> bool {
    let Some(receiver) = self.receiver.as_mut() else {
      return false;
    };

    let next = match receiver.try_recv() {
      Ok(Ok(data)) => QueryState::Success(data),
      Ok(Err(error)) => QueryState::Error(error),
      Err(mpsc::error::TryRecvError::Empty) => return false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        QueryState::Error("Query was cancelled".to_string())
      }
    };

    self.state = next;
    self.receiver = None;
    true
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      // Receiver is gone after a refetch
      let _ = tx.send(future.await);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}
