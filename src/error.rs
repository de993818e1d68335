//! Error kinds shared by the proxy routes and the catalog reconciler.

use thiserror::Error;

/// Failures that are scoped to one request or one reconciliation cycle.
///
/// None of these are fatal: proxy routes turn them into a 500 envelope and
/// the reconciler turns them into an empty state plus a log line.
#[derive(Debug, Error)]
pub enum Error {
  /// The upstream could not be reached (connection refused, DNS, reset, ...)
  #[error("{0}")]
  UpstreamUnreachable(String),
  /// The upstream answered, but with a non-2xx status or a body that is not JSON
  #[error("{0}")]
  UpstreamError(String),
  /// The local cache could not be read or written
  #[error("cache storage unavailable: {0}")]
  StorageUnavailable(String),
}

impl Error {
  /// Short machine-friendly label, used as a structured log field.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::UpstreamUnreachable(_) => "upstream_unreachable",
      Self::UpstreamError(_) => "upstream_error",
      Self::StorageUnavailable(_) => "storage_unavailable",
    }
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    Self::StorageUnavailable(e.to_string())
  }
}
