//! Core traits and types for the catalog cache.

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::upstream::Catalog;

/// The last-known catalog snapshot.
#[derive(Debug, Clone)]
pub struct CachedCatalog {
  /// The cached project list
  pub catalog: Catalog,
  /// When the snapshot was written
  pub cached_at: DateTime<Utc>,
  /// Hex SHA-256 of the stored JSON text
  pub digest: String,
}

/// A single-slot persistent store for the catalog.
///
/// At most one snapshot exists; `write` replaces it wholesale. One writer per
/// session is assumed.
pub trait CatalogStore: Send + Sync {
  /// Read the current snapshot, if any
  fn read(&self) -> Result<Option<CachedCatalog>, Error>;

  /// Replace the snapshot
  fn write(&self, catalog: &Catalog) -> Result<(), Error>;
}

impl<S: CatalogStore + ?Sized> CatalogStore for Box<S> {
  fn read(&self) -> Result<Option<CachedCatalog>, Error> {
    (**self).read()
  }

  fn write(&self, catalog: &Catalog) -> Result<(), Error> {
    (**self).write(catalog)
  }
}
