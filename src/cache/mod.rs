//! Local persistence for the last-known catalog.
//!
//! This module provides a single-slot cache that:
//! - Holds the catalog as the JSON text that was last fetched
//! - Records when it was written and a digest of its contents
//! - Is injected into the reconciler as a `CatalogStore`, never reached globally

mod storage;
mod traits;

pub use storage::{NoopStorage, SqliteStorage, CATALOG_SLOT};
pub use traits::{CachedCatalog, CatalogStore};

use color_eyre::Result;

use crate::config::Config;

/// Open the store the configuration asks for.
pub fn open_store(config: &Config) -> Result<Box<dyn CatalogStore>> {
  if !config.cache.enabled {
    tracing::info!("catalog cache disabled");
    return Ok(Box::new(NoopStorage));
  }

  let path = config.cache_path()?;
  tracing::info!(path = %path.display(), "opening catalog cache");
  Ok(Box::new(SqliteStorage::open(&path)?))
}
