//! Tracing subscriber setup for the two run modes.

use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// `RUST_LOG` wins; otherwise the configured level applies.
fn env_filter(config: &Config) -> EnvFilter {
  EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level))
}

/// Log to stderr (proxy server mode).
pub fn init_stderr(config: &Config) -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(env_filter(config))
    .with_writer(std::io::stderr)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  tracing::info!(version = env!("CARGO_PKG_VERSION"), "ml-gallery starting");
  Ok(())
}

/// Log to a file (terminal UI mode, the terminal belongs to the UI).
///
/// The returned guard must be held until exit so buffered lines are flushed.
pub fn init_file(config: &Config) -> Result<WorkerGuard> {
  let path = config.log_path()?;
  let dir = path
    .parent()
    .ok_or_else(|| eyre!("Invalid log path: {}", path.display()))?;
  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Invalid log path: {}", path.display()))?;

  std::fs::create_dir_all(dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::never(dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter(config))
    .with_ansi(false)
    .with_writer(writer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  tracing::info!(
    version = env!("CARGO_PKG_VERSION"),
    log_file = %path.display(),
    "ml-gallery starting"
  );
  Ok(guard)
}
