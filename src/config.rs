use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable holding the catalog backend base URL
pub const ENV_CATALOG_BACKEND: &str = "NEXT_PUBLIC_API_EXPRESS_SERVER";
/// Environment variable holding the ML inference backend base URL
pub const ENV_ML_BACKEND: &str = "NEXT_PUBLIC_API_PYTHON_ML_SERVER";
/// Environment variable holding the portfolio server base URL
pub const ENV_PORTFOLIO_SERVER: &str = "NEXT_PUBLIC_API_PORTFOLIO_SERVER";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub upstreams: UpstreamsConfig,
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub gallery: GalleryConfig,
  #[serde(default)]
  pub log: LogConfig,
}

/// Base URLs of the three upstream services
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamsConfig {
  /// Serves `/api/projects_data` for the proxy
  pub catalog_backend: Option<String>,
  /// Python inference service (`/health`, `/heart-disease/predict`, ...)
  pub ml_backend: Option<String>,
  /// Serves `/project/projects_data` for the gallery
  pub portfolio_server: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_bind")]
  pub bind: SocketAddr,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind: default_bind(),
    }
  }
}

fn default_bind() -> SocketAddr {
  SocketAddr::from(([127, 0, 0, 1], 3000))
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Override for the SQLite file (default: $XDG_DATA_HOME/ml-gallery/cache.db)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
    }
  }
}

fn default_true() -> bool {
  true
}

/// What the gallery does with an already displayed cache when the fetch fails
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FetchErrorPolicy {
  /// Clear the list and show the empty state
  #[default]
  Clear,
  /// Keep showing the cached models
  KeepLastGood,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryConfig {
  /// Prefix for model links (e.g. "https://example.com"); empty keeps bare paths
  #[serde(default)]
  pub site_origin: String,
  #[serde(default)]
  pub on_fetch_error: FetchErrorPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Log file used by the terminal UI (default: $XDG_DATA_HOME/ml-gallery/ml-gallery.log)
  pub file: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      file: None,
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file, then apply environment overrides.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./ml-gallery.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/ml-gallery/config.yaml
  ///
  /// Unlike an explicit path, a missing default file is fine: the base URLs
  /// can come entirely from the environment.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };
    config.apply_env_overrides(|name| std::env::var(name).ok());

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("ml-gallery.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("ml-gallery").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to unit, not to a mapping
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Override upstream base URLs with non-empty environment values.
  fn apply_env_overrides<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = lookup(ENV_CATALOG_BACKEND) {
      self.upstreams.catalog_backend = Some(v);
    }
    if let Some(v) = lookup(ENV_ML_BACKEND) {
      self.upstreams.ml_backend = Some(v);
    }
    if let Some(v) = lookup(ENV_PORTFOLIO_SERVER) {
      self.upstreams.portfolio_server = Some(v);
    }
  }

  /// Directory for the cache database and the UI log file.
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("ml-gallery"))
  }

  pub fn cache_path(&self) -> Result<PathBuf> {
    match &self.cache.path {
      Some(p) => Ok(p.clone()),
      None => Ok(Self::data_dir()?.join("cache.db")),
    }
  }

  pub fn log_path(&self) -> Result<PathBuf> {
    match &self.log.file {
      Some(p) => Ok(p.clone()),
      None => Ok(Self::data_dir()?.join("ml-gallery.log")),
    }
  }
}
