//! Application state: configuration, database location and the engine

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use haven_core::{BookingEngine, Error, HavenConfig, Result};
use tracing::{debug, info};

/// Environment variable naming a TOML config file
pub const CONFIG_ENV: &str = "HAVEN_CONFIG";

/// Main application state
pub struct AppState {
    pub engine: BookingEngine,
    db_path: PathBuf,
}

impl AppState {
    pub fn new() -> Result<Self> {
        let config = Self::load_config()?;
        let db_path = match &config.database.path {
            Some(path) => path.clone(),
            None => Self::data_path()?.join("haven.db"),
        };
        Self::with_config(&config, db_path)
    }

    pub fn with_config(config: &HavenConfig, db_path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let engine = BookingEngine::from_config(config, &db_path)?;
        info!(path = %db_path.display(), "Database ready");
        Ok(Self { engine, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// `$HAVEN_CONFIG`, else `haven.toml` in the config dir, else defaults
    fn load_config() -> Result<HavenConfig> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            debug!(path = ?path, "Loading config from environment");
            return HavenConfig::load(Path::new(&path));
        }

        let path = Self::project_dirs()?.config_dir().join("haven.toml");
        if path.exists() {
            debug!(path = %path.display(), "Loading config");
            HavenConfig::load(&path)
        } else {
            Ok(HavenConfig::default())
        }
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "onyx", "haven").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })
    }

    fn data_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }
}
