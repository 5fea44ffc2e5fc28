// Configuration management for playlift
// Settings file for persistent defaults, plus the per-run export configuration

pub mod export;

pub use export::{ConfigError, ExportConfig, ExportConfigBuilder, TextMatcher};

use anyhow::Result;
use dirs::{config_dir, data_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const APP_DIR: &str = "playlift";

/// Defaults that survive between runs; command-line flags win over these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library_path: PathBuf,
    pub check_for_updates: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let music_dir = dirs::audio_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Music")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            library_path: music_dir.join("iTunes").join("iTunes Music Library.xml"),
            check_for_updates: true,
        }
    }
}

impl Settings {
    /// Load from the user config dir. First run writes the defaults out so they can be edited.
    pub fn load() -> Result<Self> {
        Self::load_or_create(&Self::config_path()?)
    }

    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let settings = Settings::default();
        // Not being able to write the file only costs the user a template
        if let Err(e) = settings.save_to(path) {
            warn!("Could not write default settings to {}: {:#}", path.display(), e);
        }
        Ok(settings)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join(APP_DIR);

        Ok(config_dir.join("config.toml"))
    }
}

/// Where logs and the release-check cache live
#[derive(Debug, Clone)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn discover() -> Result<Self> {
        let root = data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find application data directory"))?
            .join(APP_DIR);
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join("Logs")
    }

    pub fn version_cache(&self) -> PathBuf {
        self.root.join("versionCheck.toml")
    }
}
