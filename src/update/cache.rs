// Release-check cache - remembers when GitHub was last asked and what it said
// Advisory only: anything unreadable counts as "no cache"

use super::version::AppVersion;
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct CacheFile {
    #[serde(rename = "Version", default)]
    version: VersionSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VersionSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latest_release_checked: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latest_release_version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VersionCache {
    path: PathBuf,
    file: CacheFile,
}

impl VersionCache {
    /// Load the cache at `path`, or start empty if it's missing or unreadable
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let file = fs::read_to_string(&path)
            .ok()
            .and_then(|content| match toml::from_str::<CacheFile>(&content) {
                Ok(file) => Some(file),
                Err(e) => {
                    debug!("Ignoring unreadable version cache {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default();

        Self { path, file }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        let raw = self.file.version.latest_release_checked.as_deref()?.trim();

        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
            .ok()
    }

    pub fn latest_version(&self) -> Option<AppVersion> {
        self.file
            .version
            .latest_release_version
            .as_deref()
            .and_then(AppVersion::parse_semantic)
    }

    pub fn set_last_checked(&mut self, at: DateTime<Utc>) {
        self.file.version.latest_release_checked = Some(at.format(TIMESTAMP_FORMAT).to_string());
    }

    pub fn set_latest_version(&mut self, version: AppVersion) {
        self.file.version.latest_release_version = Some(version.semantic());
    }

    /// Write the cache, creating its folder on first use
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string_pretty(&self.file)?)?;
        Ok(())
    }
}
