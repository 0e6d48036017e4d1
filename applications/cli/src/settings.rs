//! CLI settings loaded from file and environment
//!
//! An optional `groove.toml` in the working directory is layered under
//! `GROOVE_`-prefixed environment variables. The legacy `MUSIC_DIR`
//! variable always wins for the music directory.

use groove_sync::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Root of the music library to scan
    #[serde(default)]
    pub music_dir: PathBuf,

    /// Where qualifying files are mirrored before transfer
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// rsync binary to invoke
    #[serde(default = "default_rsync_path")]
    pub rsync_path: PathBuf,
}

impl Settings {
    /// Load settings from file and environment
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = PathBuf::from("groove.toml");
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        }

        settings = settings.add_source(config::Environment::with_prefix("GROOVE"));

        let config = settings
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        let mut loaded: Self = config
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        // MUSIC_DIR is the documented way to point at the library
        if let Ok(dir) = std::env::var("MUSIC_DIR") {
            loaded.music_dir = PathBuf::from(dir);
        }

        Ok(loaded)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if self.music_dir.as_os_str().is_empty() {
            return Err(SyncError::Config(
                "music directory is not configured (set MUSIC_DIR)".to_string(),
            ));
        }

        if !self.music_dir.is_dir() {
            return Err(SyncError::Config(format!(
                "music directory {} does not exist",
                self.music_dir.display()
            )));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_dir: PathBuf::new(),
            staging_dir: default_staging_dir(),
            rsync_path: default_rsync_path(),
        }
    }
}

// Default values
fn default_staging_dir() -> PathBuf {
    std::env::temp_dir().join("groove-staging")
}

fn default_rsync_path() -> PathBuf {
    PathBuf::from("rsync")
}
