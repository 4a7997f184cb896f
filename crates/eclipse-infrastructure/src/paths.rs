//! Unified path management for Eclipse files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/eclipse/           # Config directory
//! ├── config.toml              # Application configuration
//! └── secret.json              # API keys
//!
//! ~/.local/share/eclipse/      # Data directory
//! ├── store/                   # Key/value blobs (chats, settings, theme)
//! ├── exports/                 # Exported transcripts
//! └── logs/                    # Application logs
//!     └── eclipse.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

const APP_DIR_NAME: &str = "eclipse";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves platform directories, honoring an optional data directory override.
#[derive(Debug, Clone, Default)]
pub struct EclipsePaths {
    data_dir_override: Option<PathBuf>,
}

impl EclipsePaths {
    /// Creates a resolver. `data_dir` replaces the platform data directory.
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        Self {
            data_dir_override: data_dir,
        }
    }

    /// Returns the Eclipse configuration directory (e.g. `~/.config/eclipse/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the data directory (e.g. `~/.local/share/eclipse/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(dir) = &self.data_dir_override {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn store_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("store"))
    }

    pub fn export_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("exports"))
    }

    pub fn log_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("logs"))
    }
}
