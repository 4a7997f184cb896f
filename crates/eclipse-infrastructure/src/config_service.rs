//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` (created with defaults on
//! first run) and resolves the API credential.

use std::env;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use eclipse_core::config::AppConfig;
use eclipse_core::error::{EclipseError, Result};

use crate::paths::EclipsePaths;
use crate::storage::{AtomicTextFile, SecretStorage, SecretStorageError};

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration; filled on first access.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a service for the default location (~/.config/eclipse/config.toml).
    pub fn new() -> Result<Self> {
        let path = EclipsePaths::config_file().map_err(|e| EclipseError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a service reading from a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<AppConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| EclipseError::internal("config cache lock poisoned"))?;
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| EclipseError::internal("config cache lock poisoned"))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_config(&self) -> Result<AppConfig> {
        let file = AtomicTextFile::new(self.path.clone());
        match file.load()? {
            Some(content) => {
                let config: AppConfig = toml::from_str(&content)?;
                tracing::debug!("[ConfigService] Loaded {}", self.path.display());
                Ok(config)
            }
            None => {
                let config = AppConfig::default();
                file.save(&toml::to_string_pretty(&config)?)?;
                tracing::info!(
                    "[ConfigService] Wrote default configuration to {}",
                    self.path.display()
                );
                Ok(config)
            }
        }
    }
}

/// Finds the Anthropic API key.
///
/// Priority:
/// 1. `secret.json` next to the config file
/// 2. `ANTHROPIC_API_KEY` environment variable
pub fn resolve_api_key(secrets: &SecretStorage) -> Option<String> {
    match secrets.load() {
        Ok(secret) => {
            if let Some(anthropic) = secret.anthropic
                && !anthropic.api_key.trim().is_empty()
            {
                return Some(anthropic.api_key);
            }
        }
        Err(SecretStorageError::NotFound(_)) => {}
        Err(e) => tracing::warn!("[ConfigService] Ignoring unreadable secret file: {}", e),
    }

    env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty())
}
