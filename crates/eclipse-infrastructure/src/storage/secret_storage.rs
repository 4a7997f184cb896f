//! Read-only access to the credential file (`secret.json`).

use eclipse_core::config::SecretConfig;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretStorageError {
    #[error("Secret file not found at: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read secret file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Malformed secret file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Credential file next to `config.toml`.
///
/// The file is plaintext JSON and should be readable by the owner only.
#[derive(Debug, Clone)]
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Secret file in the same directory as `config_file`.
    pub fn beside(config_file: &Path) -> Self {
        Self::with_path(config_file.with_file_name("secret.json"))
    }

    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SecretStorageError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
