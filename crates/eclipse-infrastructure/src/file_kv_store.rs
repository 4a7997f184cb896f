//! Directory-backed key/value store.
//!
//! Each key is one file in the store directory, replaced atomically on every
//! write. Only keys made of ASCII letters, digits, `-`, `_` and `.` (not
//! starting with `.`) are accepted so a key can never escape the directory.

use std::fs;
use std::path::{Path, PathBuf};

use eclipse_core::error::{EclipseError, Result};
use eclipse_core::storage::KeyValueStore;

use crate::storage::AtomicTextFile;

pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!("[FileKeyValueStore] Using {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, key: &str) -> Result<AtomicTextFile> {
        if !is_valid_key(key) {
            return Err(EclipseError::validation(format!("Invalid storage key: '{key}'")));
        }
        Ok(AtomicTextFile::new(self.root.join(key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.file_for(key)?.load()?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.file_for(key)?.save(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.file_for(key)?.remove()?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut removed = 0usize;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(key) = name.to_str() else {
                continue;
            };
            if entry.file_type()?.is_file() && is_valid_key(key) {
                self.remove(key)?;
                removed += 1;
            }
        }
        tracing::info!(
            "[FileKeyValueStore] Cleared {} key(s) from {}",
            removed,
            self.root.display()
        );
        Ok(())
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && !key.ends_with(".lock")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eclipse_core::storage::{CHATS_KEY, SETTINGS_KEY, THEME_KEY};
    use tempfile::TempDir;

    #[test]
    fn test_set_get_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("store")).unwrap();

        assert_eq!(store.get(CHATS_KEY).unwrap(), None);
        store.set(CHATS_KEY, "[]").unwrap();
        assert_eq!(store.get(CHATS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("store");
        FileKeyValueStore::new(&root)
            .unwrap()
            .set(THEME_KEY, "light")
            .unwrap();

        let reopened = FileKeyValueStore::new(&root).unwrap();
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path()).unwrap();

        assert!(store.set("../escape", "x").unwrap_err().is_validation());
        assert!(store.get("a/b").is_err());
        assert!(store.get("").is_err());
        assert!(store.get(".hidden").is_err());
    }

    #[test]
    fn test_clear_removes_all_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path()).unwrap();
        store.set(CHATS_KEY, "[]").unwrap();
        store.set(SETTINGS_KEY, "{}").unwrap();
        store.set(THEME_KEY, "dark").unwrap();

        store.clear().unwrap();
        assert_eq!(store.get(CHATS_KEY).unwrap(), None);
        assert_eq!(store.get(SETTINGS_KEY).unwrap(), None);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
