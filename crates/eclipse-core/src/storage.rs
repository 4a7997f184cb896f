//! Persistent key/value storage seam.
//!
//! The session store writes its full state through this trait after every
//! mutation. Implementations hold opaque string blobs; the store owns the
//! encoding.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{EclipseError, Result};

/// Key holding the bare theme name (`dark` / `light`).
pub const THEME_KEY: &str = "eclipse-theme";
/// Key holding the JSON-encoded chat collection, most recent first.
pub const CHATS_KEY: &str = "eclipse-chats";
/// Key holding the JSON-encoded request settings.
pub const SETTINGS_KEY: &str = "eclipse-settings";

/// Durable string-keyed blob storage.
///
/// Calls are synchronous: the store treats writes as fire-and-forget and only
/// logs failures, so there is nothing to await.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: Key present
    /// - `Ok(None)`: Key absent
    /// - `Err(_)`: Storage could not be read
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a key. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;

    /// Removes every key owned by this store.
    fn clear(&self) -> Result<()>;
}

/// Process-local storage, used in tests and when no data directory is wanted.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| EclipseError::internal("in-memory store lock poisoned"))
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}
