//! Authoritative in-memory chat collection.
//!
//! `SessionStore` owns the chats, the current selection, the request settings
//! and the theme. Every mutation that touches persisted state writes the full
//! state through the [`KeyValueStore`] before returning and broadcasts a
//! [`StoreEvent`] to subscribers.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::chat::{Chat, Message};
use crate::error::{EclipseError, Result};
use crate::export::ChatExport;
use crate::locale::Locale;
use crate::settings::{Settings, Theme};
use crate::storage::{CHATS_KEY, KeyValueStore, SETTINGS_KEY, THEME_KEY};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Change notification emitted after a store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ChatCreated { chat_id: String },
    ChatSelected { chat_id: String },
    MessageAppended { chat_id: String, index: usize },
    ChatDeleted { chat_id: String },
    SettingsChanged,
    ThemeChanged(Theme),
    Purged,
}

/// Owns the set of chats and keeps the persisted copy in step with it.
///
/// Chats are kept most-recent-first. The selection is stored as an id, so the
/// selected view always reflects the latest appends to that chat.
pub struct SessionStore {
    chats: Vec<Chat>,
    selected_id: Option<String>,
    settings: Settings,
    theme: Theme,
    locale: Locale,
    storage: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<StoreEvent>,
}

impl SessionStore {
    /// Creates an empty store backed by `storage` without reading from it.
    pub fn new(storage: Arc<dyn KeyValueStore>, locale: Locale) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            chats: Vec::new(),
            selected_id: None,
            settings: Settings::default(),
            theme: Theme::default(),
            locale,
            storage,
            events,
        }
    }

    /// Restores chats, settings and theme from `storage`.
    ///
    /// Missing or unreadable entries fall back to defaults; the failure is
    /// logged and never surfaced. Nothing is selected after a load.
    pub fn load(storage: Arc<dyn KeyValueStore>, locale: Locale) -> Self {
        let mut store = Self::new(storage, locale);

        if let Some(raw) = store.read_key(THEME_KEY) {
            match raw.parse::<Theme>() {
                Ok(theme) => store.theme = theme,
                Err(e) => tracing::warn!("[SessionStore] Ignoring stored theme: {}", e),
            }
        }

        if let Some(raw) = store.read_key(SETTINGS_KEY) {
            match serde_json::from_str::<Settings>(&raw) {
                Ok(settings) if settings.validate().is_ok() => store.settings = settings,
                Ok(settings) => {
                    tracing::warn!(
                        "[SessionStore] Stored settings out of range, using defaults: {:?}",
                        settings
                    );
                }
                Err(e) => tracing::warn!("[SessionStore] Ignoring stored settings: {}", e),
            }
        }

        if let Some(raw) = store.read_key(CHATS_KEY) {
            match serde_json::from_str::<Vec<Chat>>(&raw) {
                Ok(chats) => store.chats = dedup_by_id(chats),
                Err(e) => tracing::warn!("[SessionStore] Ignoring stored chats: {}", e),
            }
        }

        tracing::info!(
            "[SessionStore] Loaded {} chat(s), theme={}, model={}",
            store.chats.len(),
            store.theme.as_str(),
            store.settings.model
        );
        store
    }

    /// Returns a receiver for change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ============================================================================
    // Queries
    // ============================================================================

    /// All chats, most recently created first.
    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn chat(&self, chat_id: &str) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == chat_id)
    }

    pub fn selected_chat_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected_chat(&self) -> Option<&Chat> {
        self.selected_id.as_deref().and_then(|id| self.chat(id))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    /// Chats whose title or message text contains `term`, ignoring case.
    ///
    /// An empty or whitespace-only term matches every chat.
    pub fn search(&self, term: &str) -> Vec<&Chat> {
        let needle = term.trim().to_lowercase();
        self.chats
            .iter()
            .filter(|c| needle.is_empty() || c.matches(&needle))
            .collect()
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Creates an empty chat, puts it first and selects it.
    pub fn create_chat(&mut self) -> &Chat {
        let chat = Chat::new(self.locale.default_chat_title());
        let chat_id = chat.id.clone();
        tracing::debug!("[SessionStore] Created chat {}", chat_id);

        self.chats.insert(0, chat);
        self.selected_id = Some(chat_id.clone());
        self.sync();
        self.notify(StoreEvent::ChatCreated { chat_id });

        &self.chats[0]
    }

    /// Selects the chat with `chat_id`.
    ///
    /// Returns `false` and leaves the selection unchanged if no such chat
    /// exists.
    pub fn select_chat(&mut self, chat_id: &str) -> bool {
        if self.chat(chat_id).is_none() {
            tracing::debug!("[SessionStore] select_chat ignored, unknown id {}", chat_id);
            return false;
        }
        self.selected_id = Some(chat_id.to_string());
        self.notify(StoreEvent::ChatSelected {
            chat_id: chat_id.to_string(),
        });
        true
    }

    /// Appends `message` to the chat and returns its index.
    ///
    /// The first message of a chat also sets its title. An unknown chat id
    /// leaves the store untouched and yields `NotFound`; callers treat that as
    /// a no-op.
    pub fn append_message(&mut self, chat_id: &str, message: Message) -> Result<usize> {
        let Some(chat) = self.chats.iter_mut().find(|c| c.id == chat_id) else {
            tracing::warn!(
                "[SessionStore] Dropping message for missing chat {} (role={})",
                chat_id,
                message.role.as_str()
            );
            return Err(EclipseError::not_found("Chat", chat_id));
        };

        let index = chat.push(message);
        self.sync();
        self.notify(StoreEvent::MessageAppended {
            chat_id: chat_id.to_string(),
            index,
        });
        Ok(index)
    }

    /// Removes a chat and returns it.
    ///
    /// If the chat was selected, the selection moves to the first remaining
    /// chat, or to none when the collection is empty.
    pub fn delete_chat(&mut self, chat_id: &str) -> Option<Chat> {
        let position = self.chats.iter().position(|c| c.id == chat_id)?;
        let removed = self.chats.remove(position);

        if self.selected_id.as_deref() == Some(chat_id) {
            self.selected_id = self.chats.first().map(|c| c.id.clone());
        }

        tracing::debug!(
            "[SessionStore] Deleted chat {}, selection now {:?}",
            chat_id,
            self.selected_id
        );
        self.sync();
        self.notify(StoreEvent::ChatDeleted {
            chat_id: chat_id.to_string(),
        });
        Some(removed)
    }

    /// Renders the chat as a plain-text transcript.
    pub fn export_chat(&self, chat_id: &str) -> Option<ChatExport> {
        self.chat(chat_id)
            .map(|chat| ChatExport::from_chat(chat, self.locale))
    }

    /// Replaces the request settings after range validation.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.sync();
        self.notify(StoreEvent::SettingsChanged);
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.sync();
        self.notify(StoreEvent::ThemeChanged(theme));
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme.toggled();
        self.set_theme(theme);
        theme
    }

    /// Clears persistent storage and resets the store to its initial state.
    ///
    /// In-memory state is left untouched if the storage cannot be cleared.
    pub fn purge(&mut self) -> Result<()> {
        self.storage.clear()?;
        self.chats.clear();
        self.selected_id = None;
        self.settings = Settings::default();
        self.theme = Theme::default();
        tracing::info!("[SessionStore] Purged all chats and settings");
        self.notify(StoreEvent::Purged);
        Ok(())
    }

    // ============================================================================
    // Persistence
    // ============================================================================

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("[SessionStore] Failed to read '{}': {}", key, e);
                None
            }
        }
    }

    /// Writes chats, settings and theme in full. Failures are logged only.
    fn sync(&self) {
        if let Err(e) = self.write_all() {
            tracing::warn!("[SessionStore] Persisting state failed: {}", e);
        }
    }

    fn write_all(&self) -> Result<()> {
        let chats = serde_json::to_string(&self.chats)?;
        let settings = serde_json::to_string(&self.settings)?;
        self.storage.set(THEME_KEY, self.theme.as_str())?;
        self.storage.set(CHATS_KEY, &chats)?;
        self.storage.set(SETTINGS_KEY, &settings)?;
        Ok(())
    }

    fn notify(&self, event: StoreEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}

fn dedup_by_id(chats: Vec<Chat>) -> Vec<Chat> {
    let mut seen = HashSet::new();
    chats
        .into_iter()
        .filter(|chat| {
            let fresh = seen.insert(chat.id.clone());
            if !fresh {
                tracing::warn!("[SessionStore] Dropping duplicate stored chat {}", chat.id);
            }
            fresh
        })
        .collect()
}
