//! Chat domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Message;

/// Number of characters of the first message kept in an auto-derived title.
pub const TITLE_PREFIX_CHARS: usize = 30;

/// One persisted conversation thread.
///
/// `id` is assigned at creation and never changes. `title` starts as the
/// locale's default and is replaced exactly once, when the first message is
/// appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Unique chat identifier (UUID format)
    pub id: String,
    /// Display title
    pub title: String,
    /// Ordered, append-only message history
    pub messages: Vec<Message>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// Creates an empty chat with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Appends a message and returns its index.
    ///
    /// The first append freezes the title; later appends leave it untouched.
    pub(crate) fn push(&mut self, message: Message) -> usize {
        if self.messages.is_empty() {
            self.title = derive_title(&message.content);
        }
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Returns true if the title or any message contains `needle`.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .messages
                .iter()
                .any(|m| m.content.to_lowercase().contains(needle))
    }
}

/// Builds a chat title from the first message of a chat.
///
/// Keeps the first [`TITLE_PREFIX_CHARS`] characters and always appends an
/// ellipsis, so "Hello" becomes "Hello...".
pub fn derive_title(content: &str) -> String {
    let prefix: String = content.chars().take(TITLE_PREFIX_CHARS).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_title_short() {
        assert_eq!(derive_title("Hello"), "Hello...");
    }

    #[test]
    fn test_derive_title_truncates_by_chars() {
        let long = "абвгдеёжзийклмнопрстуфхцчшщъыьэюя";
        let title = derive_title(long);
        assert_eq!(title.chars().count(), TITLE_PREFIX_CHARS + 3);
        assert!(title.starts_with("абвгдеёжзий"));
    }

    #[test]
    fn test_new_chats_have_distinct_ids() {
        let a = Chat::new("New chat");
        let b = Chat::new("New chat");
        assert_ne!(a.id, b.id);
        assert!(a.messages.is_empty());
    }

    #[test]
    fn test_push_sets_title_once() {
        let mut chat = Chat::new("New chat");
        chat.push(Message::user("First question"));
        chat.push(Message::assistant("A completely different answer"));
        assert_eq!(chat.title, "First question...");
        assert_eq!(chat.messages.len(), 2);
    }

    #[test]
    fn test_serde_field_names() {
        let chat = Chat::new("New chat");
        let json = serde_json::to_value(&chat).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("messages").unwrap().is_array());
    }
}
