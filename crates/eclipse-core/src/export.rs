//! Plain-text transcript export.

use std::path::PathBuf;

use crate::chat::Chat;
use crate::error::Result;
use crate::locale::Locale;

/// A rendered transcript ready to be handed to an [`ExportSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExport {
    pub chat_id: String,
    pub file_name: String,
    pub content: String,
}

impl ChatExport {
    pub fn from_chat(chat: &Chat, locale: Locale) -> Self {
        Self {
            chat_id: chat.id.clone(),
            file_name: export_file_name(&chat.id),
            content: render_transcript(chat, locale),
        }
    }
}

/// Destination for exported transcripts (a download folder, usually).
pub trait ExportSink: Send + Sync {
    /// Writes the artifact and returns where it landed.
    fn write(&self, export: &ChatExport) -> Result<PathBuf>;
}

pub fn export_file_name(chat_id: &str) -> String {
    format!("eclipse-chat-{chat_id}.txt")
}

/// Renders `"<Label>: <content>"` blocks separated by a blank line.
pub fn render_transcript(chat: &Chat, locale: Locale) -> String {
    chat.messages
        .iter()
        .map(|m| format!("{}: {}", locale.role_label(m.role), m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Message;

    #[test]
    fn test_render_transcript() {
        let mut chat = Chat::new("New chat");
        chat.push(Message::user("Hello"));
        chat.push(Message::assistant("Hi there"));

        let text = render_transcript(&chat, Locale::En);
        assert_eq!(text, "User: Hello\n\nEclipse: Hi there");
    }

    #[test]
    fn test_empty_chat_renders_empty() {
        let chat = Chat::new("New chat");
        assert_eq!(render_transcript(&chat, Locale::Ru), "");
    }

    #[test]
    fn test_export_file_name() {
        let chat = Chat::new("New chat");
        let export = ChatExport::from_chat(&chat, Locale::En);
        assert_eq!(export.file_name, format!("eclipse-chat-{}.txt", chat.id));
    }
}
