//! User-facing strings that vary by locale.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::chat::MessageRole;
use crate::error::{EclipseError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Title given to a chat before its first message.
    pub fn default_chat_title(&self) -> &'static str {
        match self {
            Locale::En => "New chat",
            Locale::Ru => "Новый чат",
        }
    }

    /// Reply appended in place of an assistant answer when a request fails.
    pub fn fallback_reply(&self) -> &'static str {
        match self {
            Locale::En => {
                "Sorry, something went wrong while processing your request. Please try again."
            }
            Locale::Ru => {
                "Извините, произошла ошибка при обработке вашего запроса. Пожалуйста, попробуйте еще раз."
            }
        }
    }

    /// Speaker label used in exported transcripts.
    pub fn role_label(&self, role: MessageRole) -> &'static str {
        match (self, role) {
            (Locale::En, MessageRole::User) => "User",
            (Locale::Ru, MessageRole::User) => "Пользователь",
            (_, MessageRole::Assistant) => "Eclipse",
        }
    }

    /// Canned openers offered as a prefix for the next submission.
    pub fn quick_prompts(&self) -> &'static [&'static str] {
        match self {
            Locale::En => &[
                "Write code for...",
                "Explain the concept of...",
                "Help me solve a problem with...",
                "Analyze this text...",
            ],
            Locale::Ru => &[
                "Напиши код для...",
                "Объясни концепцию...",
                "Помоги с решением проблемы...",
                "Проанализируй текст...",
            ],
        }
    }
}

impl FromStr for Locale {
    type Err = EclipseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            other => Err(EclipseError::config(format!("Unsupported locale: '{other}'"))),
        }
    }
}
