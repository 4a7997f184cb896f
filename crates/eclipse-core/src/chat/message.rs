//! Conversation message types.
//!
//! Messages are immutable once appended to a chat; the store never edits or
//! removes them individually.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Reply produced by the completion endpoint (or the local fallback).
    Assistant,
}

impl MessageRole {
    /// Wire name used by the completion endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single message in a chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
    /// Set on the fallback reply appended when a completion request failed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl Message {
    /// Creates a user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content, false)
    }

    /// Creates an assistant reply stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content, false)
    }

    /// Creates the assistant-side placeholder for a failed request.
    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content, true)
    }

    fn new(role: MessageRole, content: impl Into<String>, is_error: bool) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            is_error,
        }
    }
}
