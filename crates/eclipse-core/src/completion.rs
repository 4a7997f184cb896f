//! Remote completion seam.

use async_trait::async_trait;

use crate::chat::Message;
use crate::error::RemoteError;
use crate::settings::{ModelId, Settings};

/// One outbound turn: the prior history plus the new user message.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: ModelId,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Messages already in the chat before `message` was appended.
    pub history: Vec<Message>,
    /// The turn awaiting a reply.
    pub message: Message,
}

impl CompletionRequest {
    /// Captures the current settings for a single request.
    pub fn new(settings: &Settings, history: Vec<Message>, message: Message) -> Self {
        Self {
            model: settings.model,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            history,
            message,
        }
    }

    /// History followed by the new message, in send order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.history.iter().chain(std::iter::once(&self.message))
    }
}

/// Sends a turn to a completion endpoint and returns the assistant reply.
///
/// Implementations must not retry and must not touch the session store.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Message, RemoteError>;
}
