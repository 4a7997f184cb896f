//! Turn submission.
//!
//! A submission appends the user message immediately, releases the store,
//! awaits the completion endpoint, then appends either the reply or the
//! locale's fallback apology. At most one request is in flight across the
//! whole application.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eclipse_core::RemoteError;
use eclipse_core::chat::Message;
use eclipse_core::completion::{CompletionClient, CompletionRequest};
use eclipse_core::store::SessionStore;
use tokio::sync::RwLock;

/// Why a submission was dropped without touching any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Input was empty or whitespace only.
    EmptyInput,
    /// Another request is still in flight.
    Busy,
}

/// Result of one `submit` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Rejected(RejectReason),
    /// The assistant reply was appended to `chat_id`.
    Replied { chat_id: String },
    /// The request failed; an error message was appended to `chat_id`.
    Failed { chat_id: String, error: RemoteError },
    /// `chat_id` was deleted while the request was in flight; nothing was
    /// appended.
    Dropped { chat_id: String },
}

/// Clears the busy flag when dropped, including during unwinding.
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Drives user turns through the completion client into the session store.
#[derive(Clone)]
pub struct MessagingOrchestrator {
    store: Arc<RwLock<SessionStore>>,
    client: Arc<dyn CompletionClient>,
    busy: Arc<AtomicBool>,
}

impl MessagingOrchestrator {
    pub fn new(store: Arc<RwLock<SessionStore>>, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            store,
            client,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a request is awaiting the completion endpoint.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Submits `text` as a user turn to the selected chat.
    ///
    /// Creates and selects a chat first when none is selected. Remote
    /// failures never propagate; they are recorded in the transcript.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Rejected(RejectReason::EmptyInput);
        }

        let Some(_guard) = BusyGuard::try_acquire(&self.busy) else {
            tracing::debug!("[Orchestrator] Submission rejected: request already in flight");
            return SubmitOutcome::Rejected(RejectReason::Busy);
        };

        let (chat_id, request, locale) = {
            let mut store = self.store.write().await;
            let selected = store.selected_chat_id().map(str::to_string);
            let chat_id = match selected {
                Some(id) => id,
                None => store.create_chat().id.clone(),
            };
            let history = store
                .chat(&chat_id)
                .map(|chat| chat.messages.clone())
                .unwrap_or_default();
            let message = Message::user(text);
            let request = CompletionRequest::new(store.settings(), history, message.clone());
            let _ = store.append_message(&chat_id, message);
            (chat_id, request, store.locale())
        };

        tracing::debug!(
            "[Orchestrator] Requesting completion for chat {} ({} prior message(s))",
            chat_id,
            request.history.len()
        );

        let result = self.client.complete(request).await;

        let mut store = self.store.write().await;
        let (appended, outcome) = match result {
            Ok(reply) => {
                let appended = store.append_message(&chat_id, reply);
                (appended, SubmitOutcome::Replied { chat_id: chat_id.clone() })
            }
            Err(error) => {
                tracing::warn!(
                    "[Orchestrator] Completion failed for chat {} (status: {:?}): {}",
                    chat_id,
                    error.status,
                    error.cause
                );
                let appended =
                    store.append_message(&chat_id, Message::error(locale.fallback_reply()));
                (
                    appended,
                    SubmitOutcome::Failed {
                        chat_id: chat_id.clone(),
                        error,
                    },
                )
            }
        };

        // Only fails when the chat is gone; the store has already logged it.
        match appended {
            Ok(_) => outcome,
            Err(_) => SubmitOutcome::Dropped { chat_id },
        }
    }
}
