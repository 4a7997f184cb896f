//! End-to-end turn scenarios against stub completion clients.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use eclipse_application::{AppContext, MessagingOrchestrator, RejectReason, SubmitOutcome};
use eclipse_core::RemoteError;
use eclipse_core::chat::{Message, MessageRole};
use eclipse_core::completion::{CompletionClient, CompletionRequest};
use eclipse_core::locale::Locale;
use eclipse_core::storage::{InMemoryKeyValueStore, KeyValueStore};
use eclipse_core::store::SessionStore;
use eclipse_infrastructure::{DirectoryExportSink, FileKeyValueStore};
use tempfile::TempDir;
use tokio::sync::{Notify, RwLock};

struct FixedReplyClient(&'static str);

#[async_trait]
impl CompletionClient for FixedReplyClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<Message, RemoteError> {
        Ok(Message::assistant(self.0))
    }
}

struct FailingClient;

#[async_trait]
impl CompletionClient for FailingClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<Message, RemoteError> {
        Err(RemoteError::transport("connection refused"))
    }
}

/// Blocks every call until released and counts how many calls arrived.
struct GatedClient {
    calls: AtomicUsize,
    release: Notify,
    seen: Mutex<Vec<String>>,
    fail: bool,
}

impl GatedClient {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            release: Notify::new(),
            seen: Mutex::new(Vec::new()),
            fail,
        }
    }

    async fn wait_for_call(&self) {
        while self.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl CompletionClient for GatedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Message, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.message.content.clone());
        self.release.notified().await;
        if self.fail {
            Err(RemoteError::http(503, "unavailable"))
        } else {
            Ok(Message::assistant("done"))
        }
    }
}

fn in_memory_store() -> Arc<RwLock<SessionStore>> {
    let storage = Arc::new(InMemoryKeyValueStore::new());
    Arc::new(RwLock::new(SessionStore::new(storage, Locale::En)))
}

#[tokio::test]
async fn test_hello_scenario() {
    let store = in_memory_store();
    let chat_id = store.write().await.create_chat().id.clone();
    let orchestrator = MessagingOrchestrator::new(store.clone(), Arc::new(FixedReplyClient("Hi there")));

    let outcome = orchestrator.submit("Hello").await;

    assert_eq!(outcome, SubmitOutcome::Replied { chat_id: chat_id.clone() });
    let guard = store.read().await;
    let chat = guard.chat(&chat_id).unwrap();
    assert_eq!(chat.title, "Hello...");
    let roles: Vec<MessageRole> = chat.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant]);
    assert_eq!(chat.messages[1].content, "Hi there");
    assert!(!chat.messages[1].is_error);
}

#[tokio::test]
async fn test_submit_without_selection_creates_chat() {
    let store = in_memory_store();
    let orchestrator = MessagingOrchestrator::new(store.clone(), Arc::new(FixedReplyClient("ok")));

    let outcome = orchestrator.submit("start something").await;

    let guard = store.read().await;
    assert_eq!(guard.len(), 1);
    let selected = guard.selected_chat().unwrap();
    assert_eq!(outcome, SubmitOutcome::Replied { chat_id: selected.id.clone() });
    assert_eq!(selected.messages.len(), 2);
}

#[tokio::test]
async fn test_failing_client_scenario() {
    let store = in_memory_store();
    let orchestrator = MessagingOrchestrator::new(store.clone(), Arc::new(FailingClient));

    let outcome = orchestrator.submit("Hello").await;

    assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    assert!(!orchestrator.is_busy());
    let guard = store.read().await;
    let chat = guard.selected_chat().unwrap();
    assert_eq!(chat.messages.len(), 2);
    assert_eq!(chat.messages[0].role, MessageRole::User);
    assert!(chat.messages[1].is_error);
    assert_eq!(chat.messages[1].content, Locale::En.fallback_reply());
}

#[tokio::test]
async fn test_second_submit_while_busy_is_rejected() {
    let store = in_memory_store();
    let client = Arc::new(GatedClient::new(false));
    let orchestrator = MessagingOrchestrator::new(store.clone(), client.clone());

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.submit("first").await })
    };
    client.wait_for_call().await;
    assert!(orchestrator.is_busy());

    let second = orchestrator.submit("second").await;
    assert_eq!(second, SubmitOutcome::Rejected(RejectReason::Busy));
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.read().await.selected_chat().unwrap().messages.len(), 1);

    client.release.notify_one();
    assert!(matches!(first.await.unwrap(), SubmitOutcome::Replied { .. }));
    assert!(!orchestrator.is_busy());
    assert_eq!(*client.seen.lock().unwrap(), vec!["first".to_string()]);
}

#[tokio::test]
async fn test_late_reply_lands_in_originating_chat() {
    let store = in_memory_store();
    let client = Arc::new(GatedClient::new(false));
    let orchestrator = MessagingOrchestrator::new(store.clone(), client.clone());

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.submit("first").await })
    };
    client.wait_for_call().await;

    let origin = store.read().await.selected_chat_id().unwrap().to_string();
    let other = store.write().await.create_chat().id.clone();
    assert_eq!(store.read().await.selected_chat_id(), Some(other.as_str()));

    client.release.notify_one();
    let outcome = first.await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Replied { chat_id: origin.clone() });
    let guard = store.read().await;
    let origin_chat = guard.chat(&origin).unwrap();
    assert_eq!(origin_chat.messages.len(), 2);
    assert_eq!(origin_chat.messages[1].content, "done");
    assert!(guard.chat(&other).unwrap().messages.is_empty());
    assert_eq!(guard.selected_chat_id(), Some(other.as_str()));
}

#[tokio::test]
async fn test_reply_for_chat_deleted_in_flight_is_dropped() {
    for fail in [false, true] {
        let store = in_memory_store();
        let client = Arc::new(GatedClient::new(fail));
        let orchestrator = MessagingOrchestrator::new(store.clone(), client.clone());

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.submit("first").await })
        };
        client.wait_for_call().await;

        let origin = store.read().await.selected_chat_id().unwrap().to_string();
        assert!(store.write().await.delete_chat(&origin).is_some());

        client.release.notify_one();
        let outcome = first.await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Dropped { chat_id: origin });
        assert!(!orchestrator.is_busy());
        assert!(store.read().await.is_empty());
    }
}

#[tokio::test]
async fn test_delete_only_selected_chat() {
    let store = in_memory_store();
    let orchestrator = MessagingOrchestrator::new(store.clone(), Arc::new(FixedReplyClient("ok")));
    orchestrator.submit("only one").await;

    let mut guard = store.write().await;
    let chat_id = guard.selected_chat_id().unwrap().to_string();
    assert!(guard.delete_chat(&chat_id).is_some());

    assert!(guard.selected_chat_id().is_none());
    assert!(guard.is_empty());
}

#[tokio::test]
async fn test_state_survives_reload_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(temp_dir.path().join("store")).unwrap());
    let ctx = AppContext::new(
        SessionStore::new(storage.clone(), Locale::En),
        Arc::new(FixedReplyClient("reply")),
        Arc::new(DirectoryExportSink::new(temp_dir.path().join("exports"))),
    );

    ctx.orchestrator().submit("first chat").await;
    ctx.store().write().await.create_chat();
    ctx.orchestrator().submit("second chat").await;

    let before = ctx.store().read().await.chats().to_vec();
    let reloaded = SessionStore::load(storage, Locale::En);

    assert_eq!(reloaded.chats(), before.as_slice());
    assert!(reloaded.selected_chat_id().is_none());

    let exported = ctx.export_chat(&before[0].id).await.unwrap().unwrap();
    let content = std::fs::read_to_string(exported).unwrap();
    assert_eq!(content, "User: second chat\n\nEclipse: reply");
}
