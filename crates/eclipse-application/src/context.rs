//! Composition object owned by the process root.

use std::path::PathBuf;
use std::sync::Arc;

use eclipse_core::completion::CompletionClient;
use eclipse_core::error::Result;
use eclipse_core::export::ExportSink;
use eclipse_core::store::SessionStore;
use tokio::sync::RwLock;

use crate::orchestrator::MessagingOrchestrator;

/// The single session store plus the services that act on it.
///
/// Presentation layers receive this by reference; nothing else holds a
/// global handle to the store.
#[derive(Clone)]
pub struct AppContext {
    store: Arc<RwLock<SessionStore>>,
    orchestrator: MessagingOrchestrator,
    export_sink: Arc<dyn ExportSink>,
}

impl AppContext {
    pub fn new(
        store: SessionStore,
        client: Arc<dyn CompletionClient>,
        export_sink: Arc<dyn ExportSink>,
    ) -> Self {
        let store = Arc::new(RwLock::new(store));
        let orchestrator = MessagingOrchestrator::new(store.clone(), client);
        Self {
            store,
            orchestrator,
            export_sink,
        }
    }

    pub fn store(&self) -> &Arc<RwLock<SessionStore>> {
        &self.store
    }

    pub fn orchestrator(&self) -> &MessagingOrchestrator {
        &self.orchestrator
    }

    /// Writes the transcript of `chat_id` through the export sink.
    ///
    /// Returns `Ok(None)` when the chat does not exist.
    pub async fn export_chat(&self, chat_id: &str) -> Result<Option<PathBuf>> {
        let export = self.store.read().await.export_chat(chat_id);
        match export {
            Some(export) => self.export_sink.write(&export).map(Some),
            None => Ok(None),
        }
    }
}
