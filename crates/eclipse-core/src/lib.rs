//! Domain layer for Eclipse.
//!
//! Holds the chat model, the [`store::SessionStore`] that owns it, and the
//! traits at the edges: [`storage::KeyValueStore`] for persistence,
//! [`completion::CompletionClient`] for the remote endpoint and
//! [`export::ExportSink`] for transcript files.

pub mod chat;
pub mod completion;
pub mod config;
pub mod error;
pub mod export;
pub mod locale;
pub mod settings;
pub mod storage;
pub mod store;

// Re-export common error type
pub use error::{EclipseError, RemoteError};
