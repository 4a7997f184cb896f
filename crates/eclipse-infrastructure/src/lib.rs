//! Infrastructure adapters for Eclipse: on-disk key/value storage, transcript
//! export, configuration and secrets.

pub mod config_service;
pub mod export_sink;
pub mod file_kv_store;
pub mod paths;
pub mod storage;

pub use crate::config_service::{ConfigService, resolve_api_key};
pub use crate::export_sink::DirectoryExportSink;
pub use crate::file_kv_store::FileKeyValueStore;
pub use crate::paths::EclipsePaths;
