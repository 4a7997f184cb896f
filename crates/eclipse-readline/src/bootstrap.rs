//! Composition root: configuration, logging and the application context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use eclipse_application::AppContext;
use eclipse_core::config::AppConfig;
use eclipse_core::locale::Locale;
use eclipse_core::store::SessionStore;
use eclipse_infrastructure::storage::SecretStorage;
use eclipse_infrastructure::{
    ConfigService, DirectoryExportSink, EclipsePaths, FileKeyValueStore, resolve_api_key,
};
use eclipse_interaction::ClaudeApiClient;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub locale: Option<Locale>,
}

/// Everything the REPL needs, plus the log writer guard that must outlive it.
pub struct Bootstrap {
    pub context: AppContext,
    pub config: AppConfig,
    pub has_api_key: bool,
    pub export_dir: PathBuf,
    _log_guard: WorkerGuard,
}

pub fn run(overrides: Overrides) -> Result<Bootstrap> {
    let config_service = match overrides.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    let mut config = config_service
        .get_config()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;
    if let Some(locale) = overrides.locale {
        config.locale = locale;
    }

    let paths = EclipsePaths::new(overrides.data_dir.or_else(|| config.storage.data_dir.clone()));
    let log_guard = init_logging(&paths.log_dir()?, &config.log.level)?;
    tracing::info!("[Bootstrap] Using config {}", config_service.path().display());

    let storage = FileKeyValueStore::new(paths.store_dir()?)?;
    let store = SessionStore::load(Arc::new(storage), config.locale);

    let secrets = SecretStorage::beside(config_service.path());
    let api_key = resolve_api_key(&secrets);
    if api_key.is_none() {
        tracing::warn!("[Bootstrap] No API key found; requests will fail until one is configured");
    }
    let client = ClaudeApiClient::from_config(api_key, &config.api);
    let has_api_key = client.has_api_key();

    let export_dir = match config.storage.export_dir.clone() {
        Some(dir) => dir,
        None => paths.export_dir()?,
    };
    let sink = DirectoryExportSink::new(export_dir.clone());

    Ok(Bootstrap {
        context: AppContext::new(store, Arc::new(client), Arc::new(sink)),
        config,
        has_api_key,
        export_dir,
        _log_guard: log_guard,
    })
}

/// Routes tracing output to a daily file so it never interleaves with the prompt.
fn init_logging(log_dir: &Path, default_level: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "eclipse.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .try_init()?;

    Ok(guard)
}
