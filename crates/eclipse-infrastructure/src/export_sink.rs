//! Writes exported transcripts into a directory.

use std::path::PathBuf;

use eclipse_core::error::Result;
use eclipse_core::export::{ChatExport, ExportSink};

use crate::storage::AtomicTextFile;

pub struct DirectoryExportSink {
    dir: PathBuf,
}

impl DirectoryExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for DirectoryExportSink {
    fn write(&self, export: &ChatExport) -> Result<PathBuf> {
        let path = self.dir.join(&export.file_name);
        AtomicTextFile::new(path.clone()).save(&export.content)?;
        tracing::info!(
            "[DirectoryExportSink] Exported chat {} to {}",
            export.chat_id,
            path.display()
        );
        Ok(path)
    }
}
