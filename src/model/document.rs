//! Document handles.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::source::SourceBackend;

/// A source file to extract from.
///
/// Owns no extraction state. The only mutable part is the page count, which
/// is resolved on first request and cached from then on.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    config: ExtractionConfig,
    page_count: OnceLock<u32>,
}

impl Document {
    /// Create a document handle without touching the file system.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: ExtractionConfig::default(),
            page_count: OnceLock::new(),
        }
    }

    /// Create a document handle, failing if the path does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(Error::source_unavailable(path, "file not found"));
        }
        Ok(Self::new(path))
    }

    /// Set the default extraction config used when a call supplies none.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Path of the source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Default extraction config.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Number of pages, resolved through `backend` on first call.
    ///
    /// This never fails: if the document cannot be opened the failure is
    /// logged and 0 is returned. Failures are not cached, so a later call
    /// retries.
    pub fn page_count(&self, backend: &dyn SourceBackend) -> u32 {
        if let Some(count) = self.page_count.get() {
            return *count;
        }
        match backend.open(&self.path).and_then(|source| source.page_count()) {
            Ok(count) => *self.page_count.get_or_init(|| count),
            Err(e) => {
                log::warn!(
                    "Could not determine page count of {}: {}",
                    self.path.display(),
                    e
                );
                0
            }
        }
    }

    /// Page count if it has already been resolved.
    pub fn cached_page_count(&self) -> Option<u32> {
        self.page_count.get().copied()
    }
}

impl From<&Path> for Document {
    fn from(path: &Path) -> Self {
        Document::new(path)
    }
}

impl From<PathBuf> for Document {
    fn from(path: PathBuf) -> Self {
        Document::new(path)
    }
}

impl From<&str> for Document {
    fn from(path: &str) -> Self {
        Document::new(path)
    }
}
