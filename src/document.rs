use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::cache::DocumentCache;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DocumentError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            DocumentError::NotFound(path.to_path_buf())
        } else {
            DocumentError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

// Read a UTF-8 text file, separating "missing" from every other failure
pub async fn read(path: &Path) -> Result<String, DocumentError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DocumentError::from_io(path, e))
}

// The single document the chat is grounded in. Read from disk on every
// call unless a cache is attached.
pub struct DocumentStore {
    path: PathBuf,
    cache: Option<DocumentCache>,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: None,
        }
    }

    pub fn with_cache(mut self) -> Self {
        self.cache = Some(DocumentCache::new());
        self
    }

    pub async fn read_document(&self) -> Result<String, DocumentError> {
        let Some(cache) = &self.cache else {
            return read(&self.path).await;
        };

        let modified = tokio::fs::metadata(&self.path)
            .await
            .and_then(|meta| meta.modified())
            .map_err(|e| DocumentError::from_io(&self.path, e))?;

        if let Some(content) = cache.get(&self.path, modified) {
            debug!("Document cache hit for {}", self.path.display());
            return Ok(content);
        }

        let content = read(&self.path).await?;
        cache.insert(&self.path, content.clone(), modified);
        Ok(content)
    }
}
