use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

// Cached document content with the mtime it was read at
#[derive(Clone)]
pub struct CacheEntry {
    pub content: String,
    pub modified: SystemTime,
}

// Document contents keyed by path, invalidated when the file's mtime moves
#[derive(Default)]
pub struct DocumentCache {
    entries: DashMap<PathBuf, CacheEntry>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    // Hit only while the file still carries the mtime we cached
    pub fn get(&self, path: &Path, modified: SystemTime) -> Option<String> {
        self.entries
            .get(path)
            .filter(|entry| entry.modified == modified)
            .map(|entry| entry.content.clone())
    }

    pub fn insert(&self, path: &Path, content: String, modified: SystemTime) {
        self.entries
            .insert(path.to_path_buf(), CacheEntry { content, modified });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stale_mtime_misses() {
        let cache = DocumentCache::new();
        let path = Path::new("resume.md");
        let first = SystemTime::UNIX_EPOCH + Duration::from_secs(10);

        cache.insert(path, "v1".to_string(), first);

        assert_eq!(cache.get(path, first).as_deref(), Some("v1"));
        assert_eq!(cache.get(path, first + Duration::from_secs(1)), None);
    }

    #[test]
    fn insert_replaces_previous_entry() {
        let cache = DocumentCache::new();
        let path = Path::new("resume.md");
        let first = SystemTime::UNIX_EPOCH;
        let second = first + Duration::from_secs(5);

        cache.insert(path, "v1".to_string(), first);
        cache.insert(path, "v2".to_string(), second);

        assert_eq!(cache.entries.len(), 1);
        assert_eq!(cache.get(path, second).as_deref(), Some("v2"));
    }
}
