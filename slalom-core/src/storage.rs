use crate::cache::{TextCacheKey, TextCacheValue};
use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Storage abstraction for caching extracted document text
pub trait DocumentStorage {
    fn get_text_output(&self, cache_key: &TextCacheKey) -> Result<Option<TextCacheValue>>;
    fn store_text_output(&self, cache_key: &TextCacheKey, cache_value: &TextCacheValue) -> Result<()>;
}

/// File-based storage implementation using local cache directory
pub struct FileStorage {
    cache_dir: PathBuf,
}

impl FileStorage {
    pub fn new(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        fs::create_dir_all(cache_dir.join("text"))?;
        Ok(Self { cache_dir })
    }

    fn text_path(&self, cache_key: &TextCacheKey) -> PathBuf {
        self.cache_dir
            .join("text")
            .join(format!("{}.json", cache_key.to_cache_hash()))
    }
}

impl DocumentStorage for FileStorage {
    fn get_text_output(&self, cache_key: &TextCacheKey) -> Result<Option<TextCacheValue>> {
        let path = self.text_path(cache_key);
        if path.exists() {
            let json_str = fs::read_to_string(path)?;
            let cache_value: TextCacheValue = serde_json::from_str(&json_str)
                .map_err(|e| anyhow!("Failed to deserialize cached text: {}", e))?;
            Ok(Some(cache_value))
        } else {
            Ok(None)
        }
    }

    fn store_text_output(&self, cache_key: &TextCacheKey, cache_value: &TextCacheValue) -> Result<()> {
        let path = self.text_path(cache_key);
        let json_str = serde_json::to_string_pretty(cache_value)
            .map_err(|e| anyhow!("Failed to serialize cached text: {}", e))?;
        fs::write(path, json_str)?;
        Ok(())
    }
}

/// Content hash of a whole document. Any edited byte, including in the
/// middle of a page stream, gives a new cache entry.
pub fn calculate_document_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes.len().to_le_bytes());
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// No-op storage implementation that disables all caching
pub struct NoOpStorage;

impl Default for NoOpStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NoOpStorage {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentStorage for NoOpStorage {
    fn get_text_output(&self, _cache_key: &TextCacheKey) -> Result<Option<TextCacheValue>> {
        Ok(None)
    }

    fn store_text_output(&self, _cache_key: &TextCacheKey, _cache_value: &TextCacheValue) -> Result<()> {
        Ok(())
    }
}
