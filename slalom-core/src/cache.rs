use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version constants for cache invalidation
pub mod versions {
    pub const SLALOM_VERSION: &str = env!("CARGO_PKG_VERSION");
    /// Bump when a preprocessor changes the text it produces
    pub const EXTRACTION_VERSION: &str = "1.0.0";
}

/// Cache key for extracted text (document bytes + preprocessor → text)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TextCacheKey {
    pub document_hash: String,
    pub preprocessor: String,
    pub slalom_version: String,
    pub extraction_version: String,
}

impl TextCacheKey {
    pub fn new(document_hash: String, preprocessor: &str) -> Self {
        Self {
            document_hash,
            preprocessor: preprocessor.to_string(),
            slalom_version: versions::SLALOM_VERSION.to_string(),
            extraction_version: versions::EXTRACTION_VERSION.to_string(),
        }
    }

    /// Compute cache key hash for storage
    pub fn to_cache_hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(&self.document_hash);
        hasher.update(&self.preprocessor);
        hasher.update(&self.slalom_version);
        hasher.update(&self.extraction_version);
        format!("{:x}", hasher.finalize())
    }
}

/// Cached text with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextCacheValue {
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub extraction_time_ms: u64,
    pub cache_version: String,
}

impl TextCacheValue {
    pub fn new(text: String, extraction_time_ms: u64) -> Self {
        Self {
            text,
            created_at: Utc::now(),
            extraction_time_ms,
            cache_version: versions::EXTRACTION_VERSION.to_string(),
        }
    }
}
