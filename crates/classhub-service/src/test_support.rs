//! Shared collaborators for service tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use classhub_cache::CacheManager;
use classhub_cache::memory::MemoryCacheProvider;
use classhub_core::config::cache::MemoryCacheConfig;
use classhub_core::result::AppResult;
use classhub_core::traits::storage::ObjectStorage;
use classhub_storage::SignedUrlCache;

/// Signer that records deletions.
#[derive(Debug, Default)]
pub struct RecordingStorage {
    deleted: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    fn provider_type(&self) -> &str {
        "recording"
    }

    async fn sign_get_url(&self, key: &str, expires_in: Duration) -> AppResult<String> {
        Ok(format!("https://files.test/{key}?ttl={}", expires_in.as_secs()))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        if let Ok(mut deleted) = self.deleted.lock() {
            deleted.push(key.to_string());
        }
        Ok(())
    }
}

/// An in-memory cache manager.
pub fn memory_cache() -> Arc<CacheManager> {
    Arc::new(CacheManager::from_provider(Arc::new(
        MemoryCacheProvider::new(&MemoryCacheConfig::default()),
    )))
}

/// A URL cache over `storage` backed by a fresh in-memory cache.
pub fn signed_urls(storage: Arc<RecordingStorage>) -> SignedUrlCache {
    SignedUrlCache::new(storage, memory_cache(), Duration::from_secs(3600))
}
