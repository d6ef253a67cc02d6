//! Memoization of signed object URLs.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use classhub_core::result::AppResult;
use classhub_core::traits::cache::CacheProvider;
use classhub_core::traits::storage::ObjectStorage;

/// Caches signed URLs by object key for as long as the signer made them
/// valid.
///
/// Concurrent misses for one key each call the signer; signing is
/// idempotent and cheap, so they are not coalesced. A cache outage only
/// costs extra signing calls.
#[derive(Debug, Clone)]
pub struct SignedUrlCache {
    storage: Arc<dyn ObjectStorage>,
    cache: Arc<dyn CacheProvider>,
    ttl: Duration,
}

impl SignedUrlCache {
    /// Create a cache that signs URLs valid for `ttl` and keeps them for
    /// the same duration.
    pub fn new(storage: Arc<dyn ObjectStorage>, cache: Arc<dyn CacheProvider>, ttl: Duration) -> Self {
        Self {
            storage,
            cache,
            ttl,
        }
    }

    /// Return a signed URL for `object_key`, signing only on a miss.
    pub async fn get_url(&self, object_key: &str) -> AppResult<String> {
        let cache_key = cache_key(object_key);
        match self.cache.get(&cache_key).await {
            Ok(Some(url)) => return Ok(url),
            Ok(None) => {}
            Err(e) => warn!(error = %e, object_key, "Signed URL cache lookup failed"),
        }

        let url = self.storage.sign_get_url(object_key, self.ttl).await?;
        debug!(object_key, provider = self.storage.provider_type(), "Signed object URL");

        if let Err(e) = self.cache.set(&cache_key, &url, self.ttl).await {
            warn!(error = %e, object_key, "Failed to cache signed URL");
        }
        Ok(url)
    }

    /// Signed URL for an optional key.
    pub async fn get_optional(&self, object_key: Option<&str>) -> AppResult<Option<String>> {
        match object_key {
            Some(key) => self.get_url(key).await.map(Some),
            None => Ok(None),
        }
    }

    /// Drop a cached URL, e.g. after the object was deleted.
    pub async fn invalidate(&self, object_key: &str) -> AppResult<()> {
        self.cache.delete(&cache_key(object_key)).await
    }
}

fn cache_key(object_key: &str) -> String {
    format!("signed_url:{object_key}")
}
