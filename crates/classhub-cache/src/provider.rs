//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use classhub_core::config::cache::CacheConfig;
use classhub_core::error::AppError;
use classhub_core::result::AppResult;
use classhub_core::traits::cache::CacheProvider;
use classhub_core::traits::presence::PresenceStore;

/// Value stored under presence keys. Only existence matters.
const PRESENCE_VALUE: &str = "1";

/// Cache manager that wraps the configured cache provider.
#[derive(Debug, Clone)]
pub struct CacheManager {
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis cache provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory cache provider");
                Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.expire(key, ttl).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl PresenceStore for CacheManager {
    async fn set(&self, key: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, PRESENCE_VALUE, ttl).await
    }

    async fn refresh(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.expire(key, ttl).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use classhub_core::config::cache::MemoryCacheConfig;

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let config = CacheConfig {
            provider: "memcached".into(),
            ..CacheConfig::default()
        };
        let err = CacheManager::new(&config).await.unwrap_err();
        assert_eq!(err.kind, classhub_core::error::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_presence_lifecycle() {
        let manager = CacheManager::from_provider(Arc::new(
            crate::memory::MemoryCacheProvider::new(&MemoryCacheConfig::default()),
        ));
        let presence: &dyn PresenceStore = &manager;
        let key = "live:teacher:room";
        let ttl = Duration::from_secs(90);

        assert!(!presence.exists(key).await.unwrap());
        assert!(!presence.refresh(key, ttl).await.unwrap());

        presence.set(key, ttl).await.unwrap();
        assert!(presence.exists(key).await.unwrap());
        assert!(presence.refresh(key, ttl).await.unwrap());

        presence.delete(key).await.unwrap();
        assert!(!presence.exists(key).await.unwrap());
    }
}
