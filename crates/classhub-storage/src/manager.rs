//! Storage manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use classhub_core::config::storage::StorageConfig;
use classhub_core::error::AppError;
use classhub_core::result::AppResult;
use classhub_core::traits::storage::ObjectStorage;

/// Wraps the object storage provider selected by configuration.
#[derive(Debug, Clone)]
pub struct StorageManager {
    inner: Arc<dyn ObjectStorage>,
}

impl StorageManager {
    /// Create the provider named by `storage.provider`.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let inner: Arc<dyn ObjectStorage> = match config.provider.as_str() {
            #[cfg(feature = "local")]
            "local" => {
                info!(root = %config.local.root_path, "Initializing local object storage");
                Arc::new(crate::providers::local::LocalObjectStorage::new(
                    &config.local,
                ))
            }
            #[cfg(feature = "s3")]
            "s3" => Arc::new(crate::providers::s3::S3ObjectStorage::from_config(&config.s3).await?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'. Supported: local, s3"
                )));
            }
        };
        Ok(Self { inner })
    }

    /// Create a storage manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn ObjectStorage>) -> Self {
        Self { inner: provider }
    }
}

#[async_trait]
impl ObjectStorage for StorageManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn sign_get_url(&self, key: &str, expires_in: Duration) -> AppResult<String> {
        self.inner.sign_get_url(key, expires_in).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }
}
