//! Object storage trait for the media collaborator.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for object storage backends.
///
/// Uploads happen outside this service; ClassHub only needs time-limited
/// read URLs for stored objects and the ability to remove an object once
/// nothing references it any more.
#[async_trait]
pub trait ObjectStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Produce a URL granting read access to `key` for `expires_in`.
    async fn sign_get_url(&self, key: &str, expires_in: Duration) -> AppResult<String>;

    /// Delete the object stored under `key`. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;
}
