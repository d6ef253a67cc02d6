//! Narrow liveness capability backed by a TTL store.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Out-of-band liveness oracle.
///
/// A marker's existence means "present"; its absence, including after the
/// TTL lapses, means "absent". Implementations must make each call atomic;
/// nothing else about the backing store may be assumed.
#[async_trait]
pub trait PresenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Create or overwrite the marker with a fresh TTL.
    async fn set(&self, key: &str, ttl: Duration) -> AppResult<()>;

    /// Extend the TTL of an existing marker. Returns `false` when the
    /// marker has already lapsed.
    async fn refresh(&self, key: &str, ttl: Duration) -> AppResult<bool>;

    /// Whether the marker currently exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Remove the marker immediately.
    async fn delete(&self, key: &str) -> AppResult<()>;
}
