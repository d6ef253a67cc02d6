//! Local filesystem object storage with self-signed read URLs.
//!
//! A signed URL carries `expires` (unix seconds) and a `signature`, the
//! URL-safe base64 SHA-256 of `secret:key:expires`. The static file server
//! in front of `root_path` verifies it with [`LocalObjectStorage::verify`].

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::debug;

use classhub_core::config::storage::LocalStorageConfig;
use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;
use classhub_core::traits::storage::ObjectStorage;

/// Object storage rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
    signing_secret: String,
}

impl LocalObjectStorage {
    /// Create a local storage provider from configuration.
    pub fn new(config: &LocalStorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root_path),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            signing_secret: config.signing_secret.clone(),
        }
    }

    /// Check a signature produced by [`ObjectStorage::sign_get_url`].
    pub fn verify(&self, key: &str, expires: i64, signature: &str) -> bool {
        expires > Utc::now().timestamp() && self.signature(key, expires) == signature
    }

    fn signature(&self, key: &str, expires: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.signing_secret.as_bytes());
        hasher.update(b":");
        hasher.update(key.as_bytes());
        hasher.update(b":");
        hasher.update(expires.to_string().as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    /// Resolve a key under the root, rejecting keys that escape it.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::validation(format!("Invalid object key: '{key}'")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn sign_get_url(&self, key: &str, expires_in: Duration) -> AppResult<String> {
        self.resolve(key)?;
        let expires = Utc::now().timestamp() + expires_in.as_secs() as i64;
        let signature = self.signature(key, expires);
        Ok(format!(
            "{}/{}?expires={expires}&signature={signature}",
            self.public_base_url,
            key.trim_start_matches('/')
        ))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "Deleted local object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete object '{key}'"),
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(root: &str) -> LocalObjectStorage {
        LocalObjectStorage::new(&LocalStorageConfig {
            root_path: root.to_string(),
            public_base_url: "http://files.test/objects/".into(),
            signing_secret: "s3cret".into(),
        })
    }

    #[tokio::test]
    async fn test_signed_url_verifies() {
        let storage = storage("./unused");
        let url = storage
            .sign_get_url("chat/a.png", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(url.starts_with("http://files.test/objects/chat/a.png?expires="));

        let query = url.split_once('?').unwrap().1;
        let mut expires = 0;
        let mut signature = "";
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("expires", v)) => expires = v.parse().unwrap(),
                Some(("signature", v)) => signature = v,
                _ => {}
            }
        }
        assert!(storage.verify("chat/a.png", expires, signature));
        assert!(!storage.verify("chat/b.png", expires, signature));
    }

    #[tokio::test]
    async fn test_key_cannot_escape_root() {
        let storage = storage("./unused");
        let err = storage
            .sign_get_url("../etc/passwd", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_delete_missing_object_succeeds() {
        let dir = std::env::temp_dir().join(format!("classhub-{}", std::process::id()));
        tokio::fs::create_dir_all(dir.join("chat")).await.unwrap();
        tokio::fs::write(dir.join("chat/a.txt"), b"hi").await.unwrap();

        let storage = storage(dir.to_str().unwrap());
        storage.delete("chat/a.txt").await.unwrap();
        assert!(!dir.join("chat/a.txt").exists());
        storage.delete("chat/a.txt").await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
