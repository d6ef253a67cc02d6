//! Object storage and signed URL configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider: `"s3"` or `"local"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Lifetime of signed object URLs in seconds. The signed URL cache
    /// keeps entries for the same duration.
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_seconds: u64,
    /// S3-compatible storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            signed_url_ttl_seconds: default_signed_url_ttl(),
            s3: S3StorageConfig::default(),
            local: LocalStorageConfig::default(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3StorageConfig {
    /// S3 endpoint URL (for non-AWS services like MinIO).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// S3 bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key: Option<String>,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Use path-style addressing (required by most S3-compatible stores).
    #[serde(default)]
    pub force_path_style: bool,
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for stored objects.
    #[serde(default = "default_local_root")]
    pub root_path: String,
    /// Public base URL under which objects are served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Secret used to sign local URLs.
    #[serde(default = "default_signing_secret")]
    pub signing_secret: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
            public_base_url: default_public_base_url(),
            signing_secret: default_signing_secret(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_signed_url_ttl() -> u64 {
    3600
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_local_root() -> String {
    "./data/objects".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080/objects".to_string()
}

fn default_signing_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}
