//! S3-compatible object storage with presigned read URLs.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::{Builder as S3ConfigBuilder, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use tracing::{debug, info};

use classhub_core::config::storage::S3StorageConfig;
use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;
use classhub_core::traits::storage::ObjectStorage;

/// S3 presigned URLs cannot outlive seven days.
const MAX_PRESIGN: Duration = Duration::from_secs(7 * 24 * 3600);

/// S3-compatible storage provider (AWS, MinIO).
#[derive(Debug, Clone)]
pub struct S3ObjectStorage {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStorage {
    /// Build a client from configuration. Static credentials are used when
    /// both keys are set; otherwise the default AWS provider chain applies.
    pub async fn from_config(config: &S3StorageConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.s3.bucket is required"));
        }
        info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint,
            "Initializing S3 storage provider"
        );

        let region = Region::new(config.region.clone());
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(RegionProviderChain::first_try(region.clone()));
        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "classhub-static",
            ));
        }
        let aws_config = loader.load().await;

        let mut builder = S3ConfigBuilder::from(&aws_config).region(region);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }
        if config.force_path_style || config.endpoint.is_some() {
            builder = builder.force_path_style(true);
        }

        Ok(Self {
            client: S3Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn sign_get_url(&self, key: &str, expires_in: Duration) -> AppResult<String> {
        let presign = PresigningConfig::expires_in(expires_in.clamp(Duration::from_secs(1), MAX_PRESIGN))
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Invalid presign configuration", e)
            })?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to presign GET for '{key}'"),
                    e,
                )
            })?;

        debug!(key, bucket = %self.bucket, "Presigned S3 GET URL");
        Ok(presigned.uri().to_string())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete S3 object '{key}'"),
                    e,
                )
            })?;
        debug!(key, bucket = %self.bucket, "Deleted S3 object");
        Ok(())
    }
}
