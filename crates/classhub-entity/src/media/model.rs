//! Media object entity model.

use chrono::{DateTime, Utc};
use classhub_core::types::{MediaId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A file previously uploaded to object storage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MediaObject {
    /// Unique media identifier.
    pub id: MediaId,
    /// Key of the object in the storage bucket.
    pub object_key: String,
    /// MIME type recorded at upload.
    pub content_type: String,
    /// Original file name.
    pub file_name: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Uploader.
    pub uploaded_by: UserId,
    /// Upload time.
    pub created_at: DateTime<Utc>,
}

impl MediaObject {
    /// Whether the object is an image.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}
