//! Message kind enumeration.

use serde::{Deserialize, Serialize};

/// What a message carries, as shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Text only.
    Text,
    /// Every attachment is an image.
    Image,
    /// At least one non-image attachment.
    File,
    /// Soft-deleted.
    Deleted,
}

impl MessageKind {
    /// Derive the kind of a live message from the content types of its
    /// attachments.
    pub fn from_attachments<'a>(content_types: impl IntoIterator<Item = &'a str>) -> Self {
        let mut any = false;
        let mut all_images = true;
        for content_type in content_types {
            any = true;
            all_images &= content_type.starts_with("image/");
        }
        match (any, all_images) {
            (false, _) => Self::Text,
            (true, true) => Self::Image,
            (true, false) => Self::File,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_attachments() {
        assert_eq!(MessageKind::from_attachments([]), MessageKind::Text);
        assert_eq!(
            MessageKind::from_attachments(["image/png", "image/jpeg"]),
            MessageKind::Image
        );
        assert_eq!(
            MessageKind::from_attachments(["image/png", "application/pdf"]),
            MessageKind::File
        );
    }
}
