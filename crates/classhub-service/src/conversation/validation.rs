//! Input limits for chat payloads.

use classhub_core::error::AppError;
use classhub_core::result::AppResult;
use classhub_core::types::MediaId;

/// Longest accepted message body, in characters.
pub const MAX_CONTENT_CHARS: usize = 4000;

/// Longest accepted emoji string, in characters.
pub const MAX_EMOJI_CHARS: usize = 32;

/// Most attachments a single message may carry.
pub const MAX_ATTACHMENTS: usize = 10;

/// Trim message content; blank content becomes `None`.
pub fn normalize_content(content: Option<&str>) -> AppResult<Option<String>> {
    let Some(trimmed) = content.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::validation(format!(
            "Message content exceeds {MAX_CONTENT_CHARS} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Content for an edit, which must not be blank.
pub fn required_content(content: &str) -> AppResult<String> {
    normalize_content(Some(content))?
        .ok_or_else(|| AppError::validation("Message content cannot be empty"))
}

/// Deduplicate media ids keeping first occurrence order.
pub fn normalize_media_ids(media_ids: &[MediaId]) -> AppResult<Vec<MediaId>> {
    let mut unique: Vec<MediaId> = Vec::with_capacity(media_ids.len());
    for id in media_ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    if unique.len() > MAX_ATTACHMENTS {
        return Err(AppError::validation(format!(
            "A message can carry at most {MAX_ATTACHMENTS} attachments"
        )));
    }
    Ok(unique)
}

/// Trimmed emoji of 1 to 32 characters.
pub fn normalize_emoji(emoji: &str) -> AppResult<String> {
    let trimmed = emoji.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_EMOJI_CHARS {
        return Err(AppError::validation(format!(
            "Emoji must be 1 to {MAX_EMOJI_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}
