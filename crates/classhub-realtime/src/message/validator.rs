//! Raw frame validation.

use super::error::EventError;
use super::types::ClientEvent;

/// Check the raw frame and parse it into an event.
pub fn parse_frame(raw: &str, max_bytes: usize) -> Result<ClientEvent, EventError> {
    if raw.len() > max_bytes {
        return Err(EventError::invalid(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }
    if raw.trim().is_empty() {
        return Err(EventError::invalid("Empty message"));
    }
    serde_json::from_str(raw).map_err(|e| EventError::invalid(format!("Invalid event: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::error::ErrorCode;

    #[test]
    fn test_oversized_frame_rejected() {
        let raw = format!(r#"{{"type":"edit_message","content":"{}"}}"#, "a".repeat(100));
        let err = parse_frame(&raw, 64).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_malformed_frames_rejected() {
        assert!(parse_frame("   ", 1024).is_err());
        assert!(parse_frame("{not json", 1024).is_err());
        assert!(matches!(
            parse_frame(r#"{"type":"pong"}"#, 1024),
            Ok(ClientEvent::Pong { .. })
        ));
    }
}
