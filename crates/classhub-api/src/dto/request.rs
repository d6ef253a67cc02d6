//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use classhub_core::error::AppError;
use classhub_core::types::UserId;

/// Body of `POST /api/classes/{class_id}/live-room`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoomRequest {
    /// Display name of the room.
    #[validate(length(min = 1, max = 120, message = "Room name must be 1-120 characters"))]
    pub room_name: String,
}

/// Body of `PUT /api/classes/{class_id}/roster`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRequest {
    /// Current teachers of the class.
    #[serde(default)]
    pub teacher_ids: Vec<UserId>,
    /// Currently enrolled students.
    #[serde(default)]
    pub student_ids: Vec<UserId>,
}

/// Run `validator` rules and map failures to a validation error.
pub fn validate<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_name_length() {
        let ok = CreateRoomRequest {
            room_name: "Algebra review".to_string(),
        };
        assert!(validate(&ok).is_ok());

        let empty = CreateRoomRequest {
            room_name: String::new(),
        };
        assert!(validate(&empty).is_err());

        let long = CreateRoomRequest {
            room_name: "x".repeat(121),
        };
        assert!(validate(&long).is_err());
    }
}
