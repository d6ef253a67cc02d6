//! Cache key builders.
//!
//! Keys are relative; the Redis provider prepends the configured prefix
//! (`classhub:` by default).

use std::fmt::Display;

/// Presence marker meaning "this teacher is online in this room".
///
/// Each teacher owns one marker per room, so only that teacher's pings and
/// leave can touch it.
pub fn live_teacher_presence(room_id: impl Display, teacher_id: impl Display) -> String {
    format!("live:teacher:{room_id}:{teacher_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_presence_key() {
        assert_eq!(
            live_teacher_presence(Uuid::nil(), Uuid::from_u128(1)),
            "live:teacher:00000000-0000-0000-0000-000000000000:00000000-0000-0000-0000-000000000001"
        );
    }
}
