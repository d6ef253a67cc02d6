//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use classhub_core::types::UserId;
use classhub_entity::user::UserRole;

/// The authenticated caller of a service operation.
///
/// Built from the verified access token at the transport edge and passed
/// explicitly into every service call, so the actor and role are never
/// taken from a client payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// Display name from the token.
    pub display_name: String,
    /// When the request (or connection) was authenticated.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role: UserRole, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            display_name: display_name.into(),
            request_time: Utc::now(),
        }
    }

    /// Returns whether the caller is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Returns whether the caller is a teacher.
    pub fn is_teacher(&self) -> bool {
        self.role.is_teacher()
    }
}
