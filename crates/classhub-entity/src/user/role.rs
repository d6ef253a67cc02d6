//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of roles a ClassHub user can hold.
///
/// Every code path that behaves differently for teachers and students
/// receives the role explicitly as one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Teaches one or more classes.
    Teacher,
    /// Enrolled in one or more classes.
    Student,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    /// Whether this role moderates live rooms.
    pub fn is_moderator(&self) -> bool {
        matches!(self, Self::Teacher | Self::Admin)
    }

    /// Whether this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role is a teacher.
    pub fn is_teacher(&self) -> bool {
        matches!(self, Self::Teacher)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = classhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            "admin" => Ok(Self::Admin),
            _ => Err(classhub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: teacher, student, admin"
            ))),
        }
    }
}
