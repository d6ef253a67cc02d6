//! Core type definitions used across the ClassHub workspace.

pub mod id;
pub mod pagination;

pub use id::*;
pub use pagination::CursorPage;
